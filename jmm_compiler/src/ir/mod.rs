//! In-memory IR
//!
//! The class/method/instruction model the bytecode emitter and the
//! register allocator work on. Produced by re-parsing the emitted OLLIR
//! text (see [`parser`]); every instruction knows its labels and the
//! method derives per-instruction successor lists from them.

pub mod parser;

pub use parser::{parse_class_unit, OllirParseError};

use crate::types::Type;
use std::collections::HashMap;
use std::fmt;

/// One compiled class
#[derive(Debug, Clone, PartialEq)]
pub struct ClassUnit {
    pub class_name: String,
    pub super_class: Option<String>,
    /// Dotted import paths, in source order
    pub imports: Vec<String>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
}

impl ClassUnit {
    /// Map from a class's short name to its slash-qualified form,
    /// resolved through the imports
    pub fn qualified_name(&self, short: &str) -> String {
        if short == self.class_name {
            return short.to_string();
        }
        for import in &self.imports {
            let last = import.rsplit('.').next().unwrap_or(import);
            if last == short {
                return import.replace('.', "/");
            }
        }
        short.to_string()
    }
}

/// An instance field
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub ty: Type,
}

/// A formal parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub ty: Type,
}

/// A named non-parameter variable of a method, in first-appearance order
#[derive(Debug, Clone, PartialEq)]
pub struct Var {
    pub name: String,
    pub ty: Type,
}

/// One method: signature, instruction list and frame layout
#[derive(Debug, Clone, PartialEq)]
pub struct Method {
    pub name: String,
    pub is_public: bool,
    pub is_static: bool,
    pub is_constructor: bool,
    pub params: Vec<Param>,
    pub return_type: Type,
    pub instructions: Vec<Instr>,
    /// Locals and temporaries, in first-appearance order
    pub vars: Vec<Var>,
    /// Virtual register of every named variable (`this` included for
    /// instance methods); rewritten by the register allocator
    pub registers: HashMap<String, usize>,
}

impl Method {
    /// Index of the instruction carrying `label`
    pub fn label_index(&self, label: &str) -> Option<usize> {
        self.instructions
            .iter()
            .position(|instr| instr.labels.iter().any(|l| l == label))
    }

    /// CFG successor indices of instruction `index`
    pub fn successors(&self, index: usize) -> Vec<usize> {
        let next = || {
            if index + 1 < self.instructions.len() {
                vec![index + 1]
            } else {
                vec![]
            }
        };
        match &self.instructions[index].kind {
            InstrKind::Goto { target } => self.label_index(target).into_iter().collect(),
            InstrKind::CondBranch { target, .. } => {
                let mut succ: Vec<usize> = self.label_index(target).into_iter().collect();
                succ.extend(next());
                succ
            }
            InstrKind::Return { .. } => vec![],
            _ => next(),
        }
    }

    /// The type of a named variable, parameter or local
    pub fn var_type(&self, name: &str) -> Option<&Type> {
        self.params
            .iter()
            .find(|p| p.name == name)
            .map(|p| &p.ty)
            .or_else(|| self.vars.iter().find(|v| v.name == name).map(|v| &v.ty))
    }

    /// Whether `name` is a parameter
    pub fn is_param(&self, name: &str) -> bool {
        self.params.iter().any(|p| p.name == name)
    }

    /// First register slot not taken by the receiver or a parameter
    pub fn first_local_slot(&self) -> usize {
        self.params.len() + if self.is_static { 0 } else { 1 }
    }

    /// Lay registers out sequentially: receiver, parameters, then
    /// locals in first-appearance order
    pub fn assign_default_registers(&mut self) {
        self.registers.clear();
        let mut slot = 0;
        if !self.is_static {
            self.registers.insert("this".to_string(), slot);
            slot += 1;
        }
        for param in &self.params {
            self.registers.insert(param.name.clone(), slot);
            slot += 1;
        }
        for var in &self.vars {
            self.registers.insert(var.name.clone(), slot);
            slot += 1;
        }
    }
}

/// One instruction with its unique id and attached labels
#[derive(Debug, Clone, PartialEq)]
pub struct Instr {
    pub id: usize,
    pub labels: Vec<String>,
    pub kind: InstrKind,
}

/// Instruction variants
#[derive(Debug, Clone, PartialEq)]
pub enum InstrKind {
    Assign { dest: Element, rhs: Rhs },
    /// A call in statement position; a non-void result is discarded
    Call(Call),
    PutField {
        object: Element,
        field: String,
        field_ty: Type,
        value: Element,
    },
    Return { ty: Type, value: Option<Element> },
    CondBranch { cond: Cond, target: String },
    Goto { target: String },
}

/// Right-hand sides of an assignment
#[derive(Debug, Clone, PartialEq)]
pub enum Rhs {
    Simple(Element),
    /// Logical negation
    Unary { operand: Element },
    Binary {
        lhs: Element,
        op: AluOp,
        rhs: Element,
    },
    Call(Call),
    GetField {
        object: Element,
        field: String,
        ty: Type,
    },
}

/// Branch conditions
#[derive(Debug, Clone, PartialEq)]
pub enum Cond {
    /// A boolean operand, branch when true
    Single(Element),
    /// A negated operand, branch when false
    Not(Element),
    /// A comparison, branch when it holds
    Compare {
        lhs: Element,
        op: AluOp,
        rhs: Element,
    },
}

/// Operands
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// An integer or boolean literal (booleans are 0/1)
    Literal { value: i32, ty: Type },
    Operand { name: String, ty: Type },
    /// An indexed array element; `ty` is the element type
    ArrayAccess {
        name: String,
        index: Box<Element>,
        ty: Type,
    },
}

impl Element {
    pub fn ty(&self) -> &Type {
        match self {
            Element::Literal { ty, .. }
            | Element::Operand { ty, .. }
            | Element::ArrayAccess { ty, .. } => ty,
        }
    }

    /// The variable name behind this element, if any
    pub fn name(&self) -> Option<&str> {
        match self {
            Element::Literal { .. } => None,
            Element::Operand { name, .. } | Element::ArrayAccess { name, .. } => Some(name),
        }
    }
}

/// Arithmetic, comparison and logic operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Sub,
    Mul,
    Div,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    And,
    Or,
}

impl AluOp {
    pub fn is_comparison(&self) -> bool {
        matches!(self, AluOp::Lt | AluOp::Le | AluOp::Gt | AluOp::Ge | AluOp::Eq)
    }
}

impl fmt::Display for AluOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            AluOp::Add => "+",
            AluOp::Sub => "-",
            AluOp::Mul => "*",
            AluOp::Div => "/",
            AluOp::Lt => "<",
            AluOp::Le => "<=",
            AluOp::Gt => ">",
            AluOp::Ge => ">=",
            AluOp::Eq => "==",
            AluOp::And => "&&",
            AluOp::Or => "||",
        };
        write!(f, "{}", symbol)
    }
}

/// Invocation forms
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Static,
    Virtual,
    Special,
    New,
    NewArray,
    ArrayLength,
    Ldc,
}

/// A call instruction or right-hand side
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub kind: CallKind,
    /// Receiver, class reference, array operand or literal (for `ldc`)
    pub caller: Element,
    /// Absent for `new`/`arraylength`/`ldc`
    pub method: Option<String>,
    pub args: Vec<Element>,
    pub return_type: Type,
}
