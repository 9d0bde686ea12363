//! Per-method bytecode emission
//!
//! Walks the instruction list once, tracking the operand stack depth
//! after every mnemonic; the peak becomes `.limit stack` and the
//! highest touched register drives `.limit locals`.

use super::descriptor::{descriptor, method_descriptor};
use crate::ir::{AluOp, Call, CallKind, ClassUnit, Cond, Element, InstrKind, Method, Rhs};
use crate::types::Type;

/// Writer for one method body
#[derive(Debug)]
pub struct MethodWriter<'a> {
    unit: &'a ClassUnit,
    method: &'a Method,
    lines: Vec<String>,
    stack: i32,
    max_stack: i32,
    max_register: usize,
    label_counter: usize,
}

impl<'a> MethodWriter<'a> {
    pub fn new(unit: &'a ClassUnit, method: &'a Method) -> Self {
        Self {
            unit,
            method,
            lines: Vec::new(),
            stack: 0,
            max_stack: 0,
            max_register: 0,
            label_counter: 0,
        }
    }

    /// Emit the whole `.method ... .end method` block
    pub fn emit(mut self) -> String {
        let mut header = String::from(".method ");
        if self.method.is_public {
            header.push_str("public ");
        }
        if self.method.is_static {
            header.push_str("static ");
        }
        let param_types: Vec<Type> = self.method.params.iter().map(|p| p.ty.clone()).collect();
        header.push_str(&self.method.name);
        header.push_str(&method_descriptor(
            &param_types,
            &self.method.return_type,
            self.unit,
        ));

        self.emit_body();

        let limit_locals = self
            .method
            .first_local_slot()
            .max(self.max_register + 1);
        let mut out = String::new();
        out.push_str(&header);
        out.push('\n');
        out.push_str(&format!("    .limit stack {}\n", self.max_stack));
        out.push_str(&format!("    .limit locals {}\n", limit_locals));
        for line in &self.lines {
            if line.ends_with(':') {
                out.push_str(line);
            } else {
                out.push_str("    ");
                out.push_str(line);
            }
            out.push('\n');
        }
        out.push_str(".end method\n");
        out
    }

    fn emit_body(&mut self) {
        let instructions = &self.method.instructions;
        let mut skip_ctor_for: Option<String> = None;
        let mut index = 0;
        while index < instructions.len() {
            let instr = &instructions[index];
            for label in &instr.labels {
                self.label(label);
            }

            // The `new`/`dup`/`invokespecial` idiom already ran the
            // constructor; drop the separate invocation
            if let Some(temp) = skip_ctor_for.take() {
                if instr.labels.is_empty() {
                    if let InstrKind::Call(call) = &instr.kind {
                        if call.kind == CallKind::Special
                            && call.method.as_deref() == Some("<init>")
                            && call.caller.name() == Some(temp.as_str())
                        {
                            index += 1;
                            continue;
                        }
                    }
                }
            }

            match &instr.kind {
                InstrKind::Assign { dest, rhs } => {
                    // Feed a value straight into an immediately
                    // following return of the same operand
                    let elide_store = match instructions.get(index + 1) {
                        Some(next) if next.labels.is_empty() => match (&next.kind, dest) {
                            (
                                InstrKind::Return {
                                    value: Some(Element::Operand { name: ret_name, .. }),
                                    ..
                                },
                                Element::Operand { name, .. },
                            ) => ret_name == name,
                            _ => false,
                        },
                        _ => false,
                    };
                    if elide_store && !matches!(rhs, Rhs::Call(c) if c.kind == CallKind::New) {
                        self.rhs_to_stack(rhs);
                        self.emit_return_from_stack(dest.ty());
                        index += 2;
                        continue;
                    }
                    skip_ctor_for = self.emit_assign(dest, rhs);
                }
                InstrKind::Call(call) => {
                    self.call_to_stack(call);
                    if !call.return_type.is_void() {
                        self.op("pop", 1, 0);
                    }
                }
                InstrKind::PutField {
                    field, field_ty, value, ..
                } => {
                    self.load_register("this");
                    self.load_element(value);
                    let desc = descriptor(field_ty, self.unit);
                    self.op(
                        format!("putfield {}/{} {}", self.unit.class_name, field, desc),
                        2,
                        0,
                    );
                }
                InstrKind::Return { value, .. } => {
                    // Anything still parked on the stack dies here
                    while self.stack > 0 {
                        self.op("pop", 1, 0);
                    }
                    match value {
                        Some(element) => {
                            let ty = element.ty().clone();
                            self.load_element(element);
                            self.emit_return_from_stack(&ty);
                        }
                        None => self.lines.push("return".to_string()),
                    }
                }
                InstrKind::CondBranch { cond, target } => self.emit_cond_branch(cond, target),
                InstrKind::Goto { target } => self.lines.push(format!("goto {}", target)),
            }
            index += 1;
        }
    }

    fn emit_return_from_stack(&mut self, ty: &Type) {
        if ty.is_reference() {
            self.op("areturn", 1, 0);
        } else {
            self.op("ireturn", 1, 0);
        }
    }

    /// Returns the destination name when the rhs was a `new`, so the
    /// caller can skip the paired constructor invocation.
    fn emit_assign(&mut self, dest: &Element, rhs: &Rhs) -> Option<String> {
        match dest {
            Element::ArrayAccess { name, index, .. } => {
                self.load_register(name);
                self.load_element(index);
                self.rhs_to_stack(rhs);
                self.op("iastore", 3, 0);
                None
            }
            Element::Operand { name, ty } => {
                if self.try_emit_iinc(name, rhs) {
                    return None;
                }
                if let Rhs::Call(call) = rhs {
                    if call.kind == CallKind::New {
                        let class = self.unit.qualified_name(
                            call.caller.name().unwrap_or_default(),
                        );
                        self.op(format!("new {}", class), 0, 1);
                        self.op("dup", 0, 1);
                        self.op(format!("invokespecial {}/<init>()V", class), 1, 0);
                        self.store_register(name, ty);
                        return Some(name.clone());
                    }
                }
                self.rhs_to_stack(rhs);
                self.store_register(name, ty);
                None
            }
            Element::Literal { .. } => None,
        }
    }

    /// `x = x ± small-literal` becomes a single `iinc`
    fn try_emit_iinc(&mut self, dest: &str, rhs: &Rhs) -> bool {
        let Rhs::Binary { lhs, op, rhs } = rhs else {
            return false;
        };
        let (name, value) = match (lhs, op, rhs) {
            (
                Element::Operand { name, .. },
                AluOp::Add,
                Element::Literal { value, .. },
            ) => (name, *value),
            (
                Element::Operand { name, .. },
                AluOp::Sub,
                Element::Literal { value, .. },
            ) => (name, -*value),
            (
                Element::Literal { value, .. },
                AluOp::Add,
                Element::Operand { name, .. },
            ) => (name, *value),
            _ => return false,
        };
        if name != dest || !(-128..=127).contains(&value) {
            return false;
        }
        let register = self.register_of(dest);
        self.touch_register(register);
        self.lines.push(format!("iinc {} {}", register, value));
        true
    }

    // ==================== Right-hand sides ====================

    fn rhs_to_stack(&mut self, rhs: &Rhs) {
        match rhs {
            Rhs::Simple(element) => self.load_element(element),
            Rhs::Unary { operand } => {
                self.load_element(operand);
                self.push_int(1);
                self.op("ixor", 2, 1);
            }
            Rhs::Binary { lhs, op, rhs } => {
                self.load_element(lhs);
                self.load_element(rhs);
                self.binary_op(*op);
            }
            Rhs::Call(call) => self.call_to_stack(call),
            Rhs::GetField { object, field, ty } => {
                self.load_element(object);
                let desc = descriptor(ty, self.unit);
                self.op(
                    format!("getfield {}/{} {}", self.unit.class_name, field, desc),
                    1,
                    1,
                );
            }
        }
    }

    fn binary_op(&mut self, op: AluOp) {
        match op {
            AluOp::Add => self.op("iadd", 2, 1),
            AluOp::Sub => self.op("isub", 2, 1),
            AluOp::Mul => self.op("imul", 2, 1),
            AluOp::Div => self.op("idiv", 2, 1),
            AluOp::And => self.op("iand", 2, 1),
            AluOp::Or => self.op("ior", 2, 1),
            _ => self.comparison_to_flag(op),
        }
    }

    /// Materialise a comparison as 0/1: `isub` then the matching
    /// conditional jump
    fn comparison_to_flag(&mut self, op: AluOp) {
        let mnemonic = match op {
            AluOp::Lt => "iflt",
            AluOp::Le => "ifle",
            AluOp::Gt => "ifgt",
            AluOp::Ge => "ifge",
            AluOp::Eq => "ifeq",
            _ => unreachable!("comparison operator expected"),
        };
        let n = self.label_counter;
        self.label_counter += 1;
        self.op("isub", 2, 1);
        self.op(format!("{} CmpTrue{}", mnemonic, n), 1, 0);
        self.push_int(0);
        self.lines.push(format!("goto CmpEnd{}", n));
        self.stack -= 1;
        self.label(&format!("CmpTrue{}", n));
        self.push_int(1);
        self.label(&format!("CmpEnd{}", n));
    }

    fn emit_cond_branch(&mut self, cond: &Cond, target: &str) {
        match cond {
            Cond::Compare { lhs, op, rhs } => {
                self.load_element(lhs);
                self.load_element(rhs);
                self.comparison_to_flag(*op);
                self.op(format!("ifne {}", target), 1, 0);
            }
            Cond::Not(element) => {
                self.load_element(element);
                self.op(format!("ifeq {}", target), 1, 0);
            }
            Cond::Single(element) => {
                self.load_element(element);
                self.op(format!("ifne {}", target), 1, 0);
            }
        }
    }

    // ==================== Calls ====================

    fn call_to_stack(&mut self, call: &Call) {
        match call.kind {
            CallKind::New => {
                let class = self
                    .unit
                    .qualified_name(call.caller.name().unwrap_or_default());
                self.op(format!("new {}", class), 0, 1);
            }
            CallKind::NewArray => {
                for arg in &call.args {
                    self.load_element(arg);
                }
                self.op("newarray int", 1, 1);
            }
            CallKind::ArrayLength => {
                self.load_element(&call.caller);
                self.op("arraylength", 1, 1);
            }
            CallKind::Ldc => {
                self.load_element(&call.caller);
            }
            CallKind::Static | CallKind::Virtual | CallKind::Special => {
                let mnemonic = match call.kind {
                    CallKind::Static => "invokestatic",
                    CallKind::Virtual => "invokevirtual",
                    _ => "invokespecial",
                };
                if call.kind != CallKind::Static {
                    self.load_element(&call.caller);
                }
                for arg in &call.args {
                    self.load_element(arg);
                }
                let class = match call.caller.ty().class_name() {
                    Some(name) => self.unit.qualified_name(name),
                    None => self.unit.class_name.clone(),
                };
                // Constructor names are fixed for invokespecial
                let method = if call.kind == CallKind::Special {
                    "<init>"
                } else {
                    call.method.as_deref().unwrap_or_default()
                };
                let arg_types: Vec<Type> = call.args.iter().map(|a| a.ty().clone()).collect();
                let desc = method_descriptor(&arg_types, &call.return_type, self.unit);
                let pops = call.args.len() as u32 + u32::from(call.kind != CallKind::Static);
                let pushes = u32::from(!call.return_type.is_void());
                self.op(format!("{} {}/{}{}", mnemonic, class, method, desc), pops, pushes);
            }
        }
    }

    // ==================== Loads, stores, constants ====================

    fn load_element(&mut self, element: &Element) {
        match element {
            Element::Literal { value, .. } => self.push_int(*value),
            Element::Operand { name, .. } => self.load_register(name),
            Element::ArrayAccess { name, index, .. } => {
                self.load_register(name);
                self.load_element(index);
                self.op("iaload", 2, 1);
            }
        }
    }

    fn register_of(&self, name: &str) -> usize {
        self.method.registers.get(name).copied().unwrap_or(0)
    }

    fn touch_register(&mut self, register: usize) {
        self.max_register = self.max_register.max(register);
    }

    fn load_register(&mut self, name: &str) {
        let register = self.register_of(name);
        self.touch_register(register);
        let reference = name == "this"
            || self
                .method
                .var_type(name)
                .map(Type::is_reference)
                .unwrap_or(false);
        let prefix = if reference { "a" } else { "i" };
        let text = if register <= 3 {
            format!("{}load_{}", prefix, register)
        } else {
            format!("{}load {}", prefix, register)
        };
        self.op(text, 0, 1);
    }

    fn store_register(&mut self, name: &str, ty: &Type) {
        let register = self.register_of(name);
        self.touch_register(register);
        let prefix = if ty.is_reference() { "a" } else { "i" };
        let text = if register <= 3 {
            format!("{}store_{}", prefix, register)
        } else {
            format!("{}store {}", prefix, register)
        };
        self.op(text, 1, 0);
    }

    /// Smallest-width integer constant push
    fn push_int(&mut self, value: i32) {
        let text = match value {
            -1 => "iconst_m1".to_string(),
            0..=5 => format!("iconst_{}", value),
            -128..=127 => format!("bipush {}", value),
            -32768..=32767 => format!("sipush {}", value),
            _ => format!("ldc {}", value),
        };
        self.op(text, 0, 1);
    }

    // ==================== Writer primitives ====================

    fn op(&mut self, text: impl Into<String>, pops: u32, pushes: u32) {
        self.lines.push(text.into());
        self.stack -= pops as i32;
        debug_assert!(self.stack >= 0, "operand stack underflow");
        self.stack += pushes as i32;
        self.max_stack = self.max_stack.max(self.stack);
    }

    fn label(&mut self, name: &str) {
        self.lines.push(format!("{}:", name));
    }
}
