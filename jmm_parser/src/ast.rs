//! Abstract syntax tree for Jmm
//!
//! The parser produces this tagged-union AST; the compiler's optimisation
//! passes mutate it in place before lowering.

use crate::span::Span;
use serde::{Deserialize, Serialize};

/// A whole compilation unit: imports followed by exactly one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub imports: Vec<ImportDecl>,
    pub class: ClassDecl,
}

/// `import a.b.C;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportDecl {
    /// Dotted path segments, in source order
    pub path: Vec<String>,
    pub span: Span,
}

impl ImportDecl {
    /// The dotted form, e.g. `a.b.C`
    pub fn dotted(&self) -> String {
        self.path.join(".")
    }

    /// The last path segment, the name the class is referred to by
    pub fn last_segment(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }
}

/// `class Name extends Parent { fields methods }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    pub name: String,
    pub extends: Option<String>,
    pub fields: Vec<VarDecl>,
    pub methods: Vec<MethodDecl>,
    pub span: Span,
}

/// A field or local declaration: `int x;`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VarDecl {
    pub name: String,
    pub ty: TypeNode,
    pub span: Span,
}

/// A source-level type annotation.
///
/// Valid flag combinations are plain, array, and varargs; a varargs type
/// (`int...`) sets `is_array` as well, since it is an array at every later
/// stage. `void` never carries a flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeNode {
    pub name: String,
    pub is_array: bool,
    pub is_varargs: bool,
    pub span: Span,
}

/// Method declaration with its parameter list, local declarations and body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    pub is_public: bool,
    pub is_static: bool,
    pub return_type: TypeNode,
    pub params: Vec<Param>,
    pub locals: Vec<VarDecl>,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// A formal parameter: `int a`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: TypeNode,
    pub span: Span,
}

/// Statements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    /// `{ stmts }`
    Block { stmts: Vec<Stmt>, span: Span },
    /// `if (cond) then else other`; the else branch is mandatory in Jmm
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Box<Stmt>,
        span: Span,
    },
    /// `while (cond) body`
    While {
        cond: Expr,
        body: Box<Stmt>,
        span: Span,
    },
    /// `name = value;`
    Assign {
        name: String,
        value: Expr,
        span: Span,
    },
    /// `name[index] = value;`
    ArrayAssign {
        name: String,
        index: Expr,
        value: Expr,
        span: Span,
    },
    /// `return value;`
    Return { value: Expr, span: Span },
    /// An expression evaluated for its effect, e.g. `io.println(x);`
    Expr { expr: Expr, span: Span },
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Block { span, .. }
            | Stmt::If { span, .. }
            | Stmt::While { span, .. }
            | Stmt::Assign { span, .. }
            | Stmt::ArrayAssign { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::Expr { span, .. } => *span,
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
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

impl BinaryOp {
    /// Source-level spelling
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    /// `+ - * /`
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div
        )
    }

    /// `< <= > >= ==`
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge | BinaryOp::Eq
        )
    }

    /// `&& ||`
    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

/// Expressions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    IntLiteral { value: i32, span: Span },
    BoolLiteral { value: bool, span: Span },
    Identifier { name: String, span: Span },
    This { span: Span },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
        span: Span,
    },
    /// Logical negation `!e`
    Not { expr: Box<Expr>, span: Span },
    /// `(e)`, kept so the tree mirrors the source shape
    Paren { expr: Box<Expr>, span: Span },
    /// `receiver.method(args)`
    Call {
        receiver: Box<Expr>,
        method: String,
        args: Vec<Expr>,
        span: Span,
    },
    /// `object.field`; in Jmm only `.length` on arrays
    Member {
        object: Box<Expr>,
        field: String,
        span: Span,
    },
    /// `array[index]`
    ArrayAccess {
        array: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },
    /// `[e0, e1, ...]`
    ArrayLiteral { elements: Vec<Expr>, span: Span },
    /// `new Name()`
    NewObject { class: String, span: Span },
    /// `new int[size]`
    NewArray { size: Box<Expr>, span: Span },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::IntLiteral { span, .. }
            | Expr::BoolLiteral { span, .. }
            | Expr::Identifier { span, .. }
            | Expr::This { span }
            | Expr::Binary { span, .. }
            | Expr::Not { span, .. }
            | Expr::Paren { span, .. }
            | Expr::Call { span, .. }
            | Expr::Member { span, .. }
            | Expr::ArrayAccess { span, .. }
            | Expr::ArrayLiteral { span, .. }
            | Expr::NewObject { span, .. }
            | Expr::NewArray { span, .. } => *span,
        }
    }

    /// Literal or plain identifier: an operand usable without a temporary
    pub fn is_trivial(&self) -> bool {
        matches!(
            self,
            Expr::IntLiteral { .. } | Expr::BoolLiteral { .. } | Expr::Identifier { .. }
        )
    }

    /// Strip any number of surrounding parentheses
    pub fn unwrap_parens(&self) -> &Expr {
        let mut expr = self;
        while let Expr::Paren { expr: inner, .. } = expr {
            expr = inner;
        }
        expr
    }
}
