//! Semantic checkers
//!
//! Each pass inspects the program independently and reports what it
//! finds; the driver in [`crate::semantic`] runs them in a fixed order
//! and halts at the first pass that produced any report, so later
//! passes always see a program the earlier ones accepted.

mod duplicates;
mod method_decls;
mod names;
mod static_context;
mod type_check;
mod varargs;

pub use duplicates::DuplicatedElement;
pub use method_decls::InvalidMethodDeclaration;
pub use names::{UndeclaredVariable, UndefinedMethod};
pub use static_context::StaticContext;
pub use type_check::{InvalidArrayAccess, TypeCheck};
pub use varargs::InvalidVarargs;

use crate::report::Report;
use crate::semantic::symbol_table::SymbolTable;
use jmm_parser::ast::{Expr, MethodDecl, Program, Stmt};

/// One semantic checker
pub trait SemanticPass {
    /// Stable name used in internal-failure diagnostics
    fn name(&self) -> &'static str;
    /// Inspect the program and report every violation found
    fn check(&self, program: &Program, table: &SymbolTable) -> Vec<Report>;
}

/// The full pass sequence, in the order the driver runs it
pub fn default_passes() -> Vec<Box<dyn SemanticPass>> {
    vec![
        Box::new(DuplicatedElement),
        Box::new(StaticContext),
        Box::new(InvalidMethodDeclaration),
        Box::new(UndeclaredVariable),
        Box::new(UndefinedMethod),
        Box::new(TypeCheck),
        Box::new(InvalidArrayAccess),
        Box::new(InvalidVarargs),
    ]
}

// ==================== AST walking helpers ====================

/// Apply `f` to every statement of a method, outer first
pub(crate) fn for_each_stmt<'a>(method: &'a MethodDecl, f: &mut impl FnMut(&'a Stmt)) {
    for stmt in &method.body {
        walk_stmt(stmt, f);
    }
}

fn walk_stmt<'a>(stmt: &'a Stmt, f: &mut impl FnMut(&'a Stmt)) {
    f(stmt);
    match stmt {
        Stmt::Block { stmts, .. } => {
            for inner in stmts {
                walk_stmt(inner, f);
            }
        }
        Stmt::If {
            then_branch,
            else_branch,
            ..
        } => {
            walk_stmt(then_branch, f);
            walk_stmt(else_branch, f);
        }
        Stmt::While { body, .. } => walk_stmt(body, f),
        Stmt::Assign { .. }
        | Stmt::ArrayAssign { .. }
        | Stmt::Return { .. }
        | Stmt::Expr { .. } => {}
    }
}

/// Apply `f` to every expression of a method, outer first
pub(crate) fn for_each_expr<'a>(method: &'a MethodDecl, f: &mut impl FnMut(&'a Expr)) {
    for_each_stmt(method, &mut |stmt| {
        for expr in stmt_exprs(stmt) {
            walk_expr(expr, f);
        }
    });
}

/// The expressions directly owned by a statement (not those of nested
/// statements)
pub(crate) fn stmt_exprs(stmt: &Stmt) -> Vec<&Expr> {
    match stmt {
        Stmt::Block { .. } => vec![],
        Stmt::If { cond, .. } => vec![cond],
        Stmt::While { cond, .. } => vec![cond],
        Stmt::Assign { value, .. } => vec![value],
        Stmt::ArrayAssign { index, value, .. } => vec![index, value],
        Stmt::Return { value, .. } => vec![value],
        Stmt::Expr { expr, .. } => vec![expr],
    }
}

fn walk_expr<'a>(expr: &'a Expr, f: &mut impl FnMut(&'a Expr)) {
    f(expr);
    match expr {
        Expr::Binary { lhs, rhs, .. } => {
            walk_expr(lhs, f);
            walk_expr(rhs, f);
        }
        Expr::Not { expr, .. } | Expr::Paren { expr, .. } => walk_expr(expr, f),
        Expr::Call { receiver, args, .. } => {
            walk_expr(receiver, f);
            for arg in args {
                walk_expr(arg, f);
            }
        }
        Expr::Member { object, .. } => walk_expr(object, f),
        Expr::ArrayAccess { array, index, .. } => {
            walk_expr(array, f);
            walk_expr(index, f);
        }
        Expr::ArrayLiteral { elements, .. } => {
            for element in elements {
                walk_expr(element, f);
            }
        }
        Expr::NewArray { size, .. } => walk_expr(size, f),
        Expr::IntLiteral { .. }
        | Expr::BoolLiteral { .. }
        | Expr::Identifier { .. }
        | Expr::This { .. }
        | Expr::NewObject { .. } => {}
    }
}
