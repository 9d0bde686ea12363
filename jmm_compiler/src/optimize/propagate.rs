//! Constant propagation
//!
//! Scans each method body in order, tracking which locals currently
//! hold a known literal, and replaces their uses with that literal.
//! The environment is invalidated conservatively around control flow:
//! anything assigned inside an `if`/`else` branch is forgotten after
//! the branch, and anything mutated in a `while` body is forgotten
//! before the condition and body are processed.

use jmm_parser::ast::{Expr, MethodDecl, Program, Stmt};
use std::collections::{HashMap, HashSet};

/// A known literal value of a variable
#[derive(Debug, Clone, Copy, PartialEq)]
enum Const {
    Int(i32),
    Bool(bool),
}

impl Const {
    fn of(expr: &Expr) -> Option<Const> {
        match expr {
            Expr::IntLiteral { value, .. } => Some(Const::Int(*value)),
            Expr::BoolLiteral { value, .. } => Some(Const::Bool(*value)),
            _ => None,
        }
    }

    fn to_expr(self, span: jmm_parser::Span) -> Expr {
        match self {
            Const::Int(value) => Expr::IntLiteral { value, span },
            Const::Bool(value) => Expr::BoolLiteral { value, span },
        }
    }
}

type Env = HashMap<String, Const>;

/// Propagate constants through every method; returns the number of
/// substitutions performed.
pub fn propagate_program(program: &mut Program) -> usize {
    let mut count = 0;
    for method in &mut program.class.methods {
        count += propagate_method(method);
    }
    count
}

/// Propagate constants through one method body
pub fn propagate_method(method: &mut MethodDecl) -> usize {
    let mut env = Env::new();
    let mut count = 0;
    for stmt in &mut method.body {
        count += propagate_stmt(stmt, &mut env);
    }
    count
}

fn propagate_stmt(stmt: &mut Stmt, env: &mut Env) -> usize {
    match stmt {
        Stmt::Block { stmts, .. } => {
            let mut count = 0;
            for inner in stmts {
                count += propagate_stmt(inner, env);
            }
            count
        }
        Stmt::Assign { name, value, .. } => {
            let count = substitute(value, env);
            match Const::of(value) {
                Some(constant) => {
                    env.insert(name.clone(), constant);
                }
                None => {
                    env.remove(name);
                }
            }
            count
        }
        Stmt::ArrayAssign { index, value, .. } => substitute(index, env) + substitute(value, env),
        Stmt::Return { value, .. } => substitute(value, env),
        Stmt::Expr { expr, .. } => substitute(expr, env),
        Stmt::If {
            cond,
            then_branch,
            else_branch,
            ..
        } => {
            let mut count = substitute(cond, env);
            let mut then_env = env.clone();
            count += propagate_stmt(then_branch, &mut then_env);
            let mut else_env = env.clone();
            count += propagate_stmt(else_branch, &mut else_env);
            let mut mutated = HashSet::new();
            assigned_names(then_branch, &mut mutated);
            assigned_names(else_branch, &mut mutated);
            env.retain(|name, _| !mutated.contains(name));
            count
        }
        Stmt::While { cond, body, .. } => {
            // A binding only survives into (and past) the loop if the
            // body never writes it
            let mut mutated = HashSet::new();
            assigned_names(body, &mut mutated);
            env.retain(|name, _| !mutated.contains(name));
            let mut count = substitute(cond, env);
            let mut body_env = env.clone();
            count += propagate_stmt(body, &mut body_env);
            count
        }
    }
}

/// Collect every plain assignment target inside a statement
fn assigned_names(stmt: &Stmt, out: &mut HashSet<String>) {
    match stmt {
        Stmt::Assign { name, .. } => {
            out.insert(name.clone());
        }
        Stmt::Block { stmts, .. } => {
            for inner in stmts {
                assigned_names(inner, out);
            }
        }
        Stmt::If {
            then_branch,
            else_branch,
            ..
        } => {
            assigned_names(then_branch, out);
            assigned_names(else_branch, out);
        }
        Stmt::While { body, .. } => assigned_names(body, out),
        Stmt::ArrayAssign { .. } | Stmt::Return { .. } | Stmt::Expr { .. } => {}
    }
}

/// Replace bound identifiers in an expression by their literal value
fn substitute(expr: &mut Expr, env: &Env) -> usize {
    match expr {
        Expr::Identifier { name, span } => {
            if let Some(constant) = env.get(name) {
                *expr = constant.to_expr(*span);
                1
            } else {
                0
            }
        }
        Expr::Binary { lhs, rhs, .. } => substitute(lhs, env) + substitute(rhs, env),
        Expr::Not { expr: inner, .. } | Expr::Paren { expr: inner, .. } => substitute(inner, env),
        Expr::Call { receiver, args, .. } => {
            let mut count = substitute(receiver, env);
            for arg in args {
                count += substitute(arg, env);
            }
            count
        }
        Expr::Member { object, .. } => substitute(object, env),
        Expr::ArrayAccess { array, index, .. } => substitute(array, env) + substitute(index, env),
        Expr::ArrayLiteral { elements, .. } => elements.iter_mut().map(|e| substitute(e, env)).sum(),
        Expr::NewArray { size, .. } => substitute(size, env),
        Expr::IntLiteral { .. }
        | Expr::BoolLiteral { .. }
        | Expr::This { .. }
        | Expr::NewObject { .. } => 0,
    }
}
