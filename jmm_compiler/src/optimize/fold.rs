//! Constant folding
//!
//! Evaluates pure literal subtrees in place. Integer arithmetic is
//! 32-bit two's-complement with wrap-around; division and an operand of
//! zero never folds, runtime semantics govern there. Reference and
//! array expressions are never folded.

use jmm_parser::ast::{BinaryOp, Expr, MethodDecl, Program, Stmt};

/// Fold every expression of the program; returns the number of rewrites.
pub fn fold_program(program: &mut Program) -> usize {
    let mut count = 0;
    for method in &mut program.class.methods {
        count += fold_method(method);
    }
    count
}

/// Fold every expression of one method
pub fn fold_method(method: &mut MethodDecl) -> usize {
    let mut count = 0;
    for stmt in &mut method.body {
        count += fold_stmt(stmt);
    }
    count
}

fn fold_stmt(stmt: &mut Stmt) -> usize {
    match stmt {
        Stmt::Block { stmts, .. } => stmts.iter_mut().map(fold_stmt).sum(),
        Stmt::If {
            cond,
            then_branch,
            else_branch,
            ..
        } => fold_expr(cond) + fold_stmt(then_branch) + fold_stmt(else_branch),
        Stmt::While { cond, body, .. } => fold_expr(cond) + fold_stmt(body),
        Stmt::Assign { value, .. } => fold_expr(value),
        Stmt::ArrayAssign { index, value, .. } => fold_expr(index) + fold_expr(value),
        Stmt::Return { value, .. } => fold_expr(value),
        Stmt::Expr { expr, .. } => fold_expr(expr),
    }
}

/// Fold one expression tree bottom-up; returns the number of rewrites
pub fn fold_expr(expr: &mut Expr) -> usize {
    let mut count = match expr {
        Expr::Binary { lhs, rhs, .. } => fold_expr(lhs) + fold_expr(rhs),
        Expr::Not { expr: inner, .. } | Expr::Paren { expr: inner, .. } => fold_expr(inner),
        Expr::Call { receiver, args, .. } => {
            fold_expr(receiver) + args.iter_mut().map(fold_expr).sum::<usize>()
        }
        Expr::Member { object, .. } => fold_expr(object),
        Expr::ArrayAccess { array, index, .. } => fold_expr(array) + fold_expr(index),
        Expr::ArrayLiteral { elements, .. } => elements.iter_mut().map(fold_expr).sum(),
        Expr::NewArray { size, .. } => fold_expr(size),
        _ => 0,
    };

    if let Some(folded) = try_fold(expr) {
        *expr = folded;
        count += 1;
    }
    count
}

/// Evaluate the topmost node if all its operands are literals
fn try_fold(expr: &Expr) -> Option<Expr> {
    match expr {
        Expr::Paren { expr: inner, span } => match inner.as_ref() {
            Expr::IntLiteral { value, .. } => Some(Expr::IntLiteral {
                value: *value,
                span: *span,
            }),
            Expr::BoolLiteral { value, .. } => Some(Expr::BoolLiteral {
                value: *value,
                span: *span,
            }),
            _ => None,
        },
        Expr::Not { expr: inner, span } => match inner.as_ref() {
            Expr::BoolLiteral { value, .. } => Some(Expr::BoolLiteral {
                value: !*value,
                span: *span,
            }),
            _ => None,
        },
        Expr::Binary { op, lhs, rhs, span } => match (lhs.as_ref(), rhs.as_ref()) {
            (Expr::IntLiteral { value: a, .. }, Expr::IntLiteral { value: b, .. }) => {
                fold_int_binop(*op, *a, *b, *span)
            }
            (Expr::BoolLiteral { value: a, .. }, Expr::BoolLiteral { value: b, .. }) => {
                fold_bool_binop(*op, *a, *b, *span)
            }
            _ => None,
        },
        _ => None,
    }
}

fn fold_int_binop(op: BinaryOp, a: i32, b: i32, span: jmm_parser::Span) -> Option<Expr> {
    let int = |value: i32| Some(Expr::IntLiteral { value, span });
    let boolean = |value: bool| Some(Expr::BoolLiteral { value, span });
    match op {
        BinaryOp::Add => int(a.wrapping_add(b)),
        BinaryOp::Sub => int(a.wrapping_sub(b)),
        BinaryOp::Mul => int(a.wrapping_mul(b)),
        BinaryOp::Div => {
            if b != 0 {
                int(a.wrapping_div(b))
            } else {
                None
            }
        }
        BinaryOp::Lt => boolean(a < b),
        BinaryOp::Le => boolean(a <= b),
        BinaryOp::Gt => boolean(a > b),
        BinaryOp::Ge => boolean(a >= b),
        BinaryOp::Eq => boolean(a == b),
        BinaryOp::And | BinaryOp::Or => None,
    }
}

fn fold_bool_binop(op: BinaryOp, a: bool, b: bool, span: jmm_parser::Span) -> Option<Expr> {
    let boolean = |value: bool| Some(Expr::BoolLiteral { value, span });
    match op {
        BinaryOp::And => boolean(a && b),
        BinaryOp::Or => boolean(a || b),
        BinaryOp::Eq => boolean(a == b),
        _ => None,
    }
}
