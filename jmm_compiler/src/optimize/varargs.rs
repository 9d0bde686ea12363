//! Varargs call-site lowering
//!
//! Rewrites every call to a varargs method so the trailing arguments
//! arrive as a single array literal; after this pass, code generation
//! never sees a spread call. Runs unconditionally before lowering.

use crate::semantic::symbol_table::SymbolTable;
use crate::semantic::type_engine::TypeEngine;
use jmm_parser::ast::{Expr, Program, Stmt};

/// Normalise varargs call sites in place; returns the number of calls
/// rewritten.
pub fn lower_varargs(program: &mut Program, table: &SymbolTable) -> usize {
    let engine = TypeEngine::new(table);
    let mut count = 0;
    let method_names: Vec<String> =
        program.class.methods.iter().map(|m| m.name.clone()).collect();
    for (method, name) in program.class.methods.iter_mut().zip(method_names) {
        for stmt in &mut method.body {
            count += rewrite_stmt(stmt, &name, table, engine);
        }
    }
    count
}

fn rewrite_stmt(stmt: &mut Stmt, method: &str, table: &SymbolTable, engine: TypeEngine<'_>) -> usize {
    match stmt {
        Stmt::Block { stmts, .. } => stmts
            .iter_mut()
            .map(|s| rewrite_stmt(s, method, table, engine))
            .sum(),
        Stmt::If {
            cond,
            then_branch,
            else_branch,
            ..
        } => {
            rewrite_expr(cond, method, table, engine)
                + rewrite_stmt(then_branch, method, table, engine)
                + rewrite_stmt(else_branch, method, table, engine)
        }
        Stmt::While { cond, body, .. } => {
            rewrite_expr(cond, method, table, engine) + rewrite_stmt(body, method, table, engine)
        }
        Stmt::Assign { value, .. } => rewrite_expr(value, method, table, engine),
        Stmt::ArrayAssign { index, value, .. } => {
            rewrite_expr(index, method, table, engine) + rewrite_expr(value, method, table, engine)
        }
        Stmt::Return { value, .. } => rewrite_expr(value, method, table, engine),
        Stmt::Expr { expr, .. } => rewrite_expr(expr, method, table, engine),
    }
}

fn rewrite_expr(expr: &mut Expr, method: &str, table: &SymbolTable, engine: TypeEngine<'_>) -> usize {
    let mut count = match expr {
        Expr::Binary { lhs, rhs, .. } => {
            rewrite_expr(lhs, method, table, engine) + rewrite_expr(rhs, method, table, engine)
        }
        Expr::Not { expr: inner, .. } | Expr::Paren { expr: inner, .. } => {
            rewrite_expr(inner, method, table, engine)
        }
        Expr::Call { receiver, args, .. } => {
            let mut count = rewrite_expr(receiver, method, table, engine);
            for arg in args.iter_mut() {
                count += rewrite_expr(arg, method, table, engine);
            }
            count
        }
        Expr::Member { object, .. } => rewrite_expr(object, method, table, engine),
        Expr::ArrayAccess { array, index, .. } => {
            rewrite_expr(array, method, table, engine) + rewrite_expr(index, method, table, engine)
        }
        Expr::ArrayLiteral { elements, .. } => elements
            .iter_mut()
            .map(|e| rewrite_expr(e, method, table, engine))
            .sum(),
        Expr::NewArray { size, .. } => rewrite_expr(size, method, table, engine),
        _ => 0,
    };

    if let Expr::Call {
        method: callee,
        args,
        span,
        ..
    } = expr
    {
        let varargs = table
            .method(callee)
            .map(|sig| sig.is_varargs)
            .unwrap_or(false);
        if varargs {
            let param_count = table.params_of(callee).map(|p| p.len()).unwrap_or(0);
            if needs_reification(args, param_count, method, engine) {
                let trailing: Vec<Expr> = args.drain(param_count - 1..).collect();
                let group_span = trailing
                    .iter()
                    .map(Expr::span)
                    .reduce(|a, b| a.merge(&b))
                    .unwrap_or(*span);
                args.push(Expr::ArrayLiteral {
                    elements: trailing,
                    span: group_span,
                });
                count += 1;
            }
        }
    }
    count
}

/// A call needs rewriting unless it already passes exactly one
/// array-valued argument in the varargs position.
fn needs_reification(
    args: &[Expr],
    param_count: usize,
    method: &str,
    engine: TypeEngine<'_>,
) -> bool {
    if args.len() == param_count {
        if let Some(last) = args.last() {
            if matches!(last, Expr::ArrayLiteral { .. }) {
                return false;
            }
            if let Some(ty) = engine.type_of(last, method) {
                if ty.is_array {
                    return false;
                }
            }
        }
    }
    args.len() >= param_count.saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jmm_parser::parse_program;

    fn lower(src: &str) -> (Program, usize) {
        let mut program = parse_program(src).expect("parse failed");
        let table = SymbolTable::build(&program);
        let count = lower_varargs(&mut program, &table);
        (program, count)
    }

    fn first_call_args(program: &Program, method_index: usize) -> &[Expr] {
        let Stmt::Return { value, .. } = program.class.methods[method_index].body.last().unwrap()
        else {
            panic!("expected return");
        };
        let Expr::Call { args, .. } = value.unwrap_parens() else {
            panic!("expected call, got {:?}", value);
        };
        args
    }

    #[test]
    fn test_spread_arguments_grouped() {
        let (program, count) = lower(
            "class A { public int sum(int... xs) { return xs[0]; } \
             public int f() { return this.sum(1, 2, 3); } }",
        );
        assert_eq!(count, 1);
        let args = first_call_args(&program, 1);
        assert_eq!(args.len(), 1);
        let Expr::ArrayLiteral { elements, .. } = &args[0] else {
            panic!("expected array literal, got {:?}", args[0]);
        };
        assert_eq!(elements.len(), 3);
    }

    #[test]
    fn test_fixed_params_kept_out_of_group() {
        let (program, count) = lower(
            "class A { public int sum(int base, int... xs) { return base; } \
             public int f() { return this.sum(10, 1, 2); } }",
        );
        assert_eq!(count, 1);
        let args = first_call_args(&program, 1);
        assert_eq!(args.len(), 2);
        assert!(matches!(args[0], Expr::IntLiteral { value: 10, .. }));
        assert!(matches!(&args[1], Expr::ArrayLiteral { elements, .. } if elements.len() == 2));
    }

    #[test]
    fn test_array_argument_left_alone() {
        let (program, count) = lower(
            "class A { public int sum(int... xs) { return xs[0]; } \
             public int f(int[] a) { return this.sum(a); } }",
        );
        assert_eq!(count, 0);
        let args = first_call_args(&program, 1);
        assert_eq!(args.len(), 1);
        assert!(matches!(&args[0], Expr::Identifier { .. }));
    }

    #[test]
    fn test_empty_varargs_call_gets_empty_array() {
        let (program, count) = lower(
            "class A { public int sum(int... xs) { return 0; } \
             public int f() { return this.sum(); } }",
        );
        assert_eq!(count, 1);
        let args = first_call_args(&program, 1);
        assert_eq!(args.len(), 1);
        assert!(matches!(&args[0], Expr::ArrayLiteral { elements, .. } if elements.is_empty()));
    }

    #[test]
    fn test_non_varargs_calls_untouched() {
        let (program, count) = lower(
            "class A { public int g(int a, int b) { return a; } \
             public int f() { return this.g(1, 2); } }",
        );
        assert_eq!(count, 0);
        assert_eq!(first_call_args(&program, 1).len(), 2);
    }
}
