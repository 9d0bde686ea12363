//! Type checking
//!
//! Operand and assignment compatibility over the whole method body.
//! Unresolvable names type as `None` and are skipped here; the earlier
//! name passes already rejected them.

use super::{for_each_expr, for_each_stmt, SemanticPass};
use crate::report::Report;
use crate::semantic::symbol_table::SymbolTable;
use crate::semantic::type_engine::TypeEngine;
use crate::types::Type;
use jmm_parser::ast::{BinaryOp, Expr, MethodDecl, Program, Stmt};

/// Operator, assignment, condition, return and call-site typing rules
#[derive(Debug, Default)]
pub struct TypeCheck;

impl SemanticPass for TypeCheck {
    fn name(&self) -> &'static str {
        "type_check"
    }

    fn check(&self, program: &Program, table: &SymbolTable) -> Vec<Report> {
        let engine = TypeEngine::new(table);
        let mut reports = Vec::new();
        for method in &program.class.methods {
            check_expressions(method, table, engine, &mut reports);
            check_statements(method, table, engine, &mut reports);
        }
        reports
    }
}

fn check_expressions(
    method: &MethodDecl,
    table: &SymbolTable,
    engine: TypeEngine<'_>,
    reports: &mut Vec<Report>,
) {
    for_each_expr(method, &mut |expr| match expr {
        Expr::Binary { op, lhs, rhs, span } => {
            let (Some(lt), Some(rt)) = (
                engine.type_of(lhs, &method.name),
                engine.type_of(rhs, &method.name),
            ) else {
                return;
            };
            if lt.is_array || rt.is_array {
                reports.push(Report::semantic(
                    *span,
                    format!("array operand in binary expression '{}'", op.symbol()),
                ));
                return;
            }
            if *op == BinaryOp::Eq {
                if !lt.is_any() && !rt.is_any() && lt != rt {
                    reports.push(Report::semantic(
                        *span,
                        format!("cannot compare '{}' with '{}'", lt, rt),
                    ));
                }
                return;
            }
            for operand_ty in [&lt, &rt] {
                if !engine.binary_operand_ok(*op, operand_ty) {
                    reports.push(Report::semantic(
                        *span,
                        format!("operator '{}' cannot take '{}'", op.symbol(), operand_ty),
                    ));
                }
            }
        }
        Expr::Not { expr: operand, span } => {
            if let Some(ty) = engine.type_of(operand, &method.name) {
                if !ty.is_boolean() && !ty.is_any() {
                    reports.push(Report::semantic(
                        *span,
                        format!("operator '!' cannot take '{}'", ty),
                    ));
                }
            }
        }
        Expr::ArrayAccess { index, span, .. } => {
            if let Some(ty) = engine.type_of(index, &method.name) {
                if !ty.is_int() && !ty.is_any() {
                    reports.push(Report::semantic(
                        *span,
                        format!("array index must be int, found '{}'", ty),
                    ));
                }
            }
        }
        Expr::NewArray { size, span } => {
            if let Some(ty) = engine.type_of(size, &method.name) {
                if !ty.is_int() && !ty.is_any() {
                    reports.push(Report::semantic(
                        *span,
                        format!("array size must be int, found '{}'", ty),
                    ));
                }
            }
        }
        Expr::Call {
            receiver,
            method: callee,
            args,
            span,
        } => {
            // Only calls into this class have a known signature
            let receiver_ty = engine.type_of(receiver, &method.name);
            let own = matches!(
                receiver_ty.as_ref().and_then(|t| t.class_name()),
                Some(name) if name == table.class_name()
            );
            if own {
                if let Some(sig) = table.method(callee) {
                    check_call_site(
                        method, engine, callee, sig.is_varargs, &sig.params, args, *span, reports,
                    );
                }
            }
        }
        _ => {}
    });
}

#[allow(clippy::too_many_arguments)]
fn check_call_site(
    method: &MethodDecl,
    engine: TypeEngine<'_>,
    callee: &str,
    is_varargs: bool,
    params: &[crate::semantic::symbol_table::Symbol],
    args: &[Expr],
    span: jmm_parser::Span,
    reports: &mut Vec<Report>,
) {
    let fixed = if is_varargs {
        params.len() - 1
    } else {
        params.len()
    };

    if !is_varargs && args.len() != params.len() {
        reports.push(Report::semantic(
            span,
            format!(
                "method '{}' takes {} argument(s), found {}",
                callee,
                params.len(),
                args.len()
            ),
        ));
        return;
    }
    if is_varargs && args.len() < fixed {
        reports.push(Report::semantic(
            span,
            format!(
                "method '{}' takes at least {} argument(s), found {}",
                callee,
                fixed,
                args.len()
            ),
        ));
        return;
    }

    for (arg, param) in args.iter().zip(params.iter()).take(fixed) {
        check_arg(method, engine, callee, arg, &param.ty, reports);
    }
    if !is_varargs {
        return;
    }
    let vararg_ty = &params[params.len() - 1].ty;
    let trailing = &args[fixed..];
    // Either a single array argument, or any number of element-typed ones
    if trailing.len() == 1 {
        if let Some(ty) = engine.type_of(&trailing[0], &method.name) {
            if ty.is_array || ty.is_any() {
                return;
            }
        }
    }
    for arg in trailing {
        check_arg(method, engine, callee, arg, &vararg_ty.element(), reports);
    }
}

fn check_arg(
    method: &MethodDecl,
    engine: TypeEngine<'_>,
    callee: &str,
    arg: &Expr,
    expected: &Type,
    reports: &mut Vec<Report>,
) {
    let Some(found) = engine.type_of(arg, &method.name) else {
        return;
    };
    if !engine.assignable(&found, expected) {
        reports.push(Report::semantic(
            arg.span(),
            format!(
                "argument of type '{}' does not match parameter type '{}' of '{}'",
                found, expected, callee
            ),
        ));
    }
}

fn check_statements(
    method: &MethodDecl,
    table: &SymbolTable,
    engine: TypeEngine<'_>,
    reports: &mut Vec<Report>,
) {
    for_each_stmt(method, &mut |stmt| match stmt {
        Stmt::Assign { name, value, span } => {
            let Some((_, lhs_ty)) = table.resolve_var(&method.name, name) else {
                return;
            };
            let lhs_ty = lhs_ty.clone();
            if let Some(rhs_ty) = engine.type_of(value, &method.name) {
                if !engine.assignable(&rhs_ty, &lhs_ty) {
                    reports.push(Report::semantic(
                        *span,
                        format!("cannot assign '{}' to '{}' of type '{}'", rhs_ty, name, lhs_ty),
                    ));
                }
            }
        }
        Stmt::ArrayAssign {
            name,
            index,
            value,
            span,
        } => {
            if let Some(ty) = engine.type_of(index, &method.name) {
                if !ty.is_int() && !ty.is_any() {
                    reports.push(Report::semantic(
                        *span,
                        format!("array index must be int, found '{}'", ty),
                    ));
                }
            }
            let element_ty = table
                .resolve_var(&method.name, name)
                .map(|(_, ty)| ty.element());
            if let (Some(element_ty), Some(value_ty)) =
                (element_ty, engine.type_of(value, &method.name))
            {
                if !engine.assignable(&value_ty, &element_ty) {
                    reports.push(Report::semantic(
                        *span,
                        format!("cannot store '{}' into '{}[..]'", value_ty, name),
                    ));
                }
            }
        }
        Stmt::If { cond, span, .. } | Stmt::While { cond, span, .. } => {
            if let Some(ty) = engine.type_of(cond, &method.name) {
                if !ty.is_boolean() && !ty.is_any() {
                    reports.push(Report::semantic(
                        *span,
                        format!("condition must be boolean, found '{}'", ty),
                    ));
                }
            }
        }
        Stmt::Return { value, span } => {
            let expected = Type::from_node(&method.return_type);
            if let Some(found) = engine.type_of(value, &method.name) {
                if !engine.assignable(&found, &expected) {
                    reports.push(Report::semantic(
                        *span,
                        format!(
                            "method '{}' returns '{}', found '{}'",
                            method.name, expected, found
                        ),
                    ));
                }
            }
        }
        Stmt::Block { .. } | Stmt::Expr { .. } => {}
    });
}

/// Indexed expressions must have array type
#[derive(Debug, Default)]
pub struct InvalidArrayAccess;

impl SemanticPass for InvalidArrayAccess {
    fn name(&self) -> &'static str {
        "invalid_array_access"
    }

    fn check(&self, program: &Program, table: &SymbolTable) -> Vec<Report> {
        let engine = TypeEngine::new(table);
        let mut reports = Vec::new();
        for method in &program.class.methods {
            for_each_expr(method, &mut |expr| {
                if let Expr::ArrayAccess { array, span, .. } = expr {
                    if let Some(ty) = engine.type_of(array, &method.name) {
                        if !ty.is_array && !ty.is_any() {
                            reports.push(Report::semantic(
                                *span,
                                format!("cannot index into value of type '{}'", ty),
                            ));
                        }
                    }
                }
            });
            for_each_stmt(method, &mut |stmt| {
                if let Stmt::ArrayAssign { name, span, .. } = stmt {
                    if let Some((_, ty)) = table.resolve_var(&method.name, name) {
                        if !ty.is_array && !ty.is_any() {
                            reports.push(Report::semantic(
                                *span,
                                format!("cannot index into '{}' of type '{}'", name, ty),
                            ));
                        }
                    }
                }
            });
        }
        reports
    }
}
