//! Name resolution checks: variables and called methods

use super::{for_each_expr, for_each_stmt, SemanticPass};
use crate::report::Report;
use crate::semantic::symbol_table::SymbolTable;
use crate::semantic::type_engine::TypeEngine;
use crate::types::BaseType;
use jmm_parser::ast::{Expr, Program, Stmt};

/// Every variable reference resolves to a local, parameter, field or
/// imported class.
#[derive(Debug, Default)]
pub struct UndeclaredVariable;

impl SemanticPass for UndeclaredVariable {
    fn name(&self) -> &'static str {
        "undeclared_variable"
    }

    fn check(&self, program: &Program, table: &SymbolTable) -> Vec<Report> {
        let mut reports = Vec::new();
        for method in &program.class.methods {
            for_each_expr(method, &mut |expr| {
                if let Expr::Identifier { name, span } = expr {
                    if table.resolve_var(&method.name, name).is_none() && !table.is_imported(name)
                    {
                        reports.push(Report::semantic(
                            *span,
                            format!("undeclared variable '{}'", name),
                        ));
                    }
                }
            });
            for_each_stmt(method, &mut |stmt| {
                let (name, span) = match stmt {
                    Stmt::Assign { name, span, .. } => (name, span),
                    Stmt::ArrayAssign { name, span, .. } => (name, span),
                    _ => return,
                };
                if table.resolve_var(&method.name, name).is_none() {
                    reports.push(Report::semantic(
                        *span,
                        format!("undeclared variable '{}'", name),
                    ));
                }
            });
        }
        reports
    }
}

/// Every called method is declared in this class, reachable through an
/// imported receiver, or assumed on the imported superclass.
#[derive(Debug, Default)]
pub struct UndefinedMethod;

impl SemanticPass for UndefinedMethod {
    fn name(&self) -> &'static str {
        "undefined_method"
    }

    fn check(&self, program: &Program, table: &SymbolTable) -> Vec<Report> {
        let engine = TypeEngine::new(table);
        let mut reports = Vec::new();
        for method in &program.class.methods {
            for_each_expr(method, &mut |expr| {
                let Expr::Call {
                    receiver,
                    method: callee,
                    span,
                    ..
                } = expr
                else {
                    return;
                };
                let receiver_ty = engine.type_of(receiver, &method.name);
                let known = match receiver_ty {
                    // Unresolvable receiver: reported by the variable pass
                    None => true,
                    Some(ty) => match &ty.base {
                        _ if ty.is_array => false,
                        BaseType::Any => true,
                        BaseType::Class(name) if name == table.class_name() => {
                            table.has_method(callee)
                                || table
                                    .super_class()
                                    .map(|parent| table.is_imported(parent))
                                    .unwrap_or(false)
                        }
                        BaseType::Class(name) => table.is_imported(name),
                        _ => false,
                    },
                };
                if !known {
                    reports.push(Report::semantic(
                        *span,
                        format!("undefined method '{}'", callee),
                    ));
                }
            });
        }
        reports
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jmm_parser::parse_program;

    fn run(pass: &dyn SemanticPass, src: &str) -> Vec<Report> {
        let program = parse_program(src).expect("parse failed");
        let table = SymbolTable::build(&program);
        pass.check(&program, &table)
    }

    #[test]
    fn test_declared_names_resolve() {
        let reports = run(
            &UndeclaredVariable,
            "import io; class A { int q; public int f(int a) { int b; b = a; io.println(b); return q; } }",
        );
        assert!(reports.is_empty(), "unexpected: {:?}", reports);
    }

    #[test]
    fn test_undeclared_use_reported() {
        let reports = run(
            &UndeclaredVariable,
            "class A { public int f() { return ghost; } }",
        );
        assert_eq!(reports.len(), 1);
        assert!(reports[0].message.contains("'ghost'"));
    }

    #[test]
    fn test_undeclared_assignment_target_reported() {
        let reports = run(
            &UndeclaredVariable,
            "class A { public int f() { ghost = 1; return 1; } }",
        );
        assert_eq!(reports.len(), 1);
    }

    #[test]
    fn test_own_method_call_resolves() {
        let reports = run(
            &UndefinedMethod,
            "class A { public int g() { return 1; } public int f() { return this.g(); } }",
        );
        assert!(reports.is_empty());
    }

    #[test]
    fn test_unknown_method_on_this_reported() {
        let reports = run(
            &UndefinedMethod,
            "class A { public int f() { return this.g(); } }",
        );
        assert_eq!(reports.len(), 1);
        assert!(reports[0].message.contains("'g'"));
    }

    #[test]
    fn test_imported_superclass_assumed_to_provide() {
        let reports = run(
            &UndefinedMethod,
            "import Base; class A extends Base { public int f() { return this.inherited(); } }",
        );
        assert!(reports.is_empty(), "unexpected: {:?}", reports);
    }

    #[test]
    fn test_imported_receiver_assumed_to_provide() {
        let reports = run(
            &UndefinedMethod,
            "import Other; class A { public int f(Other o) { return o.anything(); } }",
        );
        assert!(reports.is_empty());
    }

    #[test]
    fn test_call_on_int_receiver_reported() {
        let reports = run(
            &UndefinedMethod,
            "class A { public int f(int x) { return x.compute(); } }",
        );
        assert_eq!(reports.len(), 1);
    }
}
