//! Static-context rules

use super::{for_each_expr, for_each_stmt, SemanticPass};
use crate::report::Report;
use crate::semantic::symbol_table::{SymbolTable, VarLocation};
use jmm_parser::ast::{Expr, Program, Stmt};

/// `this` may not appear inside a static method, and neither may an
/// identifier that resolves to an instance field.
#[derive(Debug, Default)]
pub struct StaticContext;

impl SemanticPass for StaticContext {
    fn name(&self) -> &'static str {
        "static_context"
    }

    fn check(&self, program: &Program, table: &SymbolTable) -> Vec<Report> {
        let mut reports = Vec::new();
        for method in &program.class.methods {
            if !method.is_static {
                continue;
            }
            for_each_expr(method, &mut |expr| match expr {
                Expr::This { span } => {
                    reports.push(Report::semantic(
                        *span,
                        format!("'this' cannot be used in static method '{}'", method.name),
                    ));
                }
                Expr::Identifier { name, span } => {
                    if let Some((VarLocation::Field, _)) = table.resolve_var(&method.name, name) {
                        reports.push(Report::semantic(
                            *span,
                            format!(
                                "field '{}' cannot be used in static method '{}'",
                                name, method.name
                            ),
                        ));
                    }
                }
                _ => {}
            });
            // Assignment targets are plain names, not expressions
            for_each_stmt(method, &mut |stmt| {
                let (name, span) = match stmt {
                    Stmt::Assign { name, span, .. } => (name, span),
                    Stmt::ArrayAssign { name, span, .. } => (name, span),
                    _ => return,
                };
                if let Some((VarLocation::Field, _)) = table.resolve_var(&method.name, name) {
                    reports.push(Report::semantic(
                        *span,
                        format!(
                            "field '{}' cannot be assigned in static method '{}'",
                            name, method.name
                        ),
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

    fn check(src: &str) -> Vec<Report> {
        let program = parse_program(src).expect("parse failed");
        let table = SymbolTable::build(&program);
        StaticContext.check(&program, &table)
    }

    #[test]
    fn test_this_in_instance_method_is_fine() {
        let reports = check("class A { public A f() { return this; } }");
        assert!(reports.is_empty());
    }

    #[test]
    fn test_this_in_main_rejected() {
        let reports = check(
            "class A { public int g() { return 1; } \
             public static void main(String[] args) { this.g(); } }",
        );
        assert_eq!(reports.len(), 1);
        assert!(reports[0].message.contains("'this'"));
    }

    #[test]
    fn test_field_in_static_method_rejected() {
        let reports = check(
            "class A { int q; public static void main(String[] args) { int x; x = q; } }",
        );
        assert_eq!(reports.len(), 1);
        assert!(reports[0].message.contains("field 'q'"));
    }

    #[test]
    fn test_local_shadowing_field_in_static_is_fine() {
        let reports = check(
            "class A { int q; public static void main(String[] args) { int q; q = 1; } }",
        );
        assert!(reports.is_empty(), "unexpected: {:?}", reports);
    }
}
