//! Varargs placement rules

use super::SemanticPass;
use crate::report::Report;
use crate::semantic::symbol_table::SymbolTable;
use jmm_parser::ast::Program;

/// `int...` may only appear as the last parameter of a method: never on
/// fields, locals or return types, and at most once per method.
#[derive(Debug, Default)]
pub struct InvalidVarargs;

impl SemanticPass for InvalidVarargs {
    fn name(&self) -> &'static str {
        "invalid_varargs"
    }

    fn check(&self, program: &Program, _table: &SymbolTable) -> Vec<Report> {
        let mut reports = Vec::new();
        for field in &program.class.fields {
            if field.ty.is_varargs {
                reports.push(Report::semantic(
                    field.span,
                    format!("field '{}' cannot be varargs", field.name),
                ));
            }
        }
        for method in &program.class.methods {
            if method.return_type.is_varargs {
                reports.push(Report::semantic(
                    method.span,
                    format!("method '{}' cannot return varargs", method.name),
                ));
            }
            for local in &method.locals {
                if local.ty.is_varargs {
                    reports.push(Report::semantic(
                        local.span,
                        format!("local '{}' cannot be varargs", local.name),
                    ));
                }
            }
            let last = method.params.len().saturating_sub(1);
            for (i, param) in method.params.iter().enumerate() {
                if param.ty.is_varargs && i != last {
                    reports.push(Report::semantic(
                        param.span,
                        format!(
                            "varargs parameter '{}' must be the last parameter of '{}'",
                            param.name, method.name
                        ),
                    ));
                }
            }
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
        InvalidVarargs.check(&program, &table)
    }

    #[test]
    fn test_trailing_varargs_ok() {
        let reports = check("class A { public int f(int a, int... xs) { return a; } }");
        assert!(reports.is_empty());
    }

    #[test]
    fn test_varargs_field_rejected() {
        let reports = check("class A { int... xs; }");
        assert_eq!(reports.len(), 1);
    }

    #[test]
    fn test_varargs_local_rejected() {
        let reports = check("class A { public int f() { int... xs; return 1; } }");
        assert_eq!(reports.len(), 1);
    }

    #[test]
    fn test_varargs_return_rejected() {
        let reports = check("class A { public int... f() { return 1; } }");
        assert_eq!(reports.len(), 1);
    }

    #[test]
    fn test_varargs_not_last_rejected() {
        let reports = check("class A { public int f(int... xs, int a) { return a; } }");
        assert_eq!(reports.len(), 1);
        assert!(reports[0].message.contains("last parameter"));
    }
}
