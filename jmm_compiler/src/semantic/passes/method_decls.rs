//! Method declaration shape rules

use super::{for_each_stmt, SemanticPass};
use crate::report::Report;
use crate::semantic::symbol_table::SymbolTable;
use jmm_parser::ast::{MethodDecl, Program, Stmt};

/// Only `main` may (and must) be static, with the exact
/// `static void main(String[])` shape; a non-void method contains
/// exactly one `return` and it is the last statement; a void method
/// contains none.
#[derive(Debug, Default)]
pub struct InvalidMethodDeclaration;

impl SemanticPass for InvalidMethodDeclaration {
    fn name(&self) -> &'static str {
        "invalid_method_declaration"
    }

    fn check(&self, program: &Program, _table: &SymbolTable) -> Vec<Report> {
        let mut reports = Vec::new();
        for method in &program.class.methods {
            if method.name == "main" {
                check_main(method, &mut reports);
            } else if method.is_static {
                reports.push(Report::semantic(
                    method.span,
                    format!("method '{}' cannot be static", method.name),
                ));
            }
            check_returns(method, &mut reports);
        }
        reports
    }
}

fn check_main(method: &MethodDecl, reports: &mut Vec<Report>) {
    if !method.is_static {
        reports.push(Report::semantic(method.span, "'main' must be static"));
    }
    if method.return_type.name != "void" || method.return_type.is_array {
        reports.push(Report::semantic(method.span, "'main' must return void"));
    }
    let signature_ok = method.params.len() == 1
        && method.params[0].ty.name == "String"
        && method.params[0].ty.is_array
        && !method.params[0].ty.is_varargs;
    if !signature_ok {
        reports.push(Report::semantic(
            method.span,
            "'main' must take a single String[] parameter",
        ));
    }
}

fn check_returns(method: &MethodDecl, reports: &mut Vec<Report>) {
    let mut count = 0usize;
    for_each_stmt(method, &mut |stmt| {
        if matches!(stmt, Stmt::Return { .. }) {
            count += 1;
        }
    });
    let is_void = method.return_type.name == "void";
    if is_void {
        if count > 0 {
            reports.push(Report::semantic(
                method.span,
                format!("void method '{}' cannot contain 'return'", method.name),
            ));
        }
        return;
    }
    let last_is_return = matches!(method.body.last(), Some(Stmt::Return { .. }));
    if count != 1 || !last_is_return {
        reports.push(Report::semantic(
            method.span,
            format!(
                "method '{}' must end in exactly one 'return' statement",
                method.name
            ),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jmm_parser::parse_program;

    fn check(src: &str) -> Vec<Report> {
        let program = parse_program(src).expect("parse failed");
        let table = SymbolTable::build(&program);
        InvalidMethodDeclaration.check(&program, &table)
    }

    #[test]
    fn test_well_formed_methods() {
        let reports = check(
            "class A { public int f() { return 1; } \
             public static void main(String[] args) { } }",
        );
        assert!(reports.is_empty(), "unexpected: {:?}", reports);
    }

    #[test]
    fn test_static_non_main_rejected() {
        let reports = check("class A { public static int f() { return 1; } }");
        assert_eq!(reports.len(), 1);
        assert!(reports[0].message.contains("cannot be static"));
    }

    #[test]
    fn test_main_shape_enforced() {
        let reports = check("class A { public int main(int x) { return x; } }");
        // not static, wrong return type, wrong parameter
        assert_eq!(reports.len(), 3);
    }

    #[test]
    fn test_missing_return_rejected() {
        let reports = check("class A { public int f() { int x; x = 1; } }");
        assert_eq!(reports.len(), 1);
        assert!(reports[0].message.contains("'return'"));
    }

    #[test]
    fn test_return_not_last_rejected() {
        let reports = check("class A { public int f() { return 1; io.println(2); } }");
        assert_eq!(reports.len(), 1);
    }

    #[test]
    fn test_return_in_void_rejected() {
        let reports =
            check("class A { public static void main(String[] args) { return 1; } }");
        assert_eq!(reports.len(), 1);
        assert!(reports[0].message.contains("void method"));
    }

    #[test]
    fn test_nested_second_return_rejected() {
        let reports = check(
            "class A { public int f(boolean b) { \
             if (b) { return 1; } else { } return 2; } }",
        );
        assert_eq!(reports.len(), 1);
    }
}
