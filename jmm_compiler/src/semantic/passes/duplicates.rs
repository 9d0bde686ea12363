//! Duplicate-name detection

use super::SemanticPass;
use crate::report::Report;
use crate::semantic::symbol_table::SymbolTable;
use jmm_parser::ast::Program;
use std::collections::HashSet;

/// Imports, fields, methods, parameters and locals must all be unique
/// within their scope; parameters and locals also may not collide with
/// each other.
#[derive(Debug, Default)]
pub struct DuplicatedElement;

impl SemanticPass for DuplicatedElement {
    fn name(&self) -> &'static str {
        "duplicated_element"
    }

    fn check(&self, program: &Program, _table: &SymbolTable) -> Vec<Report> {
        let mut reports = Vec::new();

        let mut imports = HashSet::new();
        for import in &program.imports {
            if !imports.insert(import.dotted()) {
                reports.push(Report::semantic(
                    import.span,
                    format!("duplicated import '{}'", import.dotted()),
                ));
            }
        }

        let class = &program.class;
        let mut fields = HashSet::new();
        for field in &class.fields {
            if !fields.insert(field.name.as_str()) {
                reports.push(Report::semantic(
                    field.span,
                    format!("duplicated field '{}'", field.name),
                ));
            }
        }

        let mut methods = HashSet::new();
        for method in &class.methods {
            if !methods.insert(method.name.as_str()) {
                reports.push(Report::semantic(
                    method.span,
                    format!("duplicated method '{}'", method.name),
                ));
            }

            let mut params = HashSet::new();
            for param in &method.params {
                if !params.insert(param.name.as_str()) {
                    reports.push(Report::semantic(
                        param.span,
                        format!(
                            "duplicated parameter '{}' in method '{}'",
                            param.name, method.name
                        ),
                    ));
                }
            }
            let mut locals = HashSet::new();
            for local in &method.locals {
                if !locals.insert(local.name.as_str()) {
                    reports.push(Report::semantic(
                        local.span,
                        format!(
                            "duplicated local '{}' in method '{}'",
                            local.name, method.name
                        ),
                    ));
                } else if params.contains(local.name.as_str()) {
                    reports.push(Report::semantic(
                        local.span,
                        format!(
                            "local '{}' shadows a parameter of method '{}'",
                            local.name, method.name
                        ),
                    ));
                }
            }
        }

        reports
    }
}
