//! Semantic analysis
//!
//! Builds the symbol table and runs the checker sequence over the AST.

pub mod passes;
pub mod symbol_table;
pub mod type_engine;

pub use symbol_table::{MethodSignature, Symbol, SymbolTable, VarLocation};
pub use type_engine::TypeEngine;

use crate::report::Report;
use jmm_parser::ast::Program;
use passes::default_passes;

/// Run the semantic passes in order; the result is the report list of
/// the first pass that found anything, or empty when the program is
/// semantically valid. Later passes can therefore rely on the
/// invariants the earlier ones enforce.
pub fn analyse(program: &Program, table: &SymbolTable) -> Vec<Report> {
    for pass in default_passes() {
        let reports = pass.check(program, table);
        if !reports.is_empty() {
            return reports;
        }
    }
    Vec::new()
}
