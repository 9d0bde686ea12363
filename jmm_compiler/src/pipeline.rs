//! Compilation pipeline
//!
//! Single-threaded batch driver: source text → AST → symbol table →
//! semantic passes → (optional) constant optimisation → varargs
//! lowering → OLLIR → IR → (optional) register allocation → Jasmin.
//! Each stage runs to completion before the next reads its output.

use crate::ir::parse_class_unit;
use crate::jasmin::emit_jasmin;
use crate::ollir::emit_ollir;
use crate::optimize::{lower_varargs, ConstantOptimiser};
use crate::regalloc::{allocate_registers, AllocationMode};
use crate::report::Report;
use crate::semantic::{self, SymbolTable};
use jmm_parser::ast::Program;
use jmm_parser::{parse_program, ParseError};
use std::path::Path;
use thiserror::Error;

/// Compiler flags
#[derive(Debug, Clone)]
pub struct Config {
    /// Run the constant optimiser (propagation + folding)
    pub optimize: bool,
    /// Register allocation: −1 disables, 0 minimises, n > 0 sets a
    /// ceiling on local registers
    pub register_allocation: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            optimize: false,
            register_allocation: -1,
        }
    }
}

/// Errors that abort the pipeline outright (diagnostics travel in
/// [`Compilation::reports`] instead)
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("could not read source: {0}")]
    Io(#[from] std::io::Error),
    /// A stage produced something the next stage cannot consume; a
    /// compiler bug, reported once with the offending stage named
    #[error("internal failure in {stage}: {message}")]
    Internal { stage: &'static str, message: String },
}

/// Everything one compilation produced
#[derive(Debug)]
pub struct Compilation {
    pub ast: Program,
    pub symbol_table: SymbolTable,
    /// Present once semantic analysis passed
    pub ollir: Option<String>,
    /// Present once lowering and allocation succeeded
    pub jasmin: Option<String>,
    pub reports: Vec<Report>,
}

impl Compilation {
    /// Whether the compilation produced no error reports
    pub fn succeeded(&self) -> bool {
        self.reports.is_empty()
    }
}

/// Compile a source string under the given flags
pub fn compile_source(source: &str, config: &Config) -> Result<Compilation, PipelineError> {
    let mut ast = parse_program(source)?;
    let table = SymbolTable::build(&ast);

    let reports = semantic::analyse(&ast, &table);
    if !reports.is_empty() {
        return Ok(Compilation {
            ast,
            symbol_table: table,
            ollir: None,
            jasmin: None,
            reports,
        });
    }

    if config.optimize {
        ConstantOptimiser::new().optimise(&mut ast);
    }
    lower_varargs(&mut ast, &table);

    let ollir = emit_ollir(&ast, &table);
    let mut unit = parse_class_unit(&ollir).map_err(|e| PipelineError::Internal {
        stage: "ollir reader",
        message: e.to_string(),
    })?;

    let mode = AllocationMode::from_flag(config.register_allocation);
    let ra_reports = allocate_registers(&mut unit, mode);
    if !ra_reports.is_empty() {
        return Ok(Compilation {
            ast,
            symbol_table: table,
            ollir: Some(ollir),
            jasmin: None,
            reports: ra_reports,
        });
    }

    let jasmin = emit_jasmin(&unit);
    Ok(Compilation {
        ast,
        symbol_table: table,
        ollir: Some(ollir),
        jasmin: Some(jasmin),
        reports: Vec::new(),
    })
}

/// Compile a `.jmm` file from disk
pub fn compile_file(path: impl AsRef<Path>, config: &Config) -> Result<Compilation, PipelineError> {
    let source = std::fs::read_to_string(path)?;
    compile_source(&source, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_pipeline_produces_all_artifacts() {
        let src = "class A { public int add(int a, int b) { return a + b; } }";
        let result = compile_source(src, &Config::default()).expect("pipeline failed");
        assert!(result.succeeded());
        assert!(result.ollir.is_some());
        assert!(result.jasmin.is_some());
    }

    #[test]
    fn test_semantic_failure_stops_before_lowering() {
        let src = "class A { public int f() { return ghost; } }";
        let result = compile_source(src, &Config::default()).expect("pipeline failed");
        assert!(!result.succeeded());
        assert!(result.ollir.is_none());
        assert!(result.jasmin.is_none());
    }

    #[test]
    fn test_parse_failure_is_an_error() {
        assert!(compile_source("class {", &Config::default()).is_err());
    }

    #[test]
    fn test_register_ceiling_failure_keeps_ollir() {
        let src = "class A { public int f() { int a; int b; int c; \
                   a = 1; b = 2; c = 3; \
                   return a + b + c + a; } }";
        let config = Config {
            register_allocation: 1,
            ..Config::default()
        };
        let result = compile_source(src, &config).expect("pipeline failed");
        assert!(!result.succeeded());
        assert!(result.ollir.is_some());
        assert!(result.jasmin.is_none());
    }
}
