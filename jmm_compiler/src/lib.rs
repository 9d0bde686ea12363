//! Compiler for Jmm (Java--)
//!
//! Takes the AST produced by `jmm_parser` through semantic analysis,
//! optional constant optimisation, OLLIR lowering, register allocation
//! and Jasmin emission:
//!
//! source → AST → symbol table → semantic passes → OLLIR → IR → Jasmin
//!
//! The [`pipeline`] module drives the whole sequence; every stage is
//! also usable on its own.

// Core stages
pub mod ir;
pub mod jasmin;
pub mod ollir;
pub mod optimize;
pub mod regalloc;
pub mod report;
pub mod semantic;
pub mod types;

// Batch driver
pub mod pipeline;

pub use pipeline::{compile_file, compile_source, Compilation, Config, PipelineError};
pub use report::{Report, ReportKind, Stage};
pub use semantic::{SymbolTable, TypeEngine};
pub use types::{BaseType, Type};
