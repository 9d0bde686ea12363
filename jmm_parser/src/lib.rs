//! Lexer and parser for Jmm (Java--)
//!
//! Jmm is a small Java-like object-oriented language: imports, a single
//! class with optional inheritance, `int`/`boolean`/`int[]` data, methods
//! with `public`/`static` modifiers and a trailing `int...` varargs
//! parameter. This crate turns source text into the typed AST in
//! [`ast`]; everything from name resolution onwards lives in the
//! compiler crate.

pub mod ast;
pub mod error;
pub mod parser;
pub mod span;
pub mod token;

pub use ast::{
    BinaryOp, ClassDecl, Expr, ImportDecl, MethodDecl, Param, Program, Stmt, TypeNode, VarDecl,
};
pub use error::{ParseError, ParseResult};
pub use parser::{parse_program, Parser};
pub use span::{SourceMap, Span};
pub use token::Token;
