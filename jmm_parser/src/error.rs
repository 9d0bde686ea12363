//! Parse error types

use crate::span::Span;
use thiserror::Error;

/// Parse error type
#[derive(Error, Debug, Clone)]
pub enum ParseError {
    /// Unexpected token
    #[error("unexpected {found} at line {}, column {}, expected {expected}", span.line, span.column)]
    UnexpectedToken {
        found: String,
        expected: String,
        span: Span,
    },

    /// Unexpected end of input
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String, span: Span },

    /// Integer literal out of the 32-bit range
    #[error("integer literal '{literal}' out of range at line {}, column {}", span.line, span.column)]
    IntegerOutOfRange { literal: String, span: Span },

    /// Unrecognized character sequence
    #[error("unrecognized token '{text}' at line {}, column {}", span.line, span.column)]
    LexerError { text: String, span: Span },

    /// A structurally invalid construct, e.g. varargs outside parameter position
    #[error("{message} at line {}, column {}", span.line, span.column)]
    InvalidSyntax { message: String, span: Span },
}

impl ParseError {
    /// Get the span of the error
    pub fn span(&self) -> &Span {
        match self {
            ParseError::UnexpectedToken { span, .. }
            | ParseError::UnexpectedEof { span, .. }
            | ParseError::IntegerOutOfRange { span, .. }
            | ParseError::LexerError { span, .. }
            | ParseError::InvalidSyntax { span, .. } => span,
        }
    }

    /// Create an unexpected token error
    pub fn unexpected(found: impl Into<String>, expected: impl Into<String>, span: Span) -> Self {
        ParseError::UnexpectedToken {
            found: found.into(),
            expected: expected.into(),
            span,
        }
    }

    /// Create an invalid-syntax error
    pub fn invalid(message: impl Into<String>, span: Span) -> Self {
        ParseError::InvalidSyntax {
            message: message.into(),
            span,
        }
    }
}

/// Result alias used throughout the parser
pub type ParseResult<T> = Result<T, ParseError>;
