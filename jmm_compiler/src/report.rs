//! User-facing diagnostics
//!
//! Semantic passes and the register allocator produce `Report` values;
//! the driver collects them and never emits code once any exist.

use jmm_parser::Span;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a report. The compiler currently only emits errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportKind {
    Error,
}

/// Pipeline stage a report originates from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Semantic,
    Optimization,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Semantic => write!(f, "SEMANTIC"),
            Stage::Optimization => write!(f, "OPTIMIZATION"),
        }
    }
}

/// A single diagnostic with its source position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub kind: ReportKind,
    pub stage: Stage,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl Report {
    /// Create a semantic error at the given span
    pub fn semantic(span: Span, message: impl Into<String>) -> Self {
        Self {
            kind: ReportKind::Error,
            stage: Stage::Semantic,
            line: span.line,
            column: span.column,
            message: message.into(),
        }
    }

    /// Create an optimization-stage error (e.g. register ceiling violation)
    pub fn optimization(message: impl Into<String>) -> Self {
        Self {
            kind: ReportKind::Error,
            stage: Stage::Optimization,
            line: 0,
            column: 0,
            message: message.into(),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line > 0 {
            write!(
                f,
                "{} error at line {}, column {}: {}",
                self.stage, self.line, self.column, self.message
            )
        } else {
            write!(f, "{} error: {}", self.stage, self.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semantic_report_display() {
        let span = Span::new(0, 1, 3, 7);
        let report = Report::semantic(span, "undeclared variable 'x'");
        assert_eq!(
            report.to_string(),
            "SEMANTIC error at line 3, column 7: undeclared variable 'x'"
        );
    }

    #[test]
    fn test_optimization_report_display() {
        let report = Report::optimization("Need at least 3 registers");
        assert_eq!(
            report.to_string(),
            "OPTIMIZATION error: Need at least 3 registers"
        );
    }
}
