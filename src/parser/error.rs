//! Parse errors and the tolerant parse result.

use crate::base::Span;
use thiserror::Error;

use super::ast::SourceUnitNode;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// Result of a tolerant parse: whatever could be built, plus the errors
/// encountered along the way.
#[derive(Debug, Clone)]
pub struct ParseResult {
    pub unit: SourceUnitNode,
    pub errors: Vec<ParseError>,
}

impl ParseResult {
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// True when nothing usable came out of the input. The workspace
    /// treats this as a parse failure for the whole file.
    pub fn is_empty_with_errors(&self) -> bool {
        self.unit.items.is_empty() && !self.errors.is_empty()
    }
}
