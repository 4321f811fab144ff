//! Errors annotated with the source location that caused them.

use crate::span::Span;
use std::fmt;

/// An error message paired with the [`Span`] it refers to.
#[derive(Debug, Clone)]
pub struct SpannedError {
    /// Human-readable description.
    pub message: String,
    /// Location in source the error refers to.
    pub span: Span,
}

impl SpannedError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

impl fmt::Display for SpannedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}..{}", self.message, self.span.start, self.span.end)
    }
}

impl std::error::Error for SpannedError {}

/// Alias for `std::result::Result<T, SpannedError>`.
pub type Result<T> = std::result::Result<T, SpannedError>;
