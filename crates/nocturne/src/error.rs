//! Error types for the nocturne engine.
//!
//! Most of the engine degrades instead of failing: an unreadable color is
//! "not dark", corrupt settings load as empty, a malformed time range is
//! treated as always open. The errors below surface only where a caller
//! explicitly asks for strictness (editing rules, saving, parsing a time).

use std::io;

/// Errors produced by settings editing, persistence and strict parsing.
#[derive(Debug, thiserror::Error)]
pub enum NocturneError {
    /// Reading or writing a storage backend failed.
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),

    /// Settings could not be encoded or decoded.
    #[error("settings serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A domain pattern was rejected before compilation.
    #[error("invalid domain pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A wildcard pattern did not compile to a regular expression.
    #[error("invalid domain pattern expression: {0}")]
    InvalidRegex(#[from] regex::Error),

    /// A clock time was not in `HH:MM` form.
    #[error("invalid clock time '{0}': expected HH:MM")]
    InvalidTime(String),
}

impl NocturneError {
    /// Create an invalid-pattern error.
    pub fn pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for nocturne operations.
pub type Result<T> = std::result::Result<T, NocturneError>;
