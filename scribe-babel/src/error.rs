//! Error types for registry operations
//!
//! Parsers themselves never fail: malformed input degrades to escaped output plus
//! validation findings. The errors here describe lookup misses and configuration
//! defects found while building a registry.

use std::fmt;

/// Errors that can occur while building or querying a [`crate::FormatRegistry`]
#[derive(Debug, Clone, PartialEq)]
pub enum FormatError {
    /// Format not found in registry
    FormatNotFound(String),
    /// A descriptor with this id is already registered
    DuplicateFormat(String),
    /// A content-sniffing pattern failed to compile
    InvalidPattern {
        format: String,
        pattern: String,
        message: String,
    },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::FormatNotFound(id) => write!(f, "Format '{id}' not found"),
            FormatError::DuplicateFormat(id) => {
                write!(f, "Format '{id}' is already registered")
            }
            FormatError::InvalidPattern {
                format,
                pattern,
                message,
            } => write!(
                f,
                "Invalid detection pattern '{pattern}' for format '{format}': {message}"
            ),
        }
    }
}

impl std::error::Error for FormatError {}
