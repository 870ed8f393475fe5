//! Error types for profile documents

use thiserror::Error;

/// Result type alias using CoreError
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while building or modifying profile documents
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Documents and patches must be JSON objects
    #[error("Expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// Empty path or empty path segment
    #[error("Invalid field path: '{0}'")]
    InvalidFieldPath(String),

    /// Stored timestamp could not be parsed
    #[error("Invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::SerializationError(err.to_string())
    }
}
