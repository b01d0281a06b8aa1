//! Common error types for Tascboard.

use thiserror::Error;

/// Top-level error type for Tascboard operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Submitted values were rejected by validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Remote endpoint could not be reached.
    #[error("Network error: {0}")]
    Network(String),

    /// Caller lacks the capability for the operation.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Conflicting concurrent modification.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether the failure is likely to go away on its own.
    ///
    /// Saves are never retried; this only picks the log severity.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Network(_) | Error::Io(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(Error::Network("timeout".to_string()).is_transient());
        assert!(Error::Io(std::io::Error::other("reset")).is_transient());
        assert!(!Error::Validation("name required".to_string()).is_transient());
        assert!(!Error::Unauthorized("viewer".to_string()).is_transient());
    }

    #[test]
    fn test_json_error_maps_to_serialization() {
        let err: Error = serde_json::from_str::<u32>("not json").unwrap_err().into();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
