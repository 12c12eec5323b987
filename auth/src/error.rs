//! Error types for session storage.

use mealdesk_core::ApiError;
use thiserror::Error;

/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Failures of the durable token copy.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Reading or writing the backing store failed.
    #[error("Session storage I/O failed: {0}")]
    Io(String),

    /// The backing document exists but is not a key/value object.
    #[error("Session storage is corrupt: {0}")]
    Corrupt(String),
}

impl From<std::io::Error> for SessionError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<SessionError> for ApiError {
    fn from(error: SessionError) -> Self {
        Self::Session(error.to_string())
    }
}
