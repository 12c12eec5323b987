//! Error taxonomy of the data-access layer.

use crate::resource::{Operation, ResourceKind};
use crate::validation::ValidationErrors;
use thiserror::Error;

/// Generic message for failures the view does not special-case
pub const GENERIC_FAILURE_MESSAGE: &str = "Unexpected error occurred.";

/// Errors surfaced by the HTTP client and the query layer
///
/// `Clone` so that a failed query can keep its error in the cache entry.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiError {
    /// Transport-level failure; no response was received
    #[error("Network failure: {0}")]
    Network(String),

    /// The server rejected the session token or none was sent
    ///
    /// The session has already been cleared and the view sent to the login
    /// route when the caller sees this.
    #[error("Authorization expired: {message}")]
    AuthExpired {
        /// Server-provided reason
        message: String,
    },

    /// Login was rejected
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Duplicate resource (409)
    #[error("Conflict: {message}")]
    Conflict {
        /// Server-provided reason
        message: String,
    },

    /// Resource or referenced resource missing (404)
    #[error("Not found: {message}")]
    NotFound {
        /// Server-provided reason
        message: String,
    },

    /// Client-side validation failed; no request was sent
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Any other error status
    #[error("API error (status {status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Server-provided reason
        message: String,
    },

    /// Response body did not have the expected shape
    #[error("Response parsing failed: {0}")]
    Decode(String),

    /// Durable session storage failed
    #[error("Session storage failed: {0}")]
    Session(String),
}

/// Coarse classification of an [`ApiError`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// [`ApiError::Network`]
    NetworkFailure,
    /// [`ApiError::AuthExpired`]
    AuthExpired,
    /// [`ApiError::InvalidCredentials`]
    InvalidCredentials,
    /// [`ApiError::Conflict`]
    Conflict,
    /// [`ApiError::NotFound`]
    NotFound,
    /// [`ApiError::Validation`]
    ValidationFailure,
    /// [`ApiError::Status`], [`ApiError::Decode`], [`ApiError::Session`]
    Other,
}

impl ApiError {
    /// Classify the error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) => ErrorKind::NetworkFailure,
            Self::AuthExpired { .. } => ErrorKind::AuthExpired,
            Self::InvalidCredentials => ErrorKind::InvalidCredentials,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Validation(_) => ErrorKind::ValidationFailure,
            Self::Status { .. } | Self::Decode(_) | Self::Session(_) => ErrorKind::Other,
        }
    }

    /// HTTP status that produced the error, if any
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Conflict { .. } => Some(409),
            Self::NotFound { .. } => Some(404),
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message the view shows for this error
    ///
    /// Conflict and not-found on create/update get resource-specific
    /// messages; a failed detail load gets the resource's load-failure
    /// message; everything else is generic.
    #[must_use]
    pub const fn user_message(&self, resource: ResourceKind, operation: Operation) -> &'static str {
        match (self, operation) {
            (Self::Conflict { .. }, Operation::Create | Operation::Update) => {
                resource.conflict_message()
            }
            (Self::NotFound { .. }, Operation::Create | Operation::Update) => {
                resource.missing_reference_message()
            }
            (Self::InvalidCredentials, _) => "Invalid email or password.",
            (_, Operation::Get) => resource.load_failed_message(),
            _ => GENERIC_FAILURE_MESSAGE,
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}
