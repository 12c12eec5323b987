//! Response envelope.
//!
//! Every entity-bearing response (list, get, create, update, login) is
//! wrapped as `{ "message": ..., "data": ... }`. A bare payload is rejected
//! rather than guessed at.

use serde::{Deserialize, Serialize};

/// `{ message, data }` wrapper
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Human-readable server message
    #[serde(default)]
    pub message: Option<String>,
    /// Payload
    pub data: T,
}

impl<T> Envelope<T> {
    /// Wrap a payload
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: Some(message.into()),
            data,
        }
    }

    /// Drop the envelope
    pub fn into_data(self) -> T {
        self.data
    }
}
