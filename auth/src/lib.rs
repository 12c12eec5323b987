//! # Mealdesk Session
//!
//! Holds the bearer token of the signed-in administrator.
//!
//! The token lives in two places: an in-memory copy read synchronously by
//! every outgoing request, and a durable copy that survives restarts. The
//! [`SessionStore`] keeps both in step under a single lock.
//!
//! ## Example
//!
//! ```rust,no_run
//! use mealdesk_auth::{FileTokenStorage, SessionStore};
//! use std::sync::Arc;
//!
//! # fn example() -> Result<(), mealdesk_auth::SessionError> {
//! let storage = Arc::new(FileTokenStorage::new(".mealdesk/session.json"));
//! let session = SessionStore::load(storage)?;
//!
//! session.set_token("eyJhbGciOi...")?;
//! assert!(session.is_authenticated());
//!
//! session.clear_token()?;
//! assert_eq!(session.token(), None);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]

// Public modules
pub mod error;
pub mod session;
pub mod storage;

/// In-memory providers for tests
#[cfg(feature = "test-utils")]
pub mod mocks;

// Re-export main types for convenience
pub use error::{Result, SessionError};
pub use session::SessionStore;
pub use storage::{FileTokenStorage, TOKEN_STORAGE_KEY, TokenStorage};
