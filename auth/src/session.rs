//! Process-wide session token holder.

use crate::error::Result;
use crate::storage::TokenStorage;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

/// Current bearer token plus its durable copy.
///
/// Reads are synchronous and never touch storage. Writes update storage
/// first and memory second, both under the write lock: a reader sees
/// either the old token or the new one, and a failed durable write leaves
/// the in-memory value as it was.
pub struct SessionStore {
    token: RwLock<Option<String>>,
    storage: Arc<dyn TokenStorage>,
}

impl SessionStore {
    /// Restore the session from `storage`.
    ///
    /// # Errors
    ///
    /// Returns error if the durable copy cannot be read.
    pub fn load(storage: Arc<dyn TokenStorage>) -> Result<Self> {
        let token = storage.load()?;
        tracing::debug!(authenticated = token.is_some(), "Session restored");
        Ok(Self {
            token: RwLock::new(token),
            storage,
        })
    }

    /// Current token, if any.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Whether a token is held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Replace the token.
    ///
    /// # Errors
    ///
    /// Returns error if the durable copy cannot be written; the in-memory
    /// token is then unchanged.
    pub fn set_token(&self, token: impl Into<String>) -> Result<()> {
        let token = token.into();
        let mut guard = self.token.write().unwrap_or_else(PoisonError::into_inner);

        self.storage.save(&token)?;
        *guard = Some(token);
        drop(guard);

        tracing::debug!("Session token stored");
        Ok(())
    }

    /// Forget the token.
    ///
    /// Clearing an empty session is a no-op apart from the storage call.
    ///
    /// # Errors
    ///
    /// Returns error if the durable copy cannot be removed; the in-memory
    /// token is then unchanged.
    pub fn clear_token(&self) -> Result<()> {
        let mut guard = self.token.write().unwrap_or_else(PoisonError::into_inner);

        self.storage.remove()?;
        let had_token = guard.take().is_some();
        drop(guard);

        tracing::debug!(had_token, "Session token cleared");
        Ok(())
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;
    use crate::error::SessionError;
    use crate::mocks::MemoryTokenStorage;
    use crate::storage::FileTokenStorage;

    #[test]
    fn starts_from_the_durable_copy() {
        let storage = Arc::new(MemoryTokenStorage::with_token("abc"));
        let session = SessionStore::load(storage).unwrap();

        assert_eq!(session.token(), Some("abc".to_string()));
        assert!(session.is_authenticated());
    }

    #[test]
    fn set_and_clear_update_both_copies() {
        let storage = Arc::new(MemoryTokenStorage::new());
        let session = SessionStore::load(storage.clone()).unwrap();
        assert!(!session.is_authenticated());

        session.set_token("abc").unwrap();
        assert_eq!(session.token(), Some("abc".to_string()));
        assert_eq!(storage.stored(), Some("abc".to_string()));

        session.clear_token().unwrap();
        assert_eq!(session.token(), None);
        assert_eq!(storage.stored(), None);
    }

    #[test]
    fn failed_write_leaves_memory_unchanged() {
        let storage = Arc::new(MemoryTokenStorage::with_token("old"));
        let session = SessionStore::load(storage.clone()).unwrap();

        storage.set_fail_writes(true);
        assert!(matches!(session.set_token("new"), Err(SessionError::Io(_))));
        assert_eq!(session.token(), Some("old".to_string()));

        assert!(session.clear_token().is_err());
        assert_eq!(session.token(), Some("old".to_string()));
    }

    #[test]
    fn token_survives_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");

        let first = SessionStore::load(Arc::new(FileTokenStorage::new(&path))).unwrap();
        first.set_token("abc").unwrap();
        drop(first);

        let second = SessionStore::load(Arc::new(FileTokenStorage::new(&path))).unwrap();
        assert_eq!(second.token(), Some("abc".to_string()));
    }

    #[test]
    fn debug_output_hides_the_token() {
        let session = SessionStore::load(Arc::new(MemoryTokenStorage::with_token("secret"))).unwrap();
        let rendered = format!("{session:?}");

        assert!(rendered.contains("authenticated: true"));
        assert!(!rendered.contains("secret"));
    }
}
