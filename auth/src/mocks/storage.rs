//! In-memory token storage.

use crate::error::{Result, SessionError};
use crate::storage::TokenStorage;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Token storage kept in memory.
///
/// Clones share state, so a test can keep a handle after passing one to a
/// [`SessionStore`](crate::SessionStore). Writes can be made to fail to
/// exercise error paths.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStorage {
    token: Arc<Mutex<Option<String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryTokenStorage {
    /// Empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage already holding `token`.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        let storage = Self::new();
        *storage.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.into());
        storage
    }

    /// Make subsequent `save`/`remove` calls fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Token currently held (for assertions).
    #[must_use]
    pub fn stored(&self) -> Option<String> {
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SessionError::Io("storage is read-only".to_string()));
        }
        Ok(())
    }
}

impl TokenStorage for MemoryTokenStorage {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.stored())
    }

    fn save(&self, token: &str) -> Result<()> {
        self.check_writable()?;
        *self.token.lock().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn remove(&self) -> Result<()> {
        self.check_writable()?;
        self.token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        Ok(())
    }
}
