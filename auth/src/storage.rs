//! Durable token storage.

use crate::error::{Result, SessionError};
use serde_json::{Map, Value};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Key under which the token is persisted
pub const TOKEN_STORAGE_KEY: &str = "Token";

/// Durable backing for the session token.
///
/// Implementations are synchronous: the session store calls them while
/// holding its write lock so that memory and storage change together.
pub trait TokenStorage: Send + Sync {
    /// Read the persisted token, if any.
    ///
    /// # Errors
    ///
    /// Returns error if the backing store cannot be read.
    fn load(&self) -> Result<Option<String>>;

    /// Persist `token`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns error if the backing store cannot be written.
    fn save(&self, token: &str) -> Result<()>;

    /// Forget the persisted token.
    ///
    /// # Errors
    ///
    /// Returns error if the backing store cannot be written.
    fn remove(&self) -> Result<()>;
}

/// File-backed key/value document, like browser local storage.
///
/// The file holds a JSON object; the token is kept under
/// [`TOKEN_STORAGE_KEY`] and other keys are preserved. Writes go to a
/// sibling temporary file that is then renamed over the original.
#[derive(Debug, Clone)]
pub struct FileTokenStorage {
    path: PathBuf,
}

impl FileTokenStorage {
    /// Storage at `path`; the file is created on first save.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the document
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Map<String, Value>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(SessionError::Corrupt(format!(
                "expected a JSON object, found {other}"
            ))),
            Err(e) => Err(SessionError::Corrupt(e.to_string())),
        }
    }

    fn write_document(&self, document: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let serialized = serde_json::to_string_pretty(document)
            .map_err(|e| SessionError::Corrupt(e.to_string()))?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serialized)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl TokenStorage for FileTokenStorage {
    fn load(&self) -> Result<Option<String>> {
        let document = self.read_document()?;
        Ok(document
            .get(TOKEN_STORAGE_KEY)
            .and_then(Value::as_str)
            .map(str::to_string))
    }

    fn save(&self, token: &str) -> Result<()> {
        let mut document = self.read_document()?;
        document.insert(TOKEN_STORAGE_KEY.to_string(), Value::String(token.to_string()));
        self.write_document(&document)
    }

    fn remove(&self) -> Result<()> {
        let mut document = self.read_document()?;
        if document.remove(TOKEN_STORAGE_KEY).is_none() {
            return Ok(());
        }
        self.write_document(&document)
    }
}
