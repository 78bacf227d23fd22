//! ``src/session/token_store.rs``
//! ============================================================================
//! # Token Store: the single persisted bearer credential
//!
//! The store is handed to the controller as a [`TokenProvider`] capability so
//! tests can swap in [`MemoryTokenStore`]. No shape or expiry validation
//! happens here; an expired token surfaces as a 401 from the server.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

use crate::error::AppError;

/// Capability to read, replace and forget the session token.
pub trait TokenProvider: Send + Sync {
    /// Current token, if any. Never has side effects.
    fn get(&self) -> Option<String>;

    /// Persist `token`, overwriting any prior value.
    fn set(&self, token: String) -> Result<(), AppError>;

    /// Forget the token. The in-memory value is gone even when this errors.
    fn clear(&self) -> Result<(), AppError>;

    fn is_present(&self) -> bool {
        self.get().is_some()
    }
}

/// On-disk shape: one string under a fixed key.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedSession {
    #[serde(rename = "authToken")]
    auth_token: String,
}

/// Token persisted as JSON at a fixed path and cached in memory.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    cached: RwLock<Option<String>>,
}

impl FileTokenStore {
    /// Opens the store, reading any token already on disk.
    ///
    /// An unreadable or corrupt file is treated as "no token".
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let cached = Self::read_persisted(&path);
        debug!(
            path = %path.display(),
            present = cached.is_some(),
            "Opened session token store"
        );
        Self {
            path,
            cached: RwLock::new(cached),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_persisted(path: &Path) -> Option<String> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Session file unreadable");
                return None;
            }
        };

        match serde_json::from_str::<PersistedSession>(&text) {
            Ok(session) if !session.auth_token.is_empty() => Some(session.auth_token),
            Ok(_) => None,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Session file corrupt, ignoring");
                None
            }
        }
    }
}

impl TokenProvider for FileTokenStore {
    fn get(&self) -> Option<String> {
        self.cached.read().clone()
    }

    fn set(&self, token: String) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::token_store(&self.path, e.to_string()))?;
        }

        let body = serde_json::to_string(&PersistedSession {
            auth_token: token.clone(),
        })?;
        fs::write(&self.path, body).map_err(|e| AppError::token_store(&self.path, e.to_string()))?;

        *self.cached.write() = Some(token);
        info!(path = %self.path.display(), "Session token stored");
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        *self.cached.write() = None;

        match fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "Session token cleared");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::token_store(&self.path, e.to_string())),
        }
    }
}

/// Process-local token, used by tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl TokenProvider for MemoryTokenStore {
    fn get(&self) -> Option<String> {
        self.token.read().clone()
    }

    fn set(&self, token: String) -> Result<(), AppError> {
        *self.token.write() = Some(token);
        Ok(())
    }

    fn clear(&self) -> Result<(), AppError> {
        *self.token.write() = None;
        Ok(())
    }
}
