//! Client storage adapter.
//!
//! Persists the bearer token, the remembered login email and the CSRF cookie
//! to `~/.skilllink/storage.json`. Every mutation is written through
//! immediately, so state survives between runs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::{debug, warn};

/// Key holding the bearer token.
pub const AUTH_TOKEN_KEY: &str = "auth_token";
/// Older spelling of the token key, still read as a fallback.
pub const LEGACY_AUTH_TOKEN_KEY: &str = "authToken";
/// Key holding the email remembered by the login form.
pub const SAVED_EMAIL_KEY: &str = "savedEmail";
/// Key holding the last CSRF token seen from the backend.
pub const CSRF_TOKEN_KEY: &str = "csrftoken";

/// Storage persistence errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to write client storage: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode client storage: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persistent key/value store shared by the API client and controllers.
#[derive(Debug, Default)]
pub struct ClientStorage {
    /// Backing file; `None` keeps everything in memory.
    path: Option<PathBuf>,
    entries: Mutex<BTreeMap<String, String>>,
}

impl ClientStorage {
    /// Open storage backed by `path`. A missing or unreadable file starts empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = std::fs::read_to_string(&path)
            .ok()
            .and_then(|s| match serde_json::from_str(&s) {
                Ok(entries) => Some(entries),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Ignoring unreadable client storage");
                    None
                }
            })
            .unwrap_or_default();
        Self {
            path: Some(path),
            entries: Mutex::new(entries),
        }
    }

    /// Storage that is never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    pub fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.lock();
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    pub fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.lock();
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        std::fs::write(path, json)?;
        debug!(path = %path.display(), keys = entries.len(), "Client storage saved");
        Ok(())
    }

    /// Bearer token, preferring the current key over the legacy one.
    pub fn auth_token(&self) -> Option<String> {
        let entries = self.lock();
        entries
            .get(AUTH_TOKEN_KEY)
            .or_else(|| entries.get(LEGACY_AUTH_TOKEN_KEY))
            .filter(|t| !t.is_empty())
            .cloned()
    }

    pub fn set_auth_token(&self, token: &str) -> Result<(), StorageError> {
        let mut entries = self.lock();
        entries.insert(AUTH_TOKEN_KEY.to_string(), token.to_string());
        entries.remove(LEGACY_AUTH_TOKEN_KEY);
        self.persist(&entries)
    }

    /// Forget the bearer token under both spellings.
    pub fn clear_auth_token(&self) -> Result<(), StorageError> {
        let mut entries = self.lock();
        let had_current = entries.remove(AUTH_TOKEN_KEY).is_some();
        let had_legacy = entries.remove(LEGACY_AUTH_TOKEN_KEY).is_some();
        if had_current || had_legacy {
            self.persist(&entries)?;
        }
        Ok(())
    }

    pub fn saved_email(&self) -> Option<String> {
        self.get(SAVED_EMAIL_KEY).filter(|e| !e.is_empty())
    }

    /// Remember `email` for the next login, or forget any remembered one.
    pub fn remember_email(&self, email: Option<&str>) -> Result<(), StorageError> {
        match email {
            Some(email) => self.set(SAVED_EMAIL_KEY, email),
            None => self.remove(SAVED_EMAIL_KEY),
        }
    }

    pub fn csrf_token(&self) -> Option<String> {
        self.get(CSRF_TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn set_csrf_token(&self, token: &str) -> Result<(), StorageError> {
        if self.csrf_token().as_deref() == Some(token) {
            return Ok(());
        }
        self.set(CSRF_TOKEN_KEY, token)
    }
}
