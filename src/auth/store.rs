//! Session store
//!
//! Holds the current session in memory and optionally persists it to a
//! JSON file with atomic writes.

use super::types::Session;
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Shared, cloneable handle to the current session
#[derive(Debug, Clone)]
pub struct SessionStore {
    /// Path to the session file (empty = in-memory)
    path: PathBuf,
    /// Current session
    session: Arc<RwLock<Option<Session>>>,
}

impl SessionStore {
    /// Create an in-memory store (no file persistence)
    pub fn in_memory() -> Self {
        Self {
            path: PathBuf::new(),
            session: Arc::new(RwLock::new(None)),
        }
    }

    /// Create an in-memory store holding the given session
    pub fn with_session(session: Session) -> Self {
        Self {
            path: PathBuf::new(),
            session: Arc::new(RwLock::new(Some(session))),
        }
    }

    /// Create a store backed by a file, loading an existing session if present.
    ///
    /// An expired session on disk is ignored.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let session = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| Error::session(format!("Failed to read session file: {e}")))?;
            let session: Session = serde_json::from_str(&contents)
                .map_err(|e| Error::session(format!("Failed to parse session file: {e}")))?;
            if session.is_expired() {
                debug!("Ignoring expired session in {}", path.display());
                None
            } else {
                Some(session)
            }
        } else {
            None
        };

        Ok(Self {
            path,
            session: Arc::new(RwLock::new(session)),
        })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check if this store is in-memory only
    pub fn is_in_memory(&self) -> bool {
        self.path.as_os_str().is_empty()
    }

    /// Get a copy of the current, unexpired session
    pub async fn current(&self) -> Option<Session> {
        self.session
            .read()
            .await
            .as_ref()
            .filter(|s| !s.is_expired())
            .cloned()
    }

    /// Get the bearer token of the current session
    pub async fn token(&self) -> Option<String> {
        self.current().await.map(|s| s.token)
    }

    /// Get the current session or fail with `NotLoggedIn`
    pub async fn require(&self) -> Result<Session> {
        self.current().await.ok_or(Error::NotLoggedIn)
    }

    /// Replace the current session and persist it
    pub async fn set(&self, session: Session) -> Result<()> {
        {
            let mut current = self.session.write().await;
            *current = Some(session);
        }
        self.save().await
    }

    /// Clear the current session and remove the backing file
    pub async fn clear(&self) -> Result<()> {
        {
            let mut current = self.session.write().await;
            *current = None;
        }

        if !self.is_in_memory() && self.path.exists() {
            tokio::fs::remove_file(&self.path)
                .await
                .map_err(|e| Error::session(format!("Failed to remove session file: {e}")))?;
        }
        Ok(())
    }

    /// Save the current session to file
    pub async fn save(&self) -> Result<()> {
        if self.is_in_memory() {
            return Ok(());
        }

        let session = self.session.read().await;
        let Some(session) = session.as_ref() else {
            return Ok(());
        };

        let contents = serde_json::to_string_pretty(session)
            .map_err(|e| Error::session(format!("Failed to serialize session: {e}")))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::session(format!("Failed to write session file: {e}")))?;

        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| Error::session(format!("Failed to rename session file: {e}")))?;

        debug!("Saved session to {}", self.path.display());
        Ok(())
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::in_memory()
    }
}
