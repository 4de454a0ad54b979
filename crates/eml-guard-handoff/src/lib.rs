#![warn(missing_docs)]
//! # eml-guard-handoff
//!
//! ## Purpose
//! Carries one pending artifact across a page navigation, where no in-memory
//! state of the source page survives.
//!
//! ## Responsibilities
//! - Define the tab-scoped key-value seam ([`SessionStorage`]).
//! - Provide an in-process store ([`MemorySessionStorage`]) and a
//!   directory-backed store ([`FileSessionStorage`]) that survives process
//!   exit.
//! - Expose the one-shot mailbox ([`CrossPageStore`]): `put` overwrites,
//!   `take` reads once and deletes.
//!
//! ## Data flow
//! Source page -> [`CrossPageStore::put`] -> storage key
//! [`PENDING_ARTIFACT_KEY`] -> navigation -> [`CrossPageStore::take`] on the
//! destination page.
//!
//! ## Ownership and lifetimes
//! Storage backends are shared through `Arc<dyn SessionStorage>` so both page
//! controllers of one tab observe the same record.
//!
//! ## Error model
//! Backend I/O failures return [`HandoffError::Storage`]; an unreadable record
//! returns [`HandoffError::CorruptState`] after it has been removed.
//!
//! ## Security and privacy notes
//! Records are deleted on first read so analysis is never re-triggered by a
//! later reload. Content is never logged.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use eml_guard_core::{PendingArtifact, content_fingerprint};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Well-known storage key holding the pending artifact.
pub const PENDING_ARTIFACT_KEY: &str = "fileToAnalyze";

/// Tab-scoped string key-value store.
pub trait SessionStorage: Send + Sync {
    /// Returns the value stored under `key`, if any.
    fn get_item(&self, key: &str) -> Result<Option<String>, HandoffError>;

    /// Stores `value` under `key`, replacing any prior value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), HandoffError>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), HandoffError>;
}

/// Process-local storage for a single tab.
#[derive(Debug, Default)]
pub struct MemorySessionStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemorySessionStorage {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, HandoffError> {
        let items = self.items.lock().map_err(|_| poisoned())?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), HandoffError> {
        let mut items = self.items.lock().map_err(|_| poisoned())?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), HandoffError> {
        let mut items = self.items.lock().map_err(|_| poisoned())?;
        items.remove(key);
        Ok(())
    }
}

fn poisoned() -> HandoffError {
    HandoffError::Storage("session storage lock poisoned".to_string())
}

/// Directory-backed storage scoped to one session id.
///
/// Layout: `<root>/<session_id>/<key>.json`. Writes go through a temporary
/// file and a rename so readers never observe a partial record.
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    dir: PathBuf,
}

impl FileSessionStorage {
    /// Opens (and creates if needed) the session directory.
    ///
    /// # Errors
    /// Returns [`HandoffError::InvalidSession`] for ids that are empty or
    /// contain characters other than ASCII alphanumerics, `-` and `_`.
    /// Returns [`HandoffError::Storage`] when the directory cannot be created.
    pub fn open(root: impl AsRef<Path>, session_id: &str) -> Result<Self, HandoffError> {
        validate_session_id(session_id)?;
        let dir = root.as_ref().join(session_id);
        fs::create_dir_all(&dir).map_err(|error| {
            HandoffError::Storage(format!(
                "unable to create session dir '{}': {error}",
                dir.display()
            ))
        })?;
        Ok(Self { dir })
    }

    /// Returns the session directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn item_path(&self, key: &str) -> Result<PathBuf, HandoffError> {
        validate_session_id(key)?;
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl SessionStorage for FileSessionStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, HandoffError> {
        let path = self.item_path(key)?;
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            // Non-UTF-8 bytes can only come from outside tampering.
            Err(error) if error.kind() == ErrorKind::InvalidData => {
                Err(HandoffError::CorruptState(error.to_string()))
            }
            Err(error) => Err(HandoffError::Storage(format!(
                "unable to read '{}': {error}",
                path.display()
            ))),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), HandoffError> {
        let path = self.item_path(key)?;
        let staging = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&staging, value).map_err(|error| {
            HandoffError::Storage(format!("unable to write '{}': {error}", staging.display()))
        })?;
        fs::rename(&staging, &path).map_err(|error| {
            HandoffError::Storage(format!("unable to replace '{}': {error}", path.display()))
        })
    }

    fn remove_item(&self, key: &str) -> Result<(), HandoffError> {
        let path = self.item_path(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(HandoffError::Storage(format!(
                "unable to remove '{}': {error}",
                path.display()
            ))),
        }
    }
}

/// Validates a session id (also used for storage keys on disk).
///
/// # Errors
/// Returns [`HandoffError::InvalidSession`] when `id` is empty or contains a
/// character outside `[A-Za-z0-9_-]`.
pub fn validate_session_id(id: &str) -> Result<(), HandoffError> {
    if id.is_empty() {
        return Err(HandoffError::InvalidSession("session id is empty".to_string()));
    }
    if !id
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
    {
        return Err(HandoffError::InvalidSession(format!(
            "'{id}' may only contain ASCII letters, digits, '-' and '_'"
        )));
    }
    Ok(())
}

/// One-shot mailbox holding at most one pending artifact.
#[derive(Clone)]
pub struct CrossPageStore {
    storage: Arc<dyn SessionStorage>,
}

impl CrossPageStore {
    /// Wraps a storage backend.
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self { storage }
    }

    /// Stores `artifact`, replacing any earlier pending one.
    ///
    /// # Errors
    /// Returns [`HandoffError::Encode`] when the record cannot be serialized
    /// and [`HandoffError::Storage`] on backend failure.
    pub fn put(&self, artifact: &PendingArtifact) -> Result<(), HandoffError> {
        let raw = artifact
            .to_json()
            .map_err(|error| HandoffError::Encode(error.to_string()))?;
        self.storage.set_item(PENDING_ARTIFACT_KEY, &raw)?;
        info!(
            stage = "handoff",
            action = "put",
            name = %artifact.name,
            size = artifact.size,
            "pending artifact stored"
        );
        Ok(())
    }

    /// Reads and deletes the pending artifact.
    ///
    /// # Returns
    /// - `Ok(Some(_))` for a well-formed record.
    /// - `Ok(None)` when nothing is pending.
    ///
    /// # Errors
    /// Returns [`HandoffError::CorruptState`] when the stored value is not a
    /// well-formed record. The key is removed either way.
    pub fn take(&self) -> Result<Option<PendingArtifact>, HandoffError> {
        let raw = match self.storage.get_item(PENDING_ARTIFACT_KEY) {
            Ok(raw) => raw,
            Err(HandoffError::CorruptState(detail)) => {
                self.storage.remove_item(PENDING_ARTIFACT_KEY)?;
                return Err(HandoffError::CorruptState(detail));
            }
            Err(error) => return Err(error),
        };

        let Some(raw) = raw else {
            debug!(stage = "handoff", action = "take", "nothing pending");
            return Ok(None);
        };

        self.storage.remove_item(PENDING_ARTIFACT_KEY)?;

        match PendingArtifact::from_json(&raw) {
            Ok(artifact) => {
                info!(
                    stage = "handoff",
                    action = "take",
                    name = %artifact.name,
                    size = artifact.size,
                    "pending artifact consumed"
                );
                Ok(Some(artifact))
            }
            Err(error) => {
                warn!(
                    stage = "handoff",
                    action = "take",
                    record_fingerprint = %content_fingerprint(raw.as_bytes()),
                    "discarding unreadable pending record: {error}"
                );
                Err(HandoffError::CorruptState(error.to_string()))
            }
        }
    }

    /// Removes any pending artifact. Idempotent.
    ///
    /// # Errors
    /// Returns [`HandoffError::Storage`] on backend failure.
    pub fn clear(&self) -> Result<(), HandoffError> {
        self.storage.remove_item(PENDING_ARTIFACT_KEY)?;
        debug!(stage = "handoff", action = "clear", "pending slot cleared");
        Ok(())
    }
}

/// Errors produced by the handoff layer.
#[derive(Debug, Error)]
pub enum HandoffError {
    /// Backend failed to read, write, or delete.
    #[error("session storage failure: {0}")]
    Storage(String),
    /// Record could not be serialized.
    #[error("pending artifact encode failure: {0}")]
    Encode(String),
    /// Stored value is not a well-formed pending artifact.
    #[error("corrupt pending artifact: {0}")]
    CorruptState(String),
    /// Session id or key is not usable as a storage scope.
    #[error("invalid session: {0}")]
    InvalidSession(String),
}
