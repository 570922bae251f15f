//! Durable key/value storage with JSON values.
//!
//! Every collection the platform owns lives under its own key and is
//! rewritten in full whenever it changes. There is no cross-key transaction:
//! a command that touches two collections issues two writes, and a crash
//! between them leaves the second collection at its previous value.
//!
//! # Reads never fail
//!
//! [`Store::load_or_else`] returns the caller's named default when a key is
//! absent **or** when its value does not parse as the expected type. A
//! corrupt entry is logged and otherwise ignored; it is overwritten the next
//! time that collection is saved. This mirrors how browser local storage
//! behaves for the original site: a cleared or hand-edited entry resets to the
//! seed data instead of breaking the page.
//!
//! # Backends
//!
//! - [`MemoryBackend`]: a map, for tests and embedding.
//! - [`FileBackend`]: one `<key>.json` file per key in a directory. Writes go
//!   to a sibling temp file and are renamed into place, so a reader never sees
//!   a half-written value.

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage key of the stories collection.
pub const STORIES_KEY: &str = "after_stories";
/// Storage key of the categories collection.
pub const CATEGORIES_KEY: &str = "after_categories";
/// Storage key of the submission queue.
pub const SUBMISSIONS_KEY: &str = "after_submissions";
/// Storage key of the editorial accounts.
pub const ACCOUNTS_KEY: &str = "after_admin_users";
/// Storage key of the branding singleton.
pub const BRANDING_KEY: &str = "after_branding";
/// Storage key of the returning-visitor marker.
pub const VISITED_KEY: &str = "after_visited";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// Raw string storage addressed by key.
pub trait KeyValueBackend {
    /// The stored value, or `None` if the key has never been written.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value under `key`.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value under `key`, bypassing JSON decoding.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Directory-backed storage: one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    /// Open (and create if needed) the storage directory.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing `key`. Keys are restricted to a filename-safe alphabet.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{key}.json")))
    }
}

impl KeyValueBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key)?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Typed JSON access on top of a [`KeyValueBackend`].
#[derive(Debug, Clone, Default)]
pub struct Store<B> {
    backend: B,
}

impl<B: KeyValueBackend> Store<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Decode the value under `key`. Returns `None` if the key is absent,
    /// unreadable, or does not parse as `T`.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "storage read failed, using default");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "stored value is corrupt, using default");
                None
            }
        }
    }

    /// Decode the value under `key`, falling back to `default()`.
    pub fn load_or_else<T: DeserializeOwned>(&self, key: &str, default: impl FnOnce() -> T) -> T {
        self.load(key).unwrap_or_else(default)
    }

    /// Encode `value` and replace whatever is stored under `key`.
    pub fn save<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string(value)?;
        self.backend.set(key, &json)
    }

    /// Whether anything has been written under `key`.
    pub fn contains(&self, key: &str) -> bool {
        matches!(self.backend.get(key), Ok(Some(_)))
    }

    pub fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.backend.remove(key)
    }
}
