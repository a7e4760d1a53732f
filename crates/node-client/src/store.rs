// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Durable key/value storage for the node registry
//!
//! The registry persists its whole descriptor list as one JSON document under
//! a fixed key. [`FileNodeStore`] keeps one file per key in a directory;
//! [`MemoryNodeStore`] keeps everything in process and is what tests use.

use std::{
    collections::HashMap,
    fmt, fs, io,
    path::{Path, PathBuf},
};

use parking_lot::Mutex;
use thiserror::Error;
use tracing::debug;

/// Errors raised by a [`NodeStore`]
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum StoreError {
    /// Reading or writing the backing medium failed
    #[error("storage I/O failed for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
}

/// Key/value storage that survives process restarts
pub trait NodeStore: Send + Sync + fmt::Debug {
    /// Read the value stored under `key`, `None` when absent
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be read
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` under `key`, replacing any previous value
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written
    fn save(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove the value stored under `key`; absent keys are not an error
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written
    fn clear(&self, key: &str) -> Result<(), StoreError>;
}

/// Store keeping one `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileNodeStore {
    dir: PathBuf,
}

impl FileNodeStore {
    /// Create a store rooted at `dir`; the directory is created on first save
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the stored files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl NodeStore for FileNodeStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no stored value");
                Ok(None)
            }
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let io_error = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(io_error)?;

        // write then rename so a crash never leaves a half-written list
        let path = self.path_for(key);
        let staging = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&staging, value).map_err(io_error)?;
        fs::rename(&staging, &path).map_err(io_error)?;
        debug!(path = %path.display(), bytes = value.len(), "stored value");
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), StoreError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryNodeStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryNodeStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with one entry
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::new();
        store.entries.lock().insert(key.into(), value.into());
        store
    }

    /// Current value under `key`
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }
}

impl NodeStore for MemoryNodeStore {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get(key))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryNodeStore::new();
        assert!(store.load("nodes").unwrap().is_none());

        store.save("nodes", "[]").unwrap();
        assert_eq!(store.load("nodes").unwrap().as_deref(), Some("[]"));

        store.clear("nodes").unwrap();
        assert!(store.get("nodes").is_none());
    }

    #[test]
    fn file_store_creates_directory_and_clears() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileNodeStore::new(dir.path().join("nested"));

        assert!(store.load("nodes").unwrap().is_none());
        store.save("nodes", r#"[{"name":"a"}]"#).unwrap();
        assert!(store.dir().join("nodes.json").exists());
        assert_eq!(
            store.load("nodes").unwrap().as_deref(),
            Some(r#"[{"name":"a"}]"#)
        );

        store.clear("nodes").unwrap();
        store.clear("nodes").unwrap();
        assert!(store.load("nodes").unwrap().is_none());
    }
}
