//! Session-scoped key-value slots holding the persisted record set.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use tempfile::NamedTempFile;

use crate::error::StorageError;

/// A synchronous string store scoped to one user session.
pub trait SessionStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-process storage. Clones share the same slots.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Arc<DashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).map(|entry| entry.value().clone()))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per slot inside a directory.
///
/// Writes go through a temporary file that replaces the slot in one step, so
/// a crash leaves the previous snapshot in place.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Storage under the platform data directory.
    pub fn open_default() -> Result<Self, StorageError> {
        default_storage_dir()
            .map(Self::new)
            .ok_or(StorageError::NoDirectory)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SessionStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        let mut file = NamedTempFile::new_in(&self.dir)?;
        file.write_all(value.as_bytes())?;
        file.flush()?;
        file.persist(&path).map_err(|err| StorageError::Persist {
            path,
            source: err.error,
        })?;
        Ok(())
    }
}

/// Platform data directory for persisted interview state.
pub fn default_storage_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("org", "interview", "interview")
        .map(|dirs| dirs.data_dir().join("sessions"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_clones_share_slots() {
        let storage = MemoryStorage::new();
        let other = storage.clone();
        storage.set_item("k", "v").unwrap();
        assert_eq!(other.get_item("k").unwrap().as_deref(), Some("v"));
        assert_eq!(other.get_item("missing").unwrap(), None);
    }

    #[test]
    fn file_storage_replaces_slot() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("nested"));
        assert_eq!(storage.get_item("slot").unwrap(), None);
        storage.set_item("slot", "first").unwrap();
        storage.set_item("slot", "second").unwrap();
        assert_eq!(storage.get_item("slot").unwrap().as_deref(), Some("second"));
        assert!(storage.path_for("slot").ends_with("nested/slot.json"));
    }
}
