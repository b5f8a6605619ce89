use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::domain::errors::{StorageError, StorageResult};
use crate::domain::services::KeyValueStore;

/// Key-value store keeping one file per key inside a directory.
///
/// Handles are stateless, so several of them can point at the same
/// directory and observe each other's writes. A missing file reads as an
/// absent key.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Read {
                key: key.to_string(),
                path,
                source,
            }),
        }
    }

    fn set(&mut self, key: &str, value: String) -> StorageResult<()> {
        let path = self.path_for(key);
        fs::write(&path, value).map_err(|source| StorageError::Write {
            key: key.to_string(),
            path,
            source,
        })
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StorageError::Remove {
                key: key.to_string(),
                path,
                source,
            }),
        }
    }
}

/// Process-local store used when no writable directory is available.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> StorageResult<()> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}
