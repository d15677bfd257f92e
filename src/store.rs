//! Persistent storage for the serialized task list.
//!
//! The list is kept as one JSON document under the fixed key [`STORAGE_KEY`].

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::StoreError;

/// Name the task list is stored under.
pub const STORAGE_KEY: &str = "todoListData";

/// Key-value backing for the serialized task list.
pub trait Store {
    /// Returns the stored document, or `None` when nothing has been saved yet.
    fn load(&self) -> Result<Option<String>, StoreError>;

    /// Replaces the stored document.
    fn save(&mut self, data: &str) -> Result<(), StoreError>;
}

/// Stores the list as `<dir>/todoListData.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(format!("{STORAGE_KEY}.json")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Store for FileStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Writes through a temp file in the same directory and renames it into
    /// place, so a crash never leaves a half-written list behind.
    fn save(&mut self, data: &str) -> Result<(), StoreError> {
        let write_err = |source: std::io::Error| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        let dir = self
            .path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        fs::create_dir_all(dir).map_err(write_err)?;

        let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
        temp.write_all(data.as_bytes()).map_err(write_err)?;
        temp.flush().map_err(write_err)?;
        temp.persist(&self.path).map_err(|err| write_err(err.error))?;
        Ok(())
    }
}

/// In-process store; nothing outlives the value.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: impl Into<String>) -> Self {
        Self {
            data: Some(data.into()),
        }
    }

    pub fn data(&self) -> Option<&str> {
        self.data.as_deref()
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.data.clone())
    }

    fn save(&mut self, data: &str) -> Result<(), StoreError> {
        self.data = Some(data.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_reports_missing_file_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::in_dir(dir.path());
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn file_store_round_trips_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::in_dir(dir.path().join("nested"));

        store.save("[1]").unwrap();
        store.save("[2]").unwrap();

        assert_eq!(store.load().unwrap().as_deref(), Some("[2]"));
        assert_eq!(
            store.path().file_name().and_then(|name| name.to_str()),
            Some("todoListData.json")
        );
    }

    #[test]
    fn memory_store_keeps_last_save() {
        let mut store = MemoryStore::new();
        assert_eq!(store.load().unwrap(), None);
        store.save("x").unwrap();
        assert_eq!(store.data(), Some("x"));
    }
}
