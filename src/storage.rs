use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const STORE_FILE: &str = "local_storage.json";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("could not determine a local data directory")]
    NoDataDir,
    #[error("storage I/O failed for {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("storage file {path} is not valid JSON: {source}")]
    Corrupt { path: PathBuf, source: serde_json::Error },
}

#[derive(Serialize, Deserialize, Default)]
struct StoreFile {
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

/// Where whispr keeps its files: the override if given, otherwise
/// `<local data dir>/whispr`. The directory is created if missing.
pub fn data_dir(override_dir: Option<&Path>) -> Result<PathBuf, StorageError> {
    let dir = match override_dir {
        Some(dir) => dir.to_path_buf(),
        None => dirs::data_local_dir()
            .ok_or(StorageError::NoDataDir)?
            .join("whispr"),
    };

    if !dir.exists() {
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            path: dir.clone(),
            source,
        })?;
    }

    Ok(dir)
}

/// A small durable string map. Every write is flushed to disk immediately.
#[derive(Debug)]
pub struct LocalStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl LocalStore {
    /// Open the store in `dir`. A missing file is an empty store.
    pub fn open(dir: &Path) -> Result<Self, StorageError> {
        let path = dir.join(STORE_FILE);
        if !path.exists() {
            debug!("No store at {}, starting empty", path.display());
            return Ok(LocalStore {
                path,
                entries: BTreeMap::new(),
            });
        }

        let io_err = |source| StorageError::Io {
            path: path.clone(),
            source,
        };
        let mut contents = String::new();
        File::open(&path)
            .and_then(|mut file| file.read_to_string(&mut contents))
            .map_err(io_err)?;

        let file: StoreFile = serde_json::from_str(&contents).map_err(|source| StorageError::Corrupt {
            path: path.clone(),
            source,
        })?;
        info!("Loaded {} stored keys from {}", file.entries.len(), path.display());

        Ok(LocalStore {
            path,
            entries: file.entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    /// Drop `key` entirely. Removing an absent key still succeeds.
    pub fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&self) -> Result<(), StorageError> {
        let file = StoreFile {
            entries: self.entries.clone(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|source| StorageError::Corrupt {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!("Flushed {} keys to {}", self.entries.len(), self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();

        let mut store = LocalStore::open(dir.path()).unwrap();
        store.set("greeting", "hello").unwrap();
        drop(store);

        let store = LocalStore::open(dir.path()).unwrap();
        assert_eq!(store.get("greeting"), Some("hello"));
    }

    #[test]
    fn test_remove_deletes_key_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LocalStore::open(dir.path()).unwrap();
        store.set("a", "1").unwrap();
        store.set("b", "2").unwrap();

        store.remove("a").unwrap();
        store.remove("never-set").unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(!raw.contains("\"a\""));
        assert!(raw.contains("\"b\""));
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(STORE_FILE), "not json").unwrap();

        assert!(matches!(
            LocalStore::open(dir.path()),
            Err(StorageError::Corrupt { .. })
        ));
    }

    #[test]
    fn test_data_dir_creates_override() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");

        assert_eq!(data_dir(Some(&nested)).unwrap(), nested);
        assert!(nested.is_dir());
    }
}
