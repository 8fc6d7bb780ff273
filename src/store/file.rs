//! File-backed key-value storage for persisting habit collections.

use std::io;
use std::path::PathBuf;
use tokio::fs;

/// Keyed byte storage with whole-payload replace semantics.
pub trait KeyValueStore {
    /// Reads the payload stored under `key`.
    ///
    /// Returns `Ok(None)` if nothing is stored under the key.
    fn get(
        &self,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<Vec<u8>>, StorageError>>;

    /// Replaces the payload stored under `key`.
    fn set(
        &self,
        key: &str,
        bytes: &[u8],
    ) -> impl std::future::Future<Output = Result<(), StorageError>>;
}

/// Stores each key as a JSON file in a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Returns the full path for a storage key.
    pub fn path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.path(key);

        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::IoError(path, e)),
        }
    }

    async fn set(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        // Ensure data directory exists
        fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|e| StorageError::IoError(self.data_dir.clone(), e))?;

        let path = self.path(key);
        fs::write(&path, bytes)
            .await
            .map_err(|e| StorageError::IoError(path, e))
    }
}

/// Errors that can occur during storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error reading or writing a file.
    IoError(PathBuf, io::Error),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::IoError(path, e) => {
                write!(f, "I/O error for {}: {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::IoError(_, e) => Some(e),
        }
    }
}
