//! Local staging files.
//!
//! A staging file holds a byte-for-byte copy of a fetched source object for
//! the duration of one record's processing, at the record's relative key
//! below a configured root directory.

use std::path::{Component, Path, PathBuf};

use bytes::Bytes;
use tokio::fs;

use crate::error::StorageError;
use crate::{Error, Result};

/// Staging directory owned by the sync worker
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    /// Create a staging area rooted at the given directory
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Resolve a record key to its staging path.
    ///
    /// Keys are relative paths; absolute keys and parent-directory
    /// components are rejected so a record can never escape the root.
    pub fn path_for(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative.components().any(|component| {
            matches!(
                component,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if key.is_empty() || escapes {
            return Err(Error::Storage(StorageError::InvalidPath(key.to_string())));
        }
        Ok(self.root.join(relative))
    }

    /// Stage a copy of an object, creating intermediate directories
    pub async fn write(&self, key: &str, data: &[u8]) -> Result<PathBuf> {
        let path = self.path_for(key)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::Backend(format!("Failed to create directories: {}", e))
            })?;
        }

        fs::write(&path, data).await.map_err(|e| {
            StorageError::Backend(format!("Failed to write {}: {}", path.display(), e))
        })?;

        Ok(path)
    }

    /// Read a staged copy back
    pub async fn read(&self, key: &str) -> Result<Bytes> {
        let path = self.path_for(key)?;

        let data = fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(key.to_string())
            } else {
                StorageError::Backend(format!("Failed to read {}: {}", path.display(), e))
            }
        })?;

        Ok(Bytes::from(data))
    }

    /// Remove a staged copy
    pub async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;

        fs::remove_file(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(key.to_string())
            } else {
                StorageError::Backend(format!("Failed to delete {}: {}", path.display(), e))
            }
        })?;

        Ok(())
    }

    /// Whether a staged copy exists for the key
    pub async fn contains(&self, key: &str) -> bool {
        match self.path_for(key) {
            Ok(path) => fs::try_exists(&path).await.unwrap_or(false),
            Err(_) => false,
        }
    }
}
