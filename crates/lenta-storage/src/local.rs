//! Local filesystem storage with sharded directories.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lenta_core::StorageBackend;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::sharding::allocate_key;
use crate::traits::{Storage, StorageError, StorageResult};

#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    bucket_size: i64,
}

impl LocalStorage {
    /// Create the storage root if absent and return the backend.
    pub async fn new(base_path: impl Into<PathBuf>, bucket_size: i64) -> StorageResult<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::Config(format!(
                "failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;
        Ok(LocalStorage {
            base_path,
            bucket_size,
        })
    }

    /// Convert a storage key to a filesystem path, rejecting keys that could
    /// escape the storage root.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.contains("..") || storage_key.starts_with('/') {
            return Err(StorageError::InvalidKey(storage_key.to_string()));
        }
        Ok(self.base_path.join(storage_key))
    }

    async fn ensure_parent_dir(path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn store(&self, user_id: i64, data: Vec<u8>, extension: &str) -> StorageResult<String> {
        let key = allocate_key(user_id, self.bucket_size, extension)?;
        let path = self.key_to_path(&key)?;

        Self::ensure_parent_dir(&path).await?;

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("failed to create {}: {}", path.display(), e))
        })?;
        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("failed to write {}: {}", path.display(), e))
        })?;
        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("failed to sync {}: {}", path.display(), e))
        })?;

        tracing::debug!(user_id, key = %key, size = data.len(), "stored image locally");
        Ok(key)
    }

    async fn fetch(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(storage_key)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(storage_key.to_string()))
            }
            Err(e) => Err(StorageError::DownloadFailed(format!(
                "failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn storage() -> (TempDir, LocalStorage) {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path(), 1000).await.unwrap();
        (dir, storage)
    }

    #[tokio::test]
    async fn store_places_file_in_sharded_directory() {
        let (_dir, storage) = storage().await;
        let key = storage.store(1, b"pixels".to_vec(), "png").await.unwrap();
        assert!(key.starts_with("1-1000/1/"), "key: {}", key);
        assert!(key.ends_with(".png"));
    }

    #[tokio::test]
    async fn fetch_returns_stored_bytes() {
        let (_dir, storage) = storage().await;
        let key = storage.store(42, b"abc123".to_vec(), "jpeg").await.unwrap();
        assert_eq!(storage.fetch(&key).await.unwrap(), b"abc123");
    }

    #[tokio::test]
    async fn repeated_stores_for_one_user_coexist() {
        let (_dir, storage) = storage().await;
        let a = storage.store(7, b"one".to_vec(), "png").await.unwrap();
        let b = storage.store(7, b"two".to_vec(), "png").await.unwrap();
        assert_ne!(a, b);
        assert_eq!(storage.fetch(&a).await.unwrap(), b"one");
        assert_eq!(storage.fetch(&b).await.unwrap(), b"two");
    }

    #[tokio::test]
    async fn fetch_unknown_key_is_not_found() {
        let (_dir, storage) = storage().await;
        assert!(matches!(
            storage.fetch("1-1000/1/missing.png").await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn traversal_keys_are_rejected() {
        let (_dir, storage) = storage().await;
        assert!(matches!(
            storage.fetch("../outside.png").await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            storage.fetch("/etc/passwd").await,
            Err(StorageError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn store_rejects_invalid_user_id() {
        let (_dir, storage) = storage().await;
        assert!(matches!(
            storage.store(0, b"x".to_vec(), "png").await,
            Err(StorageError::InvalidUserId)
        ));
    }
}
