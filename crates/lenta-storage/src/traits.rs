//! Storage abstraction trait.

use async_trait::async_trait;
use lenta_core::StorageBackend;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid user id")]
    InvalidUserId,

    #[error("upload failed: {0}")]
    UploadFailed(String),

    #[error("download failed: {0}")]
    DownloadFailed(String),

    #[error("image not found: {0}")]
    NotFound(String),

    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Image-blob storage.
///
/// `store` allocates a fresh sharded key for the user and persists the bytes
/// at it; the returned key uniquely identifies the blob and is immutable once
/// allocated. `fetch` reads a blob back by key.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Persist image bytes for a user; returns the allocated storage key.
    async fn store(&self, user_id: i64, data: Vec<u8>, extension: &str) -> StorageResult<String>;

    /// Read image bytes back by storage key.
    async fn fetch(&self, path: &str) -> StorageResult<Vec<u8>>;

    /// Which backend this is (for logging and startup diagnostics).
    fn backend_type(&self) -> StorageBackend;
}
