//! Storage abstraction trait
//!
//! This module defines the VideoStore trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Signing failed: {0}")]
    SigningFailed(String),

    #[error("Malformed storage reference: {0}")]
    MalformedReference(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// Objects are addressed by key within the single bucket a store is configured for.
/// Writes are whole-object: a failed upload leaves nothing visible under the key.
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Bucket (or root directory, for the local backend) objects are written into
    fn bucket(&self) -> &str;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;

    /// Stream the file at `path` to `key`, tagging it with `content_type`.
    ///
    /// The file is read in chunks; it is never loaded into memory whole.
    /// Returns the number of bytes written.
    async fn put_file(&self, key: &str, path: &Path, content_type: &str) -> StorageResult<u64>;

    /// Generate a time-limited GET URL for `key` in `bucket`
    async fn presigned_get_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Check if an object exists
    async fn exists(&self, key: &str) -> StorageResult<bool>;
}
