use crate::keys::validate_key;
use crate::traits::{StorageError, StorageResult, VideoStore};
use crate::StorageBackend;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::fs;

/// Local filesystem storage implementation
///
/// Objects are plain files under `base_path`, served statically from `base_url`.
/// There is nothing to sign, so retrieval URLs are static and do not expire.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
    bucket: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "./assets")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:8080/assets")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        let bucket = base_path.to_string_lossy().into_owned();
        Ok(LocalStorage {
            base_path,
            base_url,
            bucket,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert storage key to filesystem path with security validation
    ///
    /// Rejects keys whose path would escape the base storage directory.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if !validate_key(storage_key) {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        let path = self.base_path.join(storage_key);
        if path.strip_prefix(&self.base_path).is_err() {
            return Err(StorageError::InvalidKey(
                "Storage key resolves outside storage directory".to_string(),
            ));
        }

        Ok(path)
    }

    /// Generate public URL for file
    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }
}

#[async_trait]
impl VideoStore for LocalStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }

    async fn put_file(&self, key: &str, path: &Path, content_type: &str) -> StorageResult<u64> {
        let dest = self.key_to_path(key)?;
        let start = Instant::now();

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Copy beside the destination, then rename, so readers never see a partial file.
        let mut partial = dest.clone().into_os_string();
        partial.push(".partial");
        let partial = PathBuf::from(partial);

        let size = match fs::copy(path, &partial).await {
            Ok(size) => size,
            Err(e) => {
                let _ = fs::remove_file(&partial).await;
                tracing::error!(
                    error = %e,
                    key = %key,
                    source_path = %path.display(),
                    "Local upload failed"
                );
                return Err(StorageError::UploadFailed(e.to_string()));
            }
        };
        if let Err(e) = fs::rename(&partial, &dest).await {
            let _ = fs::remove_file(&partial).await;
            return Err(StorageError::UploadFailed(e.to_string()));
        }

        tracing::info!(
            key = %key,
            path = %dest.display(),
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local upload successful"
        );

        Ok(size)
    }

    async fn presigned_get_url(
        &self,
        bucket: &str,
        key: &str,
        _expires_in: Duration,
    ) -> StorageResult<String> {
        if bucket != self.bucket {
            return Err(StorageError::SigningFailed(format!(
                "object lives outside local storage root '{}'",
                bucket
            )));
        }
        self.key_to_path(key)?;
        Ok(self.generate_url(key))
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(key)?;
        Ok(fs::try_exists(&path).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn storage_in(dir: &Path) -> LocalStorage {
        LocalStorage::new(dir.join("assets"), "http://localhost:8080/assets".to_string())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_put_file_copies_under_key() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;
        let source = dir.path().join("processed.mp4");
        std::fs::write(&source, b"fast-start bytes").unwrap();

        let size = storage
            .put_file("landscape/abc.mp4", &source, "video/mp4")
            .await
            .unwrap();

        assert_eq!(size, 16);
        let stored = std::fs::read(dir.path().join("assets/landscape/abc.mp4")).unwrap();
        assert_eq!(stored, b"fast-start bytes");
        assert!(source.exists());
        assert!(storage.exists("landscape/abc.mp4").await.unwrap());
        assert!(!storage.exists("landscape/missing.mp4").await.unwrap());
    }

    #[tokio::test]
    async fn test_put_file_missing_source_leaves_nothing() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;

        let result = storage
            .put_file("portrait/abc.mp4", &dir.path().join("nope.mp4"), "video/mp4")
            .await;

        assert!(matches!(result, Err(StorageError::UploadFailed(_))));
        assert!(!storage.exists("portrait/abc.mp4").await.unwrap());
        assert!(!dir.path().join("assets/portrait/abc.mp4.partial").exists());
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;
        let source = dir.path().join("processed.mp4");
        std::fs::write(&source, b"x").unwrap();

        for key in ["../escape.mp4", "/etc/passwd", "landscape/../../x.mp4"] {
            assert!(matches!(
                storage.put_file(key, &source, "video/mp4").await,
                Err(StorageError::InvalidKey(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_presigned_url_is_static() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;
        let bucket = storage.bucket().to_string();

        let url = storage
            .presigned_get_url(&bucket, "landscape/abc.mp4", Duration::from_secs(900))
            .await
            .unwrap();
        assert_eq!(url, "http://localhost:8080/assets/landscape/abc.mp4");

        let result = storage
            .presigned_get_url("other-root", "landscape/abc.mp4", Duration::from_secs(900))
            .await;
        assert!(matches!(result, Err(StorageError::SigningFailed(_))));
    }
}
