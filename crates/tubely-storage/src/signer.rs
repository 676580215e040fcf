//! Signed retrieval URLs for persisted references.

use std::sync::Arc;
use std::time::Duration;

use crate::reference::StorageReference;
use crate::traits::{StorageResult, VideoStore};

/// Issues time-limited URLs for stored objects.
///
/// Nothing is cached: every call signs afresh, so two calls for the same object yield
/// different but equally valid URLs.
#[derive(Clone)]
pub struct UrlSigner {
    store: Arc<dyn VideoStore>,
    ttl: Duration,
}

impl UrlSigner {
    pub fn new(store: Arc<dyn VideoStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn sign(&self, reference: &StorageReference) -> StorageResult<String> {
        self.store
            .presigned_get_url(&reference.bucket, &reference.key, self.ttl)
            .await
    }

    /// Parse a persisted `"bucket,key"` string and sign it.
    pub async fn sign_stored(&self, raw: &str) -> StorageResult<String> {
        let reference = StorageReference::parse(raw)?;
        self.sign(&reference).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::StorageError;
    use crate::StorageBackend;
    use async_trait::async_trait;
    use std::path::Path;

    struct EchoStore;

    #[async_trait]
    impl VideoStore for EchoStore {
        fn bucket(&self) -> &str {
            "bucket-x"
        }

        fn backend_type(&self) -> StorageBackend {
            StorageBackend::S3
        }

        async fn put_file(&self, _key: &str, _path: &Path, _ct: &str) -> StorageResult<u64> {
            Ok(0)
        }

        async fn presigned_get_url(
            &self,
            bucket: &str,
            key: &str,
            expires_in: Duration,
        ) -> StorageResult<String> {
            Ok(format!(
                "https://{}.example.com/{}?expires={}",
                bucket,
                key,
                expires_in.as_secs()
            ))
        }

        async fn exists(&self, _key: &str) -> StorageResult<bool> {
            Ok(true)
        }
    }

    #[tokio::test]
    async fn test_sign_parsed_reference() {
        let signer = UrlSigner::new(Arc::new(EchoStore), Duration::from_secs(900));
        let url = signer.sign_stored("bucket-x,key-y").await.unwrap();
        assert!(url.contains("bucket-x"));
        assert!(url.contains("key-y"));
        assert!(url.contains("expires=900"));
    }

    #[tokio::test]
    async fn test_sign_malformed_reference() {
        let signer = UrlSigner::new(Arc::new(EchoStore), Duration::from_secs(900));
        for raw in ["onlyonepart", " , key"] {
            assert!(matches!(
                signer.sign_stored(raw).await,
                Err(StorageError::MalformedReference(_))
            ));
        }
    }
}
