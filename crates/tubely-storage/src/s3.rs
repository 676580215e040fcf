use crate::keys::validate_key;
use crate::traits::{StorageError, StorageResult, VideoStore};
use crate::StorageBackend;
use async_trait::async_trait;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path as ObjectPath;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, Attributes, ObjectStore, ObjectStoreExt, Result as ObjectResult, WriteMultipart,
};
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::io::AsyncReadExt;

/// Size of each read from the local file while streaming an upload.
const READ_CHUNK_BYTES: usize = 1024 * 1024;

/// Parts allowed in flight before the uploader waits for S3 to catch up.
const MAX_CONCURRENT_PARTS: usize = 8;

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    region: String,
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    /// * `credentials` - Optional static access key pair; otherwise the standard AWS
    ///   environment variables and instance metadata are used
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
        credentials: Option<(String, String)>,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some((access_key_id, secret_access_key)) = credentials {
            builder = builder
                .with_access_key_id(access_key_id)
                .with_secret_access_key(secret_access_key);
        }

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage {
            store,
            bucket,
            region,
        })
    }

    async fn stream_file(
        &self,
        location: &ObjectPath,
        path: &Path,
        content_type: &str,
    ) -> StorageResult<u64> {
        let mut file = tokio::fs::File::open(path).await?;

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());

        let upload = self
            .store
            .put_multipart_opts(location, attributes.into())
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;
        let mut writer = WriteMultipart::new(upload);

        let mut buffer = vec![0u8; READ_CHUNK_BYTES];
        let mut total: u64 = 0;
        loop {
            let read = match file.read(&mut buffer).await {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) => {
                    let _ = writer.abort().await;
                    return Err(StorageError::IoError(e));
                }
            };
            if let Err(e) = writer.wait_for_capacity(MAX_CONCURRENT_PARTS).await {
                let _ = writer.abort().await;
                return Err(StorageError::UploadFailed(e.to_string()));
            }
            writer.write(&buffer[..read]);
            total += read as u64;
        }

        writer
            .finish()
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        Ok(total)
    }
}

#[async_trait]
impl VideoStore for S3Storage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }

    async fn put_file(&self, key: &str, path: &Path, content_type: &str) -> StorageResult<u64> {
        if !validate_key(key) {
            return Err(StorageError::InvalidKey(key.to_string()));
        }

        let location = ObjectPath::from(key);
        let start = Instant::now();

        let size = self
            .stream_file(&location, path, content_type)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 upload failed"
                );
                match e {
                    StorageError::IoError(io) => {
                        StorageError::UploadFailed(format!("Failed to read {}: {}", path.display(), io))
                    }
                    other => other,
                }
            })?;

        tracing::info!(
            bucket = %self.bucket,
            region = %self.region,
            key = %key,
            content_type = %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(size)
    }

    async fn presigned_get_url(
        &self,
        bucket: &str,
        key: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        if bucket != self.bucket {
            return Err(StorageError::SigningFailed(format!(
                "no credentials configured for bucket '{}'",
                bucket
            )));
        }

        let location = ObjectPath::from(key);
        let url_result: ObjectResult<_> = self
            .store
            .signed_url(Method::GET, &location, expires_in)
            .await;

        let url = url_result
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    "S3 presign failed"
                );
                StorageError::SigningFailed(e.to_string())
            })?
            .to_string();

        Ok(url)
    }

    async fn exists(&self, key: &str) -> StorageResult<bool> {
        let location = ObjectPath::from(key);
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }
}
