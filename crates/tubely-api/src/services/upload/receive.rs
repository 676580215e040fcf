use std::path::Path;
use tempfile::{Builder, TempPath};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tubely_core::AppError;

const READ_CHUNK_BYTES: usize = 64 * 1024;

/// Inbound upload body written to a request-scoped temp file. The file is removed
/// when this value is dropped.
#[derive(Debug)]
pub struct StagedUpload {
    path: TempPath,
    size: u64,
}

impl StagedUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> u64 {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

/// Copy `body` into a fresh temp file, reading at most `max_bytes + 1` bytes.
///
/// Only one chunk is held in memory at a time. A body longer than `max_bytes` is rejected
/// as soon as the extra byte arrives; an empty body is rejected once the stream ends.
pub async fn stage_upload<R>(
    body: R,
    max_bytes: u64,
    extension: &str,
    temp_dir: Option<&Path>,
) -> Result<StagedUpload, AppError>
where
    R: AsyncRead + Send,
{
    let mut builder = Builder::new();
    builder.prefix("tubely-upload-").suffix(extension);
    let named = match temp_dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    }
    .map_err(|e| AppError::Internal(format!("Failed to create upload temp file: {}", e)))?;

    let (file, path) = named.into_parts();
    let mut file = tokio::fs::File::from_std(file);

    let body = std::pin::pin!(body);
    let mut reader = body.take(max_bytes.saturating_add(1));
    let mut buf = vec![0u8; READ_CHUNK_BYTES];
    let mut size: u64 = 0;

    loop {
        let n = reader
            .read(&mut buf)
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read upload body: {}", e)))?;
        if n == 0 {
            break;
        }

        size += n as u64;
        if size > max_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "Upload exceeds the maximum size of {} bytes",
                max_bytes
            )));
        }

        file.write_all(&buf[..n]).await.map_err(|e| {
            AppError::Internal(format!("Failed to write upload temp file: {}", e))
        })?;
    }

    if size == 0 {
        return Err(AppError::BadRequest("Uploaded video is empty".to_string()));
    }

    file.flush().await?;

    tracing::debug!(path = %path.display(), size = size, "Upload staged");

    Ok(StagedUpload { path, size })
}
