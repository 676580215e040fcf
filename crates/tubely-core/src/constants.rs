//! Pipeline defaults

use std::time::Duration;

/// Hard ceiling on the size of a single uploaded video (1 GiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 1 << 30;

/// Lifetime of a signed retrieval URL.
pub const DEFAULT_SIGNED_URL_TTL: Duration = Duration::from_secs(15 * 60);

/// S3 rejects presigned URLs valid for longer than seven days.
pub const MAX_SIGNED_URL_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// The single container type accepted for upload.
pub const DEFAULT_ACCEPTED_CONTENT_TYPE: &str = "video/mp4";

/// Multipart form field carrying the video bytes.
pub const VIDEO_FORM_FIELD: &str = "video";

pub const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_REMUX_TIMEOUT_SECS: u64 = 600;

/// Slack added on top of the upload ceiling for multipart boundaries and part headers.
pub const MULTIPART_OVERHEAD_BYTES: u64 = 64 * 1024;
