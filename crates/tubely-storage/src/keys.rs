//! Storage key generation.
//!
//! Key format: `{orientation}/{base}{ext}` where `ext` is derived from the content type.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use tubely_core::Orientation;
use uuid::Uuid;

/// Number of random bytes behind a generated base name.
const RANDOM_TOKEN_BYTES: usize = 32;

/// Where the unique part of a key comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySource {
    /// A fresh random token per upload. Re-uploading never overwrites; the previous
    /// object is left behind in the bucket.
    Random,
    /// The resource's own identifier. Re-uploading with the same orientation and type
    /// overwrites the previous object in place.
    Resource(Uuid),
}

/// 32 random bytes, base64url encoded without padding (43 characters).
pub fn random_token() -> String {
    let bytes: [u8; RANDOM_TOKEN_BYTES] = rand::random();
    URL_SAFE_NO_PAD.encode(bytes)
}

/// File extension for a content type: `video/mp4` → `.mp4`, anything malformed → `.bin`.
pub fn extension_for_content_type(content_type: &str) -> String {
    let parts: Vec<&str> = content_type.split('/').collect();
    if parts.len() != 2 {
        return ".bin".to_string();
    }

    let subtype = parts[1].trim();
    let valid = !parts[0].trim().is_empty()
        && !subtype.is_empty()
        && subtype
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '+' || c == '.');
    if !valid {
        return ".bin".to_string();
    }

    format!(".{}", subtype.to_ascii_lowercase())
}

/// Build the object key for an upload.
pub fn build_key(source: KeySource, orientation: Orientation, content_type: &str) -> String {
    let base = match source {
        KeySource::Random => random_token(),
        KeySource::Resource(id) => id.to_string(),
    };
    format!(
        "{}/{}{}",
        orientation.as_str(),
        base,
        extension_for_content_type(content_type)
    )
}

/// Keys must stay relative and inside their bucket.
pub(crate) fn validate_key(key: &str) -> bool {
    !key.is_empty() && !key.contains("..") && !key.starts_with('/') && !key.contains('\\')
}
