use tubely_core::AppError;
use uuid::Uuid;

/// Normalize MIME type by stripping parameters (e.g. "video/mp4; codecs=avc1" -> "video/mp4").
pub fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}

/// Check the declared content type of an upload against the single accepted type.
/// Compares the normalized MIME type only, so parameters cannot bypass the check.
/// Returns the accepted type on success.
pub fn validate_content_type(declared: Option<&str>, accepted: &str) -> Result<String, AppError> {
    let declared = declared.ok_or_else(|| {
        AppError::UnsupportedMediaType(format!("Missing content type. Expected {}", accepted))
    })?;

    let normalized = normalize_mime_type(declared).to_lowercase();
    if normalized != accepted.to_lowercase() {
        return Err(AppError::UnsupportedMediaType(format!(
            "Invalid content type '{}'. Expected {}",
            normalized, accepted
        )));
    }

    Ok(accepted.to_lowercase())
}

/// Parse a path segment into a video id.
pub fn parse_video_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw.trim())
        .map_err(|_| AppError::BadRequest(format!("Invalid video ID: {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_mime_type() {
        assert_eq!(normalize_mime_type("video/mp4"), "video/mp4");
        assert_eq!(normalize_mime_type("video/mp4; codecs=avc1"), "video/mp4");
        assert_eq!(normalize_mime_type("  video/mp4 ;x=y"), "video/mp4");
    }

    #[test]
    fn test_validate_content_type() {
        assert_eq!(
            validate_content_type(Some("video/mp4"), "video/mp4").unwrap(),
            "video/mp4"
        );
        assert!(validate_content_type(Some("VIDEO/MP4; x=1"), "video/mp4").is_ok());
        assert!(matches!(
            validate_content_type(Some("video/quicktime"), "video/mp4"),
            Err(AppError::UnsupportedMediaType(_))
        ));
        assert!(matches!(
            validate_content_type(Some("video/mp4x"), "video/mp4"),
            Err(AppError::UnsupportedMediaType(_))
        ));
        assert!(matches!(
            validate_content_type(None, "video/mp4"),
            Err(AppError::UnsupportedMediaType(_))
        ));
    }

    #[test]
    fn test_parse_video_id() {
        let id = Uuid::new_v4();
        assert_eq!(parse_video_id(&id.to_string()).unwrap(), id);
        assert!(matches!(
            parse_video_id("not-a-uuid"),
            Err(AppError::BadRequest(_))
        ));
    }
}
