use axum_test::multipart::{MultipartForm, Part};
use chrono::Utc;
use tubely_core::Video;
use uuid::Uuid;

/// Bytes standing in for an MP4 file; the fake prober never inspects them.
pub const FAKE_MP4: &[u8] = b"\x00\x00\x00\x18ftypmp42\x00\x00\x00\x00mp42isomfake-payload";

/// Insert a video owned by `owner` without an uploaded file.
pub fn video_owned_by(owner: Uuid) -> Video {
    let now = Utc::now();
    Video {
        id: Uuid::new_v4(),
        user_id: owner,
        title: "Boots".to_string(),
        description: Some("Boot camp footage".to_string()),
        thumbnail_url: None,
        video_url: None,
        created_at: now,
        updated_at: now,
    }
}

/// Form with a single file part.
pub fn video_form(field: &str, bytes: &[u8], mime: &str) -> MultipartForm {
    let part = Part::bytes(bytes.to_vec())
        .file_name("boots.mp4")
        .mime_type(mime);
    MultipartForm::new().add_part(field.to_string(), part)
}

pub fn mp4_form() -> MultipartForm {
    video_form("video", FAKE_MP4, "video/mp4")
}
