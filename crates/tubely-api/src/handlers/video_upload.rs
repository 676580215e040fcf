use crate::auth::models::CallerContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::services::upload::UploadRequest;
use crate::state::AppState;
use crate::utils::upload::parse_video_id;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    Json,
};
use futures::TryStreamExt;
use std::io;
use std::sync::Arc;
use tokio_util::io::StreamReader;
use tubely_core::{constants::VIDEO_FORM_FIELD, models::VideoResponse, AppError};

/// Upload the video file for an existing record.
///
/// Ownership is checked before the form body is read. The `video` part is streamed
/// straight into the upload pipeline, never collected in memory.
#[utoipa::path(
    put,
    path = "/api/videos/{video_id}/upload",
    tag = "videos",
    params(
        ("video_id" = String, Path, description = "Video ID")
    ),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Video uploaded successfully", body = VideoResponse),
        (status = 400, description = "Invalid ID, missing form file or unsupported media type", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, caller, multipart), fields(user_id = %caller.user_id))]
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    caller: CallerContext,
    Path(video_id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<VideoResponse>, HttpAppError> {
    let video_id = parse_video_id(&video_id)?;
    let uploads = &state.uploads;

    let video = uploads.authorize(caller.user_id, video_id).await?;

    let mut multipart = multipart.map_err(|e| {
        AppError::BadRequest(format!("Expected multipart form data: {}", e.body_text()))
    })?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read multipart field: {}", e)))?
    {
        if field.name() != Some(VIDEO_FORM_FIELD) {
            continue;
        }

        let content_type = field.content_type().map(str::to_string);
        let body = StreamReader::new(field.map_err(io::Error::other));

        let updated = uploads
            .ingest(video, UploadRequest { content_type, body })
            .await?;
        let signed = uploads.sign_video(updated).await?;
        return Ok(Json(signed.into()));
    }

    Err(AppError::BadRequest(format!("Couldn't find form file '{}'", VIDEO_FORM_FIELD)).into())
}
