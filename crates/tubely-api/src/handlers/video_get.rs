use crate::auth::models::CallerContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::parse_video_id;
use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;
use tubely_core::{models::VideoResponse, AppError};

#[utoipa::path(
    get,
    path = "/api/videos/{video_id}",
    tag = "videos",
    params(
        ("video_id" = String, Path, description = "Video ID")
    ),
    responses(
        (status = 200, description = "Video with a freshly signed URL", body = VideoResponse),
        (status = 400, description = "Invalid video ID", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Caller does not own the video", body = ErrorResponse),
        (status = 404, description = "Video not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip(state, caller), fields(user_id = %caller.user_id))]
pub async fn get_video(
    State(state): State<Arc<AppState>>,
    caller: CallerContext,
    Path(video_id): Path<String>,
) -> Result<Json<VideoResponse>, HttpAppError> {
    let video_id = parse_video_id(&video_id)?;

    let video = state
        .videos
        .get_video(video_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;

    if !video.is_owned_by(caller.user_id) {
        return Err(AppError::Forbidden("You do not own this video".to_string()).into());
    }

    let video = state.uploads.sign_video(video).await?;
    Ok(Json(video.into()))
}
