//! Video repository: read and update rows of the videos table.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{PgPool, Postgres};
use tubely_core::models::Video;
use tubely_core::AppError;
use uuid::Uuid;

#[async_trait]
pub trait VideoRepository: Send + Sync {
    /// Load a video by id; `Ok(None)` when no such row exists.
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError>;

    /// Persist every mutable column of `video` and return the stored row.
    async fn update_video(&self, video: &Video) -> Result<Video, AppError>;
}

/// Repository for the videos table.
#[derive(Clone)]
pub struct PgVideoRepository {
    pool: PgPool,
}

impl PgVideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VideoRepository for PgVideoRepository {
    #[tracing::instrument(skip(self), fields(db.table = "videos"))]
    async fn get_video(&self, id: Uuid) -> Result<Option<Video>, AppError> {
        let video = sqlx::query_as::<Postgres, Video>(
            r#"
            SELECT id, user_id, title, description, thumbnail_url, video_url,
                   created_at, updated_at
            FROM videos
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    #[tracing::instrument(skip(self, video), fields(db.table = "videos", video_id = %video.id))]
    async fn update_video(&self, video: &Video) -> Result<Video, AppError> {
        let updated = sqlx::query_as::<Postgres, Video>(
            r#"
            UPDATE videos
            SET title = $2,
                description = $3,
                thumbnail_url = $4,
                video_url = $5,
                updated_at = $6
            WHERE id = $1
            RETURNING id, user_id, title, description, thumbnail_url, video_url,
                      created_at, updated_at
            "#,
        )
        .bind(video.id)
        .bind(&video.title)
        .bind(&video.description)
        .bind(&video.thumbnail_url)
        .bind(&video.video_url)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| AppError::NotFound(format!("Video {} not found", video.id)))
    }
}
