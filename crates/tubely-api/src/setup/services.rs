//! Service and repository wiring

use crate::auth::JwtValidator;
use crate::services::upload::VideoUploadService;
use crate::state::AppState;
use anyhow::{Context, Result};
use sqlx::PgPool;
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::{PgVideoRepository, VideoRepository};
use tubely_processing::{FfmpegRemuxer, FfprobeProber, Prober, Remuxer};
use tubely_storage::VideoStore;

pub fn initialize_services(
    config: &Config,
    pool: PgPool,
    store: Arc<dyn VideoStore>,
) -> Result<Arc<AppState>> {
    let videos: Arc<dyn VideoRepository> = Arc::new(PgVideoRepository::new(pool));

    let prober: Arc<dyn Prober> = Arc::new(
        FfprobeProber::new(config.ffprobe_path(), config.probe_timeout())
            .context("Invalid FFPROBE_PATH")?,
    );
    let remuxer: Arc<dyn Remuxer> = Arc::new(
        FfmpegRemuxer::new(config.ffmpeg_path(), config.remux_timeout())
            .context("Invalid FFMPEG_PATH")?,
    );

    tracing::info!(
        ffprobe = %config.ffprobe_path(),
        ffmpeg = %config.ffmpeg_path(),
        probe_timeout_secs = config.probe_timeout().as_secs(),
        remux_timeout_secs = config.remux_timeout().as_secs(),
        "Media tools configured"
    );

    Ok(build_state(config, videos, store, prober, remuxer))
}

/// Assemble the application state from its collaborators. The upload bucket always
/// follows the active storage backend.
pub fn build_state(
    config: &Config,
    videos: Arc<dyn VideoRepository>,
    store: Arc<dyn VideoStore>,
    prober: Arc<dyn Prober>,
    remuxer: Arc<dyn Remuxer>,
) -> Arc<AppState> {
    let mut upload_config = config.upload_config();
    upload_config.bucket = store.bucket().to_string();

    let uploads = VideoUploadService::new(upload_config, videos.clone(), store, prober, remuxer);

    Arc::new(AppState {
        config: config.clone(),
        videos,
        uploads: Arc::new(uploads),
        jwt: Arc::new(JwtValidator::new(config.jwt_secret())),
    })
}
