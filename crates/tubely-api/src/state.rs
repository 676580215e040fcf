//! Application state shared by every handler.

use crate::auth::JwtValidator;
use crate::services::upload::VideoUploadService;
use std::sync::Arc;
use tubely_core::Config;
use tubely_db::VideoRepository;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub videos: Arc<dyn VideoRepository>,
    pub uploads: Arc<VideoUploadService>,
    pub jwt: Arc<JwtValidator>,
}
