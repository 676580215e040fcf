//! Test helpers: build AppState and router for integration tests.
//!
//! The router is the real one from `setup::routes`; only the collaborators are swapped.
//! Videos live in memory, objects go to the local storage backend rooted in a TempDir and
//! ffprobe/ffmpeg are replaced by fakes, so no database, network or media tools are needed.

pub mod auth;
pub mod fakes;
pub mod fixtures;

use axum_test::TestServer;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tubely_api::auth::JwtValidator;
use tubely_api::constants;
use tubely_api::setup::{routes, services};
use tubely_core::{BaseConfig, Config, ServiceConfig, StorageBackend};
use tubely_processing::{Dimensions, Prober, Remuxer};
use tubely_storage::{LocalStorage, VideoStore};

use fakes::{CopyRemuxer, FakeProber, InMemoryVideoRepository};

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";
pub const TEST_ASSETS_URL: &str = "http://localhost:8080/assets";

/// API path prefix for tests (e.g. `/api`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub videos: Arc<InMemoryVideoRepository>,
    pub jwt: JwtValidator,
    pub bucket: String,
    pub assets_dir: TempDir,
    pub staging_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// Number of stored objects under the local storage root.
    pub fn stored_objects(&self) -> usize {
        count_files(self.assets_dir.path())
    }

    /// Number of leftover files in the upload staging directory.
    pub fn staged_files(&self) -> usize {
        count_files(self.staging_dir.path())
    }
}

/// Options for building a test app.
pub struct TestAppOptions {
    pub dimensions: Option<Dimensions>,
    pub max_upload_bytes: u64,
}

impl Default for TestAppOptions {
    fn default() -> Self {
        Self {
            dimensions: Some(Dimensions {
                width: 1920,
                height: 1080,
            }),
            max_upload_bytes: 1024 * 1024,
        }
    }
}

/// Setup test app that classifies every upload as 1920x1080.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(TestAppOptions::default()).await
}

pub async fn setup_test_app_with(options: TestAppOptions) -> TestApp {
    let assets_dir = TempDir::new().expect("Failed to create assets dir");
    let staging_dir = TempDir::new().expect("Failed to create staging dir");

    let config = test_config(
        assets_dir.path(),
        staging_dir.path(),
        options.max_upload_bytes,
    );

    let store = LocalStorage::new(assets_dir.path(), TEST_ASSETS_URL.to_string())
        .await
        .expect("Failed to create local storage");
    let store: Arc<dyn VideoStore> = Arc::new(store);
    let bucket = store.bucket().to_string();

    let videos = Arc::new(InMemoryVideoRepository::default());
    let prober: Arc<dyn Prober> = Arc::new(FakeProber::new(options.dimensions));
    let remuxer: Arc<dyn Remuxer> = Arc::new(CopyRemuxer);

    let state = services::build_state(&config, videos.clone(), store, prober, remuxer);
    let router = routes::setup_routes(&config, state).expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to create test server");

    TestApp {
        server,
        videos,
        jwt: JwtValidator::new(TEST_JWT_SECRET),
        bucket,
        assets_dir,
        staging_dir,
    }
}

fn test_config(assets: &Path, staging: &Path, max_upload_bytes: u64) -> Config {
    let assets = assets.to_string_lossy().into_owned();
    Config(Box::new(ServiceConfig {
        base: BaseConfig {
            server_port: 8080,
            cors_origins: vec!["*".to_string()],
            db_max_connections: 1,
            db_timeout_seconds: 5,
            jwt_secret: TEST_JWT_SECRET.to_string(),
            environment: "test".to_string(),
        },
        database_url: "postgres://unused@localhost/unused".to_string(),
        storage_backend: StorageBackend::Local,
        s3_bucket: None,
        s3_region: None,
        s3_endpoint: None,
        aws_access_key_id: None,
        aws_secret_access_key: None,
        local_storage_path: Some(assets),
        local_storage_base_url: Some(TEST_ASSETS_URL.to_string()),
        max_upload_bytes,
        signed_url_ttl_secs: 900,
        accepted_content_type: "video/mp4".to_string(),
        upload_temp_dir: Some(PathBuf::from(staging)),
        ffprobe_path: "ffprobe".to_string(),
        ffmpeg_path: "ffmpeg".to_string(),
        probe_timeout_secs: 30,
        remux_timeout_secs: 600,
    }))
}

fn count_files(dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .flatten()
        .map(|entry| {
            let path = entry.path();
            if path.is_dir() {
                count_files(&path)
            } else {
                1
            }
        })
        .sum()
}
