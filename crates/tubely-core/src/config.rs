//! Configuration module
//!
//! Configuration is read once from the environment at startup. The upload pipeline never
//! touches the environment itself: it receives an [`UploadConfig`] built from [`Config`].

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_ACCEPTED_CONTENT_TYPE, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PROBE_TIMEOUT_SECS,
    DEFAULT_REMUX_TIMEOUT_SECS, DEFAULT_SIGNED_URL_TTL, MAX_SIGNED_URL_TTL,
};
use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 8080;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;

/// HTTP, database and auth settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub jwt_secret: String,
    pub environment: String,
}

/// Full service configuration
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub base: BaseConfig,
    pub database_url: String,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Upload pipeline
    pub max_upload_bytes: u64,
    pub signed_url_ttl_secs: u64,
    pub accepted_content_type: String,
    pub upload_temp_dir: Option<PathBuf>,
    pub ffprobe_path: String,
    pub ffmpeg_path: String,
    pub probe_timeout_secs: u64,
    pub remux_timeout_secs: u64,
}

/// Settings handed to the upload orchestrator.
#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub bucket: String,
    pub region: String,
    pub max_upload_bytes: u64,
    pub signed_url_ttl: Duration,
    pub accepted_content_type: String,
    /// Where inbound uploads and remux output are staged; `None` uses the system temp dir.
    pub temp_dir: Option<PathBuf>,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            bucket: String::new(),
            region: String::new(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            signed_url_ttl: DEFAULT_SIGNED_URL_TTL,
            accepted_content_type: DEFAULT_ACCEPTED_CONTENT_TYPE.to_string(),
            temp_dir: None,
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<ServiceConfig>);

impl Config {
    fn inner(&self) -> &ServiceConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.inner().base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = ServiceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn jwt_secret(&self) -> &str {
        &self.inner().base.jwt_secret
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn database_url(&self) -> &str {
        &self.inner().database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.inner().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.inner().base.db_timeout_seconds
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.inner().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.inner().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.inner().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().s3_endpoint.as_deref()
    }

    pub fn aws_access_key_id(&self) -> Option<&str> {
        self.inner().aws_access_key_id.as_deref()
    }

    pub fn aws_secret_access_key(&self) -> Option<&str> {
        self.inner().aws_secret_access_key.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.inner().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.inner().local_storage_base_url.as_deref()
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.inner().max_upload_bytes
    }

    pub fn signed_url_ttl(&self) -> Duration {
        Duration::from_secs(self.inner().signed_url_ttl_secs)
    }

    pub fn accepted_content_type(&self) -> &str {
        &self.inner().accepted_content_type
    }

    pub fn ffprobe_path(&self) -> &str {
        &self.inner().ffprobe_path
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.inner().ffmpeg_path
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.inner().probe_timeout_secs)
    }

    pub fn remux_timeout(&self) -> Duration {
        Duration::from_secs(self.inner().remux_timeout_secs)
    }

    /// Bucket the active backend writes into. The local backend reports its root
    /// directory so stored references stay in the same `"bucket,key"` shape.
    pub fn storage_bucket(&self) -> String {
        match self.storage_backend() {
            StorageBackend::S3 => self.s3_bucket().unwrap_or_default().to_string(),
            StorageBackend::Local => self.local_storage_path().unwrap_or_default().to_string(),
        }
    }

    pub fn upload_config(&self) -> UploadConfig {
        let inner = self.inner();
        UploadConfig {
            bucket: self.storage_bucket(),
            region: inner.s3_region.clone().unwrap_or_default(),
            max_upload_bytes: inner.max_upload_bytes,
            signed_url_ttl: self.signed_url_ttl(),
            accepted_content_type: inner.accepted_content_type.clone(),
            temp_dir: inner.upload_temp_dir.clone(),
        }
    }
}

fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let server_port = env::var("SERVER_PORT")
            .or_else(|_| env::var("PORT"))
            .unwrap_or_else(|_| SERVER_PORT.to_string())
            .parse()
            .unwrap_or(SERVER_PORT);

        let base = BaseConfig {
            server_port,
            cors_origins,
            db_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DATABASE_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            jwt_secret: env::var("JWT_SECRET")
                .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?,
            environment,
        };

        let storage_backend = match optional_var("STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None => StorageBackend::S3,
        };

        let local_storage_path =
            Some(optional_var("LOCAL_STORAGE_PATH").unwrap_or_else(|| "./assets".to_string()));
        let local_storage_base_url = Some(
            optional_var("LOCAL_STORAGE_BASE_URL")
                .unwrap_or_else(|| format!("http://localhost:{}/assets", server_port)),
        );

        Ok(Self {
            base,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            storage_backend,
            s3_bucket: optional_var("S3_BUCKET"),
            s3_region: optional_var("S3_REGION").or_else(|| optional_var("AWS_REGION")),
            s3_endpoint: optional_var("S3_ENDPOINT"),
            aws_access_key_id: optional_var("AWS_ACCESS_KEY_ID"),
            aws_secret_access_key: optional_var("AWS_SECRET_ACCESS_KEY"),
            local_storage_path,
            local_storage_base_url,
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_BYTES.to_string())
                .parse()
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            signed_url_ttl_secs: env::var("SIGNED_URL_TTL_SECS")
                .unwrap_or_else(|_| DEFAULT_SIGNED_URL_TTL.as_secs().to_string())
                .parse()
                .unwrap_or(DEFAULT_SIGNED_URL_TTL.as_secs()),
            accepted_content_type: env::var("ACCEPTED_CONTENT_TYPE")
                .unwrap_or_else(|_| DEFAULT_ACCEPTED_CONTENT_TYPE.to_string())
                .trim()
                .to_lowercase(),
            upload_temp_dir: optional_var("UPLOAD_TEMP_DIR").map(PathBuf::from),
            ffprobe_path: env::var("FFPROBE_PATH").unwrap_or_else(|_| "ffprobe".to_string()),
            ffmpeg_path: env::var("FFMPEG_PATH").unwrap_or_else(|_| "ffmpeg".to_string()),
            probe_timeout_secs: env::var("PROBE_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_PROBE_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_PROBE_TIMEOUT_SECS),
            remux_timeout_secs: env::var("REMUX_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_REMUX_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(DEFAULT_REMUX_TIMEOUT_SECS),
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.jwt_secret.len() < 32 {
            return Err(anyhow::anyhow!(
                "JWT_SECRET must be at least 32 characters long"
            ));
        }

        if !self.database_url.starts_with("postgres://")
            && !self.database_url.starts_with("postgresql://")
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        if self.s3_bucket.as_deref().is_some_and(|b| b.contains(','))
            || self.local_storage_path.as_deref().is_some_and(|p| p.contains(','))
        {
            return Err(anyhow::anyhow!(
                "Storage bucket and local storage path must not contain ','"
            ));
        }

        if self.max_upload_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_BYTES must be greater than 0"));
        }

        let ttl = Duration::from_secs(self.signed_url_ttl_secs);
        if ttl.is_zero() || ttl > MAX_SIGNED_URL_TTL {
            return Err(anyhow::anyhow!(
                "SIGNED_URL_TTL_SECS must be between 1 and {}",
                MAX_SIGNED_URL_TTL.as_secs()
            ));
        }

        if self.accepted_content_type.split('/').count() != 2 {
            return Err(anyhow::anyhow!(
                "ACCEPTED_CONTENT_TYPE must look like type/subtype, got '{}'",
                self.accepted_content_type
            ));
        }

        if self.probe_timeout_secs == 0 || self.remux_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "PROBE_TIMEOUT_SECS and REMUX_TIMEOUT_SECS must be greater than 0"
            ));
        }

        Ok(())
    }
}
