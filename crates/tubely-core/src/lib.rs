//! Tubely Core Library
//!
//! This crate provides the domain models, error types and configuration shared by every
//! Tubely component: the processing pipeline, the storage backends, the database layer
//! and the HTTP API.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, ServiceConfig, UploadConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{Orientation, Video, VideoResponse};
pub use storage_types::StorageBackend;
