//! Application setup and initialization
//!
//! Startup runs in a fixed order: configuration check, telemetry, database, storage,
//! services, then routes.

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;

use crate::state::AppState;
use crate::telemetry::init::{init_telemetry, LogFormat};
use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;

    init_telemetry(LogFormat::from_env())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        production = config.is_production(),
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;
    let store = storage::setup_storage(&config).await?;
    let state = services::initialize_services(&config, pool, store)?;
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
