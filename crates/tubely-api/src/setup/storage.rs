//! Storage setup and initialization

use anyhow::{Context, Result};
use std::sync::Arc;
use tubely_core::Config;
use tubely_storage::{create_storage, VideoStore};

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn VideoStore>> {
    tracing::info!("Initializing storage...");
    let store = create_storage(config)
        .await
        .context("Failed to initialize storage backend")?;

    tracing::info!(
        backend = %store.backend_type(),
        bucket = %store.bucket(),
        "Storage initialized successfully"
    );

    Ok(store)
}
