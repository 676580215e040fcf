//! Postgres pool and schema migrations.

use crate::constants::MIGRATIONS_DIR_ENV;
use anyhow::{Context, Result};
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tubely_core::Config;

/// Connect to the videos database and bring its schema up to date.
pub async fn setup_database(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections())
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds()))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(config.database_url())
        .await
        .context("Failed to connect to database")?;

    tracing::info!(
        max_connections = config.db_max_connections(),
        "Database connected"
    );

    run_migrations(&pool, &migrations_dir()).await?;

    Ok(pool)
}

/// The workspace `migrations/` directory, unless overridden for packaged deployments.
pub fn migrations_dir() -> PathBuf {
    std::env::var(MIGRATIONS_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations"))
}

async fn run_migrations(pool: &PgPool, dir: &Path) -> Result<()> {
    let started = Instant::now();
    let migrator = Migrator::new(dir)
        .await
        .with_context(|| format!("Failed to load migrations from {}", dir.display()))?;

    let count = migrator.iter().count();
    let latest = migrator.iter().map(|m| m.version).max();

    migrator
        .run(pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!(
        dir = %dir.display(),
        migrations = count,
        latest_version = ?latest,
        duration_ms = started.elapsed().as_millis() as u64,
        "Database schema up to date"
    );
    Ok(())
}
