//! Database setup and initialization

use anyhow::{Context, Result};
use gridwalk_core::Config;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// Setup database connection pool and apply migrations when enabled
pub async fn setup_database(config: &Config) -> Result<PgPool> {
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!(
        max_connections = config.db_max_connections,
        "Database connected successfully"
    );

    if config.run_migrations {
        gridwalk_db::migrate(&pool)
            .await
            .context("Failed to run database migrations")?;
    } else {
        tracing::info!("RUN_MIGRATIONS=false, skipping migrations");
    }

    Ok(pool)
}
