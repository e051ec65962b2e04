//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod validation;

use crate::state::{AppState, DbState};
use anyhow::{Context, Result};
use gridwalk_core::Config;
use gridwalk_db::{LayerRepository, SourceRepository, SourceStore};
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;

    crate::telemetry::init_telemetry(config.log_json)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;
    crate::error::init_error_mode(config.is_production());

    tracing::info!(
        environment = %config.environment,
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;

    let source_repository = SourceRepository::new(pool.clone());
    match source_repository.list_sources(&config.layer_schema).await {
        Ok(sources) => tracing::info!(
            schema = %config.layer_schema,
            count = sources.len(),
            sources = ?sources,
            "Layer data sources"
        ),
        Err(e) => tracing::warn!(
            schema = %config.layer_schema,
            error = %e,
            "Could not list layer data sources"
        ),
    }

    let state = Arc::new(AppState::new(
        config.clone(),
        DbState {
            layer_repository: Arc::new(LayerRepository::new(pool.clone())),
            source_repository: Arc::new(source_repository),
            pool,
        },
    ));

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
