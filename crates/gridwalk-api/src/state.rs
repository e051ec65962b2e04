//! Application state shared by all handlers.

use gridwalk_core::Config;
use gridwalk_db::{LayerStore, SourceStore};
use sqlx::PgPool;
use std::sync::Arc;

/// Database pool and the repositories built on it.
///
/// Repositories sit behind their traits so the router can run against other stores.
#[derive(Clone)]
pub struct DbState {
    pub pool: PgPool,
    pub layer_repository: Arc<dyn LayerStore>,
    pub source_repository: Arc<dyn SourceStore>,
}

pub struct AppState {
    pub config: Config,
    pub db: DbState,
}

impl AppState {
    pub fn new(config: Config, db: DbState) -> Self {
        Self { config, db }
    }
}
