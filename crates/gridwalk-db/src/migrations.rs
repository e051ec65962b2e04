//! Embedded schema migrations

use gridwalk_core::AppError;
use sqlx::migrate::Migrator;
use sqlx::{PgPool, Postgres};
use std::collections::HashSet;

/// Migrations from the workspace `migrations/` directory, compiled into the binary.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// A migration known to this build and whether the database has applied it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationInfo {
    pub version: i64,
    pub description: String,
    pub applied: bool,
}

/// Apply all pending migrations. Already-applied migrations are skipped.
#[tracing::instrument(skip(pool))]
pub async fn migrate(pool: &PgPool) -> Result<(), AppError> {
    MIGRATOR
        .run(pool)
        .await
        .map_err(|e| anyhow::Error::new(e).context("Failed to run database migrations"))?;
    tracing::info!("Database migrations applied");
    Ok(())
}

#[tracing::instrument(skip(pool))]
pub async fn migration_status(pool: &PgPool) -> Result<Vec<MigrationInfo>, AppError> {
    let table_exists = sqlx::query_scalar::<Postgres, bool>(
        "SELECT to_regclass('_sqlx_migrations') IS NOT NULL",
    )
    .fetch_one(pool)
    .await?;

    let applied: HashSet<i64> = if table_exists {
        sqlx::query_scalar::<Postgres, i64>("SELECT version FROM _sqlx_migrations WHERE success")
            .fetch_all(pool)
            .await?
            .into_iter()
            .collect()
    } else {
        HashSet::new()
    };

    Ok(MIGRATOR
        .iter()
        .filter(|m| !m.migration_type.is_down_migration())
        .map(|m| MigrationInfo {
            version: m.version,
            description: m.description.to_string(),
            applied: applied.contains(&m.version),
        })
        .collect())
}
