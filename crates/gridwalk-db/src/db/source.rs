use gridwalk_core::AppError;
use sqlx::{PgPool, Postgres};

/// Lookup of the tables that hold ingested layer data.
#[async_trait::async_trait]
pub trait SourceStore: Send + Sync {
    async fn list_sources(&self, schema: &str) -> Result<Vec<String>, AppError>;

    async fn schema_exists(&self, schema: &str) -> Result<bool, AppError>;
}

/// Read-only view of the layer data schema, where each ingested layer owns a table.
#[derive(Clone)]
pub struct SourceRepository {
    pool: PgPool,
}

impl SourceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SourceStore for SourceRepository {
    /// Tables present in `schema`, ordered by name
    #[tracing::instrument(skip(self), fields(db.table = "information_schema.tables", db.operation = "select"))]
    async fn list_sources(&self, schema: &str) -> Result<Vec<String>, AppError> {
        let sources = sqlx::query_scalar::<Postgres, String>(
            r#"
            SELECT table_name::text
            FROM information_schema.tables
            WHERE table_schema = $1 AND table_type = 'BASE TABLE'
            ORDER BY table_name
            "#,
        )
        .bind(schema)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(count = sources.len(), schema, "Listed layer sources");
        Ok(sources)
    }

    #[tracing::instrument(skip(self), fields(db.table = "information_schema.schemata", db.operation = "select"))]
    async fn schema_exists(&self, schema: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<Postgres, bool>(
            "SELECT EXISTS (SELECT 1 FROM information_schema.schemata WHERE schema_name = $1)",
        )
        .bind(schema)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }
}
