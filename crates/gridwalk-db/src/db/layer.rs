use gridwalk_core::models::{validate_progress, Layer, LayerChanges, NewLayer};
use gridwalk_core::AppError;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

const LAYER_COLUMNS: &str =
    "id, status, name, upload_type, total_size, current_offset, created_at, updated_at";

/// Storage operations on `gridwalk.layers`.
///
/// `updated_at` is never written by implementations; the table trigger sets it.
#[async_trait::async_trait]
pub trait LayerStore: Send + Sync {
    async fn create(&self, layer: NewLayer) -> Result<Layer, AppError>;

    async fn get(&self, id: Uuid) -> Result<Option<Layer>, AppError>;

    /// Newest first.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Layer>, AppError>;

    async fn count(&self) -> Result<i64, AppError>;

    /// Apply `changes` and return the updated row, or `None` if no layer has `id`.
    /// An empty change set still touches the row.
    ///
    /// When `total_size` or `current_offset` changes, the write only happens if the
    /// resulting row keeps `0 <= current_offset <= total_size`; otherwise
    /// `AppError::InvalidInput` is returned and the row is left as is. The check runs
    /// against the row being written, not an earlier read.
    async fn update(&self, id: Uuid, changes: LayerChanges) -> Result<Option<Layer>, AppError>;

    /// Insert or overwrite the layer with the same id.
    async fn save(&self, layer: &Layer) -> Result<Layer, AppError>;

    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

/// Repository for the layer upload registry
#[derive(Clone)]
pub struct LayerRepository {
    pool: PgPool,
}

impl LayerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Omitted sizes are left out of the column list so the table defaults apply.
fn insert_query(layer: NewLayer) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("INSERT INTO gridwalk.layers (id, status, name, upload_type");
    if layer.total_size.is_some() {
        qb.push(", total_size");
    }
    if layer.current_offset.is_some() {
        qb.push(", current_offset");
    }
    qb.push(") VALUES (");

    {
        let mut values = qb.separated(", ");
        values.push_bind(layer.id);
        values.push_bind(String::from(layer.status));
        values.push_bind(layer.name);
        values.push_bind(layer.upload_type);
        if let Some(total_size) = layer.total_size {
            values.push_bind(total_size);
        }
        if let Some(current_offset) = layer.current_offset {
            values.push_bind(current_offset);
        }
    }

    qb.push(") RETURNING ");
    qb.push(LAYER_COLUMNS);
    qb
}

// Pushes the new value when the change set carries one, else the stored column.
fn push_new_or_column(qb: &mut QueryBuilder<'static, Postgres>, value: Option<i64>, column: &str) {
    match value {
        Some(value) => {
            qb.push_bind(value);
        }
        None => {
            qb.push(column);
        }
    }
}

fn update_query(id: Uuid, changes: LayerChanges) -> QueryBuilder<'static, Postgres> {
    let guard_progress = changes.touches_progress();
    let (new_total, new_offset) = (changes.total_size, changes.current_offset);
    let mut qb = QueryBuilder::new("UPDATE gridwalk.layers SET ");

    if changes.is_empty() {
        qb.push("id = id");
    } else {
        let mut set = qb.separated(", ");
        if let Some(status) = changes.status {
            set.push("status = ");
            set.push_bind_unseparated(String::from(status));
        }
        if let Some(name) = changes.name {
            set.push("name = ");
            set.push_bind_unseparated(name);
        }
        if let Some(upload_type) = changes.upload_type {
            set.push("upload_type = ");
            set.push_bind_unseparated(upload_type);
        }
        if let Some(total_size) = changes.total_size {
            set.push("total_size = ");
            set.push_bind_unseparated(total_size);
        }
        if let Some(current_offset) = changes.current_offset {
            set.push("current_offset = ");
            set.push_bind_unseparated(current_offset);
        }
    }

    qb.push(" WHERE id = ");
    qb.push_bind(id);
    if guard_progress {
        qb.push(" AND ");
        push_new_or_column(&mut qb, new_offset, "current_offset");
        qb.push(" BETWEEN 0 AND ");
        push_new_or_column(&mut qb, new_total, "total_size");
    }
    qb.push(" RETURNING ");
    qb.push(LAYER_COLUMNS);
    qb
}

#[async_trait::async_trait]
impl LayerStore for LayerRepository {
    #[tracing::instrument(skip(self, layer), fields(db.table = "gridwalk.layers", db.operation = "insert", db.record_id = %layer.id))]
    async fn create(&self, layer: NewLayer) -> Result<Layer, AppError> {
        let layer = insert_query(layer)
            .build_query_as::<Layer>()
            .fetch_one(&self.pool)
            .await?;

        tracing::debug!(status = %layer.status, "Layer created");
        Ok(layer)
    }

    #[tracing::instrument(skip(self), fields(db.table = "gridwalk.layers", db.operation = "select", db.record_id = %id))]
    async fn get(&self, id: Uuid) -> Result<Option<Layer>, AppError> {
        let layer = sqlx::query_as::<Postgres, Layer>(&format!(
            "SELECT {} FROM gridwalk.layers WHERE id = $1",
            LAYER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(layer)
    }

    #[tracing::instrument(skip(self), fields(db.table = "gridwalk.layers", db.operation = "select"))]
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Layer>, AppError> {
        let layers = sqlx::query_as::<Postgres, Layer>(&format!(
            "SELECT {} FROM gridwalk.layers ORDER BY created_at DESC, id LIMIT $1 OFFSET $2",
            LAYER_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(layers)
    }

    #[tracing::instrument(skip(self), fields(db.table = "gridwalk.layers", db.operation = "count"))]
    async fn count(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<Postgres, i64>("SELECT COUNT(*) FROM gridwalk.layers")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    #[tracing::instrument(skip(self, changes), fields(db.table = "gridwalk.layers", db.operation = "update", db.record_id = %id))]
    async fn update(&self, id: Uuid, changes: LayerChanges) -> Result<Option<Layer>, AppError> {
        let guard_progress = changes.touches_progress();
        let (new_total, new_offset) = (changes.total_size, changes.current_offset);

        let layer = update_query(id, changes)
            .build_query_as::<Layer>()
            .fetch_optional(&self.pool)
            .await?;

        if layer.is_some() || !guard_progress {
            return Ok(layer);
        }

        // No row matched: either the id is unknown or the progress guard failed
        let Some(current) = self.get(id).await? else {
            return Ok(None);
        };
        let message = validate_progress(
            new_total.unwrap_or(current.total_size),
            new_offset.unwrap_or(current.current_offset),
        )
        .err()
        .unwrap_or_else(|| "current_offset must stay between 0 and total_size".to_string());

        tracing::debug!(reason = %message, "Progress update rejected");
        Err(AppError::InvalidInput(message))
    }

    #[tracing::instrument(skip(self, layer), fields(db.table = "gridwalk.layers", db.operation = "upsert", db.record_id = %layer.id))]
    async fn save(&self, layer: &Layer) -> Result<Layer, AppError> {
        let saved = sqlx::query_as::<Postgres, Layer>(&format!(
            r#"
            INSERT INTO gridwalk.layers (id, status, name, upload_type, total_size, current_offset, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO UPDATE SET
                status = EXCLUDED.status,
                name = EXCLUDED.name,
                upload_type = EXCLUDED.upload_type,
                total_size = EXCLUDED.total_size,
                current_offset = EXCLUDED.current_offset
            RETURNING {}
            "#,
            LAYER_COLUMNS
        ))
        .bind(layer.id)
        .bind(layer.status.as_str())
        .bind(&layer.name)
        .bind(&layer.upload_type)
        .bind(layer.total_size)
        .bind(layer.current_offset)
        .bind(layer.created_at)
        .bind(layer.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(saved)
    }

    #[tracing::instrument(skip(self), fields(db.table = "gridwalk.layers", db.operation = "delete", db.record_id = %id))]
    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM gridwalk.layers WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
