use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Column bounds of `gridwalk.layers`.
pub const STATUS_MAX_LEN: usize = 50;
pub const NAME_MAX_LEN: usize = 255;
pub const UPLOAD_TYPE_MAX_LEN: usize = 100;

/// Upload status of a layer.
///
/// The column is a free-form VARCHAR(50): any string is legal in the database, so
/// values outside the known set decode into `Other` instead of failing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LayerStatus {
    Uploading,
    Processing,
    Ready,
    Error,
    Cancelled,
    Failed,
    Other(String),
}

impl LayerStatus {
    pub fn as_str(&self) -> &str {
        match self {
            LayerStatus::Uploading => "uploading",
            LayerStatus::Processing => "processing",
            LayerStatus::Ready => "ready",
            LayerStatus::Error => "error",
            LayerStatus::Cancelled => "cancelled",
            LayerStatus::Failed => "failed",
            LayerStatus::Other(s) => s,
        }
    }

    /// Whether this is one of the statuses the service itself assigns.
    pub fn is_known(&self) -> bool {
        !matches!(self, LayerStatus::Other(_))
    }
}

impl Display for LayerStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl From<&str> for LayerStatus {
    fn from(s: &str) -> Self {
        match s {
            "uploading" => LayerStatus::Uploading,
            "processing" => LayerStatus::Processing,
            "ready" => LayerStatus::Ready,
            "error" => LayerStatus::Error,
            "cancelled" => LayerStatus::Cancelled,
            "failed" => LayerStatus::Failed,
            other => LayerStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for LayerStatus {
    fn from(s: String) -> Self {
        LayerStatus::from(s.as_str())
    }
}

impl From<LayerStatus> for String {
    fn from(status: LayerStatus) -> Self {
        match status {
            LayerStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl std::str::FromStr for LayerStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(LayerStatus::from(s))
    }
}

/// A row of `gridwalk.layers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer {
    pub id: Uuid,
    pub status: LayerStatus,
    pub name: String,
    pub upload_type: Option<String>,
    pub total_size: i64,
    pub current_offset: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(feature = "sqlx")]
impl<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> for Layer {
    fn from_row(row: &'r sqlx::postgres::PgRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;

        let status: String = row.try_get("status")?;
        Ok(Layer {
            id: row.try_get("id")?,
            status: LayerStatus::from(status),
            name: row.try_get("name")?,
            upload_type: row.try_get("upload_type")?,
            total_size: row.try_get("total_size")?,
            current_offset: row.try_get("current_offset")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl Layer {
    /// Percentage of `total_size` received so far. `None` while the size is unknown (0).
    pub fn progress_percent(&self) -> Option<f64> {
        if self.total_size <= 0 {
            return None;
        }
        let ratio = self.current_offset as f64 / self.total_size as f64;
        Some((ratio * 100.0).clamp(0.0, 100.0))
    }

    pub fn is_upload_complete(&self) -> bool {
        self.total_size > 0 && self.current_offset >= self.total_size
    }
}

/// Insert payload. Omitted sizes fall back to the column defaults.
#[derive(Debug, Clone)]
pub struct NewLayer {
    pub id: Uuid,
    pub status: LayerStatus,
    pub name: String,
    pub upload_type: Option<String>,
    pub total_size: Option<i64>,
    pub current_offset: Option<i64>,
}

impl NewLayer {
    pub fn new(id: Uuid, status: LayerStatus, name: impl Into<String>) -> Self {
        Self {
            id,
            status,
            name: name.into(),
            upload_type: None,
            total_size: None,
            current_offset: None,
        }
    }
}

/// Partial update of a layer. `updated_at` is never set here; the database trigger owns it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerChanges {
    pub status: Option<LayerStatus>,
    pub name: Option<String>,
    /// `Some(None)` clears the column.
    pub upload_type: Option<Option<String>>,
    pub total_size: Option<i64>,
    pub current_offset: Option<i64>,
}

impl LayerChanges {
    pub fn is_empty(&self) -> bool {
        *self == LayerChanges::default()
    }

    /// Whether the change set writes `total_size` or `current_offset`.
    pub fn touches_progress(&self) -> bool {
        self.total_size.is_some() || self.current_offset.is_some()
    }
}

/// Enforce `0 <= current_offset <= total_size`. The schema itself carries no CHECK for this.
pub fn validate_progress(total_size: i64, current_offset: i64) -> Result<(), String> {
    if total_size < 0 {
        return Err("total_size cannot be negative".to_string());
    }
    if current_offset < 0 {
        return Err("current_offset cannot be negative".to_string());
    }
    if current_offset > total_size {
        return Err(format!(
            "current_offset ({}) cannot exceed total_size ({})",
            current_offset, total_size
        ));
    }
    Ok(())
}

/// Request DTO for creating a layer
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateLayerRequest {
    /// Caller-supplied identifier; generated when omitted
    #[serde(default)]
    pub id: Option<Uuid>,
    #[validate(length(max = 50, message = "status cannot exceed 50 characters"))]
    pub status: String,
    #[validate(length(max = 255, message = "name cannot exceed 255 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 100, message = "upload_type cannot exceed 100 characters"))]
    pub upload_type: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, message = "total_size cannot be negative"))]
    pub total_size: Option<i64>,
    #[serde(default)]
    #[validate(range(min = 0, message = "current_offset cannot be negative"))]
    pub current_offset: Option<i64>,
}

impl CreateLayerRequest {
    pub fn into_new_layer(self) -> NewLayer {
        NewLayer {
            id: self.id.unwrap_or_else(Uuid::new_v4),
            status: LayerStatus::from(self.status),
            name: self.name,
            upload_type: self.upload_type,
            total_size: self.total_size,
            current_offset: self.current_offset,
        }
    }
}

/// Request DTO for updating a layer. Absent fields are left unchanged;
/// `"upload_type": null` clears the column.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
#[validate(schema(function = "validate_update_upload_type"))]
pub struct UpdateLayerRequest {
    #[serde(default)]
    #[validate(length(max = 50, message = "status cannot exceed 50 characters"))]
    pub status: Option<String>,
    #[serde(default)]
    #[validate(length(max = 255, message = "name cannot exceed 255 characters"))]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub upload_type: Option<Option<String>>,
    #[serde(default)]
    #[validate(range(min = 0, message = "total_size cannot be negative"))]
    pub total_size: Option<i64>,
    #[serde(default)]
    #[validate(range(min = 0, message = "current_offset cannot be negative"))]
    pub current_offset: Option<i64>,
}

fn validate_update_upload_type(request: &UpdateLayerRequest) -> Result<(), ValidationError> {
    match &request.upload_type {
        Some(Some(upload_type)) if upload_type.chars().count() > UPLOAD_TYPE_MAX_LEN => {
            let mut err = ValidationError::new("length");
            err.message = Some("upload_type cannot exceed 100 characters".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

impl UpdateLayerRequest {
    pub fn into_changes(self) -> LayerChanges {
        LayerChanges {
            status: self.status.map(LayerStatus::from),
            name: self.name,
            upload_type: self.upload_type,
            total_size: self.total_size,
            current_offset: self.current_offset,
        }
    }
}

// Present-but-null must stay distinguishable from absent.
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Layer response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LayerResponse {
    pub id: Uuid,
    #[schema(value_type = String, example = "uploading")]
    pub status: LayerStatus,
    pub name: String,
    pub upload_type: Option<String>,
    pub total_size: i64,
    pub current_offset: i64,
    /// Percentage received; absent while total_size is 0
    pub progress_percent: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Layer> for LayerResponse {
    fn from(layer: Layer) -> Self {
        LayerResponse {
            progress_percent: layer.progress_percent(),
            id: layer.id,
            status: layer.status,
            name: layer.name,
            upload_type: layer.upload_type,
            total_size: layer.total_size,
            current_offset: layer.current_offset,
            created_at: layer.created_at,
            updated_at: layer.updated_at,
        }
    }
}

/// Paginated layer list
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LayerListResponse {
    pub layers: Vec<LayerResponse>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}
