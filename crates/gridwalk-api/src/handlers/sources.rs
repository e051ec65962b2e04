//! Layer data source listing

use axum::{
    extract::State,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

/// Tables found in the layer data schema
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SourceListResponse {
    pub schema: String,
    pub sources: Vec<String>,
}

/// List the data tables of ingested layers
#[utoipa::path(
    get,
    path = "/api/v0/sources",
    responses(
        (status = 200, description = "Tables in the layer data schema", body = SourceListResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "sources"
)]
#[tracing::instrument(skip(state))]
pub async fn list_sources(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let schema = state.config.layer_schema.clone();
    let sources = state.db.source_repository.list_sources(&schema).await?;

    Ok(Json(SourceListResponse { schema, sources }))
}
