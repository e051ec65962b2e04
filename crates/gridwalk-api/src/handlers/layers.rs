//! Layer registry handlers
//!
//! CRUD over `gridwalk.layers`. Upload progress (`total_size`, `current_offset`) is
//! recorded as given; these handlers never advance it on their own.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::constants::{API_PREFIX, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use gridwalk_core::models::{
    validate_progress, CreateLayerRequest, LayerListResponse, LayerResponse, UpdateLayerRequest,
};
use gridwalk_core::AppError;

#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct LayerListQuery {
    /// Page size (1-1000, default 50)
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    DEFAULT_PAGE_SIZE
}

fn layer_not_found(id: Uuid) -> HttpAppError {
    AppError::NotFound(format!("Layer {} not found", id)).into()
}

/// Register a new layer
#[utoipa::path(
    post,
    path = "/api/v0/layers",
    request_body = CreateLayerRequest,
    responses(
        (status = 201, description = "Layer created", body = LayerResponse),
        (status = 400, description = "Invalid request - validation failed", body = ErrorResponse),
        (status = 409, description = "A layer with this id already exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "layers"
)]
#[tracing::instrument(skip(state, request), fields(layer_id = ?request.id, operation = "create_layer"))]
pub async fn create_layer(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateLayerRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;
    validate_progress(
        request.total_size.unwrap_or(0),
        request.current_offset.unwrap_or(0),
    )
    .map_err(AppError::InvalidInput)?;

    let layer = state
        .db
        .layer_repository
        .create(request.into_new_layer())
        .await?;

    tracing::info!(layer_id = %layer.id, status = %layer.status, "Layer registered");

    let location = format!("{}/layers/{}", API_PREFIX, layer.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(LayerResponse::from(layer)),
    ))
}

/// List layers, newest first
#[utoipa::path(
    get,
    path = "/api/v0/layers",
    params(LayerListQuery),
    responses(
        (status = 200, description = "Page of layers", body = LayerListResponse),
        (status = 400, description = "Invalid query parameters", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "layers"
)]
#[tracing::instrument(skip(state, query), fields(operation = "list_layers"))]
pub async fn list_layers(
    State(state): State<Arc<AppState>>,
    query: Result<Query<LayerListQuery>, QueryRejection>,
) -> Result<impl IntoResponse, HttpAppError> {
    let Query(query) = query?;
    let limit = query.limit.clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.max(0);

    let layers = state.db.layer_repository.list(limit, offset).await?;
    let total = state.db.layer_repository.count().await?;

    Ok(Json(LayerListResponse {
        layers: layers.into_iter().map(LayerResponse::from).collect(),
        total,
        limit,
        offset,
    }))
}

/// Get a layer by id
#[utoipa::path(
    get,
    path = "/api/v0/layers/{id}",
    params(
        ("id" = Uuid, Path, description = "Layer ID")
    ),
    responses(
        (status = 200, description = "Layer details", body = LayerResponse),
        (status = 404, description = "Layer not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "layers"
)]
#[tracing::instrument(skip(state))]
pub async fn get_layer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let layer = state
        .db
        .layer_repository
        .get(id)
        .await?
        .ok_or_else(|| layer_not_found(id))?;

    Ok(Json(LayerResponse::from(layer)))
}

/// Update a layer's status, name, upload type or recorded progress
#[utoipa::path(
    patch,
    path = "/api/v0/layers/{id}",
    params(
        ("id" = Uuid, Path, description = "Layer ID")
    ),
    request_body = UpdateLayerRequest,
    responses(
        (status = 200, description = "Layer updated", body = LayerResponse),
        (status = 400, description = "Invalid request - validation failed", body = ErrorResponse),
        (status = 404, description = "Layer not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "layers"
)]
#[tracing::instrument(skip(state, request))]
pub async fn update_layer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateLayerRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;

    // The stored row is checked inside the update itself; this only catches a body
    // that contradicts itself
    if let (Some(total_size), Some(current_offset)) = (request.total_size, request.current_offset) {
        validate_progress(total_size, current_offset).map_err(AppError::InvalidInput)?;
    }

    let layer = state
        .db
        .layer_repository
        .update(id, request.into_changes())
        .await?
        .ok_or_else(|| layer_not_found(id))?;

    tracing::debug!(
        layer_id = %layer.id,
        status = %layer.status,
        current_offset = layer.current_offset,
        total_size = layer.total_size,
        "Layer updated"
    );

    Ok(Json(LayerResponse::from(layer)))
}

/// Delete a layer record
#[utoipa::path(
    delete,
    path = "/api/v0/layers/{id}",
    params(
        ("id" = Uuid, Path, description = "Layer ID")
    ),
    responses(
        (status = 204, description = "Layer deleted"),
        (status = 404, description = "Layer not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "layers"
)]
#[tracing::instrument(skip(state))]
pub async fn delete_layer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    if !state.db.layer_repository.delete(id).await? {
        return Err(layer_not_found(id));
    }

    tracing::info!(layer_id = %id, "Layer deleted");
    Ok(StatusCode::NO_CONTENT)
}
