//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use gridwalk_core::models;

/// The OpenAPI document served at `/api/openapi.json`.
pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Gridwalk API",
        version = "0.1.0",
        description = "Layer registry for geospatial uploads. Tracks each layer's status and upload progress. All endpoints are versioned under /api/v0/."
    ),
    paths(
        // Layers
        handlers::layers::create_layer,
        handlers::layers::list_layers,
        handlers::layers::get_layer,
        handlers::layers::update_layer,
        handlers::layers::delete_layer,
        // Sources
        handlers::sources::list_sources,
    ),
    components(
        schemas(
            models::LayerResponse,
            models::LayerListResponse,
            models::CreateLayerRequest,
            models::UpdateLayerRequest,
            handlers::layers::LayerListQuery,
            handlers::sources::SourceListResponse,
            // Error
            error::ErrorResponse,
        )
    ),
    tags(
        (name = "layers", description = "Layer registration and upload progress records"),
        (name = "sources", description = "Tables holding ingested layer data")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_layer_routes() {
        let spec = get_openapi_spec();
        assert!(spec.paths.paths.contains_key("/api/v0/layers"));
        assert!(spec.paths.paths.contains_key("/api/v0/layers/{id}"));
        assert!(spec.paths.paths.contains_key("/api/v0/sources"));
    }
}
