//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`; any `AppError` converts
//! with `?` and renders as a JSON `ErrorResponse` with the status from `ErrorMetadata`.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gridwalk_core::{AppError, ErrorMetadata, LogLevel};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::OnceLock;
use utoipa::ToSchema;

// Set once at startup from `Config::is_production`; unset means development.
static PRODUCTION: OnceLock<bool> = OnceLock::new();

/// Record whether error responses run in production mode. Only the first call takes effect.
pub fn init_error_mode(production: bool) {
    if PRODUCTION.set(production).is_err() {
        tracing::debug!("Error response mode already set");
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper so `IntoResponse` can be implemented for the core `AppError`
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<validator::ValidationErrors> for HttpAppError {
    fn from(err: validator::ValidationErrors) -> Self {
        HttpAppError(AppError::from(err))
    }
}

/// Convert JSON body deserialization failures into a 400 with our ErrorResponse format.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        let body_text = rejection.body_text();
        let message = if body_text.contains("expected a formatted UUID") {
            "Invalid request body: id must be a UUID string".to_string()
        } else {
            format!("Invalid request body: {}", body_text)
        };
        HttpAppError(AppError::InvalidInput(message))
    }
}

impl From<QueryRejection> for HttpAppError {
    fn from(rejection: QueryRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid query parameters: {}",
            rejection.body_text()
        )))
    }
}

/// JSON body extractor that returns our ErrorResponse format (400 + JSON) on deserialization failure.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

/// Details are hidden in production and for sensitive errors
fn include_details(app_error: &AppError, production: bool) -> bool {
    !production && !app_error.is_sensitive()
}

fn error_response(app_error: &AppError, include_details: bool) -> ErrorResponse {
    ErrorResponse {
        error: app_error.client_message(),
        details: include_details.then(|| app_error.detailed_message()),
        error_type: include_details.then(|| app_error.error_type().to_string()),
        code: app_error.error_code().to_string(),
        recoverable: app_error.is_recoverable(),
        suggested_action: app_error.suggested_action().map(String::from),
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        let production = PRODUCTION.get().copied().unwrap_or(false);
        let details = include_details(app_error, production);
        (status, Json(error_response(app_error, details))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_maps_to_409() {
        let response =
            HttpAppError::from(AppError::Conflict("duplicate key".to_string())).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_validation_errors_map_to_invalid_input() {
        let mut errors = validator::ValidationErrors::new();
        errors.add("name", validator::ValidationError::new("length"));
        let HttpAppError(app_err) = errors.into();
        match app_err {
            AppError::InvalidInput(msg) => assert!(msg.contains("name")),
            _ => panic!("Expected InvalidInput variant"),
        }
    }

    #[test]
    fn test_sensitive_errors_hide_details() {
        let err = AppError::from(anyhow::anyhow!("connection string leaked"));
        let body = error_response(&err, false);
        assert_eq!(body.error, "Internal server error");
        assert!(body.details.is_none());
        assert_eq!(body.code, "INTERNAL_ERROR");
    }

    #[test]
    fn test_details_hidden_in_production() {
        let not_found = AppError::NotFound("Layer not found".to_string());
        assert!(include_details(&not_found, false));
        assert!(!include_details(&not_found, true));

        let internal = AppError::from(anyhow::anyhow!("pool exhausted"));
        assert!(!include_details(&internal, false));
    }

    /// Verifies the public error response contract: serialized ErrorResponse has "error",
    /// "code", "recoverable", and optionally "details" / "error_type" / "suggested_action".
    #[test]
    fn test_error_response_shape() {
        let body = error_response(&AppError::NotFound("Layer not found".to_string()), true);
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json["error"], "Layer not found");
        assert_eq!(json["code"], "NOT_FOUND");
        assert_eq!(json["recoverable"], false);
        assert_eq!(json["error_type"], "NotFound");
        assert!(json.get("suggested_action").and_then(|v| v.as_str()).is_some());
    }
}
