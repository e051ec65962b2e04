//! Health check handlers and response types.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);

/// Run an async check with timeout; returns status string "healthy", "timeout", or "{prefix}: {error}".
async fn run_check<F, E>(timeout: Duration, f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "healthy".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

#[derive(Serialize)]
pub(super) struct HealthCheckResponse {
    pub status: String,
    pub database: String,
    pub layer_schema: String,
    pub version: &'static str,
}

/// Liveness probe - process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Readiness probe - database reachable.
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let pool = state.db.pool.clone();
    let database = run_check(
        TIMEOUT,
        async move { sqlx::query("SELECT 1").execute(&pool).await.map(drop) },
        "not_ready",
    )
    .await;

    if database == "healthy" {
        (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "ready", "database": "ready" })),
        )
    } else {
        tracing::error!(database = %database, "Database readiness check failed");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "status": "not_ready", "database": database })),
        )
    }
}

/// Full health check: database and the layer data schema.
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let pool = state.db.pool.clone();
    let database = run_check(
        TIMEOUT,
        async move { sqlx::query("SELECT 1").execute(&pool).await.map(drop) },
        "unhealthy",
    )
    .await;

    let sources = state.db.source_repository.clone();
    let schema = state.config.layer_schema.clone();
    let layer_schema = run_check(
        TIMEOUT,
        async move {
            match sources.schema_exists(&schema).await {
                Ok(true) => Ok(()),
                Ok(false) => Err(format!("schema {} does not exist", schema)),
                Err(e) => Err(e.to_string()),
            }
        },
        "degraded",
    )
    .await;

    let healthy = database == "healthy";
    let response = HealthCheckResponse {
        status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
        database,
        layer_schema,
        version: env!("CARGO_PKG_VERSION"),
    };

    let status_code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_check_reports_outcomes() {
        let ok = run_check(Duration::from_secs(1), async { Ok::<(), String>(()) }, "bad").await;
        assert_eq!(ok, "healthy");

        let failed = run_check(
            Duration::from_secs(1),
            async { Err::<(), _>("refused".to_string()) },
            "unhealthy",
        )
        .await;
        assert_eq!(failed, "unhealthy: refused");

        let slow = run_check(
            Duration::from_millis(10),
            async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<(), String>(())
            },
            "bad",
        )
        .await;
        assert_eq!(slow, "timeout");
    }
}
