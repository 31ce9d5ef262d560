//! Health check endpoints for liveness and readiness probes.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::errors::ApiResponse;
use crate::AppState;

/// Readiness probe detail.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub database: String,
}

/// Liveness probe: OK whenever the process is serving requests.
pub async fn live() -> &'static str {
    "OK"
}

/// Readiness probe: 503 until the database answers.
pub async fn ready(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<HealthStatus>>) {
    match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => (
            StatusCode::OK,
            ApiResponse::success(HealthStatus {
                status: "ok".to_string(),
                database: "connected".to_string(),
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiResponse::success(HealthStatus {
                    status: "degraded".to_string(),
                    database: format!("error: {e}"),
                }),
            )
        }
    }
}
