//! Liveness and readiness probes

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::warn;

use crate::response::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub name: String,
    pub version: &'static str,
}

impl HealthStatus {
    fn new(state: &AppState, status: &'static str) -> Self {
        Self {
            status,
            name: state.config.app.name.clone(),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthStatus>> {
    Json(ApiResponse::success(HealthStatus::new(&state, "ok")))
}

/// GET /health/ready - reports 503 while storage is unreachable
pub async fn readiness(
    State(state): State<AppState>,
) -> (StatusCode, Json<ApiResponse<HealthStatus>>) {
    match state.service.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse::success(HealthStatus::new(&state, "ready"))),
        ),
        Err(e) => {
            warn!("Readiness check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse::error("STORAGE_UNAVAILABLE", "Storage is unavailable")),
            )
        }
    }
}
