// src/handlers/health.rs

use axum::{http::StatusCode, response::IntoResponse};

/// GET /api/health - Liveness probe
#[utoipa::path(get, path = "/api/health", tag = "health", responses((status = 200, description = "Service is up")))]
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
