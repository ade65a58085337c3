use axum::{response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Server is running")
    ),
    tag = "health"
)]
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "success": true,
        "message": "Server is running",
        "timestamp": Utc::now(),
    }))
}
