//! Liveness endpoint.

use axum::Json;

use crate::models::HealthResponse;

/// `GET /health`: reports that the server is up.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".into(),
        message: "Server is running".into(),
    })
}
