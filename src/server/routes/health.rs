use crate::server::router::PantryState;
use axum::{Json, Router, routing::get};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub message: &'static str,
}

/// GET /api/health
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "Pixel Pantry API running",
    })
}

pub fn router() -> Router<PantryState> {
    Router::new().route("/api/health", get(health_handler))
}
