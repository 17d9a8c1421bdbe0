//! Health check handlers.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use intens_media::check_gifsicle;

use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness check endpoint.
///
/// The service cannot produce anything without its encoder, so readiness
/// reports whether gifsicle is reachable.
pub async fn ready(State(state): State<AppState>) -> Json<serde_json::Value> {
    let gifsicle = match &state.config.gifsicle_path {
        Some(path) => path.exists(),
        None => check_gifsicle().is_ok(),
    };
    Json(serde_json::json!({
        "status": if gifsicle { "ready" } else { "degraded" },
        "gifsicle": gifsicle,
    }))
}
