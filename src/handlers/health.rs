//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    /// Tier new requests will be classified by
    mode: &'static str,
    timestamp: i64,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    let mode = if state.engine.registry().current().is_some() {
        "model"
    } else {
        "heuristic"
    };

    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        mode,
        timestamp: chrono::Utc::now().timestamp(),
    })
}
