//! Status handler

use axum::{extract::State, Json};

use crate::logic::features::LayoutInfo;
use crate::models::StatusResponse;
use crate::AppState;

pub async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        environment: state.config.environment.clone(),
        engine: state.engine.stats(),
        registry: state.engine.registry().status(),
        feeds: state.intel.stats(),
        layout: LayoutInfo::current(),
        heuristic_rules: state.engine.rules_version().to_string(),
    })
}
