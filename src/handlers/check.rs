//! URL check handler

use axum::{extract::{rejection::JsonRejection, State}, Json};
use validator::Validate;

use crate::models::{CheckUrlRequest, CheckUrlResponse};
use crate::{AppResult, AppState};

/// Classify a single URL
///
/// Malformed bodies are rejected before any classification work.
pub async fn check_url(
    State(state): State<AppState>,
    payload: Result<Json<CheckUrlRequest>, JsonRejection>,
) -> AppResult<Json<CheckUrlResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    let decision = state.engine.classify(&req.url).await?;
    Ok(Json(CheckUrlResponse::from(&decision)))
}
