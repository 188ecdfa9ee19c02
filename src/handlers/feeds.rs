//! Threat feed handlers

use axum::{extract::State, Json};

use crate::logic::external_intel::SyncResult;
use crate::{AppResult, AppState};

/// Pull every configured feed now
pub async fn sync(State(state): State<AppState>) -> AppResult<Json<SyncResult>> {
    let result = state.intel.sync_all().await?;
    tracing::info!(
        "Manual feed sync: {} sources, {} indicators",
        result.feeds_synced,
        result.total_indicators
    );
    Ok(Json(result))
}
