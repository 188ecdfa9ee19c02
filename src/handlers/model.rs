//! Model management handlers

use std::sync::Arc;

use axum::{extract::{rejection::JsonRejection, State}, Json};
use validator::Validate;

use crate::logic::model::{ArtifactHandle, ModelLoadError, ModelMetadata};
use crate::models::{ActivateModelRequest, LoadModelRequest, ModelSwapResponse};
use crate::{AppError, AppResult, AppState};

/// Metadata of the current model
pub async fn current(State(state): State<AppState>) -> AppResult<Json<ModelMetadata>> {
    let artifact = state
        .engine
        .registry()
        .current()
        .ok_or_else(|| AppError::NotFound("No model loaded".to_string()))?;

    Ok(Json(artifact.metadata().clone()))
}

/// Reload the last loaded manifest, or the configured one
pub async fn reload(State(state): State<AppState>) -> AppResult<Json<ModelSwapResponse>> {
    let registry = Arc::clone(state.engine.registry());
    let fallback = state.config.model_path.clone();
    let schema_version = state.config.model_schema_version;

    let handle = run_blocking(move || registry.reload(fallback.as_deref(), schema_version)).await?;
    Ok(Json(handle.into()))
}

/// Load a manifest from an explicit path
pub async fn load(
    State(state): State<AppState>,
    payload: Result<Json<LoadModelRequest>, JsonRejection>,
) -> AppResult<Json<ModelSwapResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    let schema_version = req.schema_version.unwrap_or(state.config.model_schema_version);
    let registry = Arc::clone(state.engine.registry());

    let path = req.path();

    let handle = run_blocking(move || registry.load(path, schema_version)).await?;
    Ok(Json(handle.into()))
}

/// Switch to an already loaded version
pub async fn activate(
    State(state): State<AppState>,
    payload: Result<Json<ActivateModelRequest>, JsonRejection>,
) -> AppResult<Json<ModelSwapResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    let handle = state.engine.registry().activate(&req.version)?;
    Ok(Json(handle.into()))
}

/// File I/O and session construction stay off the async workers
async fn run_blocking<F>(task: F) -> AppResult<ArtifactHandle>
where
    F: FnOnce() -> Result<ArtifactHandle, ModelLoadError> + Send + 'static,
{
    let handle = tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| AppError::InternalError(format!("model load task failed: {}", e)))??;

    Ok(handle)
}
