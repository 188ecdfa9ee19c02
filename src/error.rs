//! Error handling

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::logic::external_intel::FeedError;
use crate::logic::model::{ModelLoadError, ModelNotFound};
use crate::logic::threat::EngineError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Auth errors
    Unauthorized,
    Forbidden,

    // Resource errors
    NotFound(String),
    Conflict(String),

    // Validation errors
    ValidationError(String),

    // Model errors
    ModelLoad(String),

    // External service errors
    ExternalServiceError(String),

    // Generic errors
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Access denied"),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.as_str()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.as_str()),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.as_str()),
            AppError::ModelLoad(msg) => {
                tracing::warn!("Model load rejected: {}", msg);
                (StatusCode::UNPROCESSABLE_ENTITY, msg.as_str())
            }
            AppError::ExternalServiceError(msg) => {
                tracing::error!("External service error: {}", msg);
                (StatusCode::BAD_GATEWAY, "External service error")
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::ValidationError(errors.to_string())
    }
}

impl From<ModelLoadError> for AppError {
    fn from(err: ModelLoadError) -> Self {
        match err {
            ModelLoadError::NoSource => AppError::NotFound(err.to_string()),
            other => AppError::ModelLoad(other.to_string()),
        }
    }
}

impl From<ModelNotFound> for AppError {
    fn from(err: ModelNotFound) -> Self {
        AppError::NotFound(err.to_string())
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        AppError::InternalError(err.to_string())
    }
}

impl From<FeedError> for AppError {
    fn from(err: FeedError) -> Self {
        match err {
            FeedError::SyncInProgress => AppError::Conflict(err.to_string()),
            other => AppError::ExternalServiceError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (AppError::ValidationError("bad".into()), StatusCode::BAD_REQUEST),
            (AppError::Unauthorized, StatusCode::UNAUTHORIZED),
            (AppError::Forbidden, StatusCode::FORBIDDEN),
            (AppError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (AppError::ModelLoad("corrupt".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::InternalError("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_engine_error_is_internal() {
        let err: AppError = EngineError::NoHeuristicRules.into();
        assert!(matches!(err, AppError::InternalError(_)));
    }

    #[test]
    fn test_missing_reload_source_is_not_found() {
        let err: AppError = ModelLoadError::NoSource.into();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
