//! Model error types

use thiserror::Error;

/// Failure while loading or validating a model artifact
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid model manifest {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("checksum mismatch for {path}: expected {expected}, got {actual}")]
    Checksum {
        path: String,
        expected: String,
        actual: String,
    },

    #[error("model runtime error: {0}")]
    Runtime(String),

    #[error("no model source to reload from")]
    NoSource,
}

/// Lookup of a version the registry does not hold
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("model version '{0}' not found")]
pub struct ModelNotFound(pub String);

/// Failure while running a model. Always recovered by the heuristic tier.
#[derive(Debug, Clone, Error)]
pub enum InferenceError {
    #[error("no model loaded")]
    NoModel,

    #[error("feature layout v{actual_version} does not match model schema v{expected_version}")]
    LayoutMismatch {
        expected_version: u8,
        actual_version: u8,
    },

    #[error("inference failed: {0}")]
    Runtime(String),

    #[error("invalid model output: {0}")]
    InvalidOutput(String),

    #[error("inference deadline exceeded")]
    Timeout,
}

impl InferenceError {
    /// Label used in logs and fallback counters
    pub fn reason(&self) -> &'static str {
        match self {
            InferenceError::NoModel => "no_model",
            InferenceError::Timeout => "timeout",
            InferenceError::LayoutMismatch { .. }
            | InferenceError::Runtime(_)
            | InferenceError::InvalidOutput(_) => "inference_error",
        }
    }
}
