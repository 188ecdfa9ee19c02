//! Model Module - classifier artifacts and their registry
//!
//! Keeps inference separate from classification policy so models can be
//! swapped at runtime without touching the engine.

pub mod artifact;
pub mod error;
pub mod inference;
pub mod linear;
pub mod registry;

// Re-export common types
pub use artifact::{
    ArtifactHandle, Classifier, ModelArtifact, ModelManifest, ModelMetadata, ModelSpec,
    NormalizationParams, Prediction, DEFAULT_THRESHOLD,
};
pub use error::{InferenceError, ModelLoadError, ModelNotFound};
pub use registry::{ModelRegistry, RegistryStatus};
