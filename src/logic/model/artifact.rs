//! Model Artifact - manifest, metadata and the classifier seam
//!
//! A model is described by a JSON manifest. Loading validates the manifest
//! against the current feature layout before anything is built, so an
//! artifact that exists is always usable with `FeatureVector`s produced by
//! this build.

use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::logic::features::{layout_hash, FeatureVector, FEATURE_COUNT, FEATURE_VERSION};
use crate::logic::threat::Verdict;

use super::error::{InferenceError, ModelLoadError};
use super::inference::OnnxClassifier;
use super::linear::LinearClassifier;

/// Default phishing-probability cut-off
pub const DEFAULT_THRESHOLD: f32 = 0.5;

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Trait for classifier backends (linear, ONNX, ...)
pub trait Classifier: Send + Sync {
    /// Short backend name for status output
    fn kind(&self) -> &'static str;

    /// Probability that the (normalized) input is phishing. Backends that
    /// wait on shared state must give up with `Timeout` at `deadline`.
    fn predict_proba(&self, features: &[f32; FEATURE_COUNT], deadline: Instant) -> Result<f32, InferenceError>;
}

// ============================================================================
// MANIFEST
// ============================================================================

/// On-disk model description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelManifest {
    pub version: String,
    pub schema_version: u8,
    pub feature_count: usize,
    #[serde(default)]
    pub layout_hash: Option<u32>,
    #[serde(default)]
    pub trained_at: Option<NaiveDate>,
    #[serde(default = "default_threshold")]
    pub threshold: f32,
    #[serde(default)]
    pub normalization: Option<NormalizationParams>,
    pub model: ModelSpec,
}

fn default_threshold() -> f32 {
    DEFAULT_THRESHOLD
}

/// Backend-specific payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ModelSpec {
    /// Logistic regression: sigmoid(w·x + b)
    Linear { weights: Vec<f32>, bias: f32 },
    /// ONNX graph, path relative to the manifest
    Onnx {
        path: PathBuf,
        #[serde(default)]
        sha256: Option<String>,
    },
}

/// Min/max scaling parameters from training
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizationParams {
    pub min_vals: Vec<f32>,
    pub max_vals: Vec<f32>,
}

impl NormalizationParams {
    pub fn apply(&self, features: &[f32; FEATURE_COUNT]) -> [f32; FEATURE_COUNT] {
        let mut normalized = [0.0f32; FEATURE_COUNT];

        for i in 0..FEATURE_COUNT {
            let min_val = self.min_vals[i];
            let max_val = self.max_vals[i];
            let range = (max_val - min_val).max(1e-8);

            normalized[i] = ((features[i] - min_val) / range).clamp(0.0, 1.0);
        }

        normalized
    }
}

impl ModelManifest {
    /// Check the manifest against the requested and the compiled-in schema
    pub fn validate(&self, schema_version: u8) -> Result<(), ModelLoadError> {
        if self.version.trim().is_empty() {
            return Err(ModelLoadError::SchemaMismatch("model version is empty".into()));
        }

        if self.schema_version != schema_version {
            return Err(ModelLoadError::SchemaMismatch(format!(
                "manifest declares schema v{}, v{} was requested",
                self.schema_version, schema_version
            )));
        }

        if schema_version != FEATURE_VERSION {
            return Err(ModelLoadError::SchemaMismatch(format!(
                "requested schema v{} but extractor produces v{}",
                schema_version, FEATURE_VERSION
            )));
        }

        if self.feature_count != FEATURE_COUNT {
            return Err(ModelLoadError::SchemaMismatch(format!(
                "model expects {} features, extractor produces {}",
                self.feature_count, FEATURE_COUNT
            )));
        }

        if let Some(hash) = self.layout_hash {
            if hash != layout_hash() {
                return Err(ModelLoadError::SchemaMismatch(format!(
                    "layout hash {:08x} does not match {:08x}",
                    hash,
                    layout_hash()
                )));
            }
        }

        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return Err(ModelLoadError::SchemaMismatch(format!(
                "threshold {} outside (0, 1)",
                self.threshold
            )));
        }

        if let Some(norm) = &self.normalization {
            if norm.min_vals.len() != FEATURE_COUNT || norm.max_vals.len() != FEATURE_COUNT {
                return Err(ModelLoadError::SchemaMismatch(
                    "normalization arity does not match feature count".into(),
                ));
            }
        }

        if let ModelSpec::Linear { weights, bias } = &self.model {
            if weights.len() != self.feature_count {
                return Err(ModelLoadError::SchemaMismatch(format!(
                    "{} weights for {} features",
                    weights.len(),
                    self.feature_count
                )));
            }
            if !bias.is_finite() || weights.iter().any(|w| !w.is_finite()) {
                return Err(ModelLoadError::SchemaMismatch("non-finite weights".into()));
            }
        }

        Ok(())
    }
}

// ============================================================================
// METADATA
// ============================================================================

/// Descriptive metadata of a loaded artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub version: String,
    pub kind: String,
    pub schema_version: u8,
    pub layout_hash: u32,
    pub trained_at: Option<NaiveDate>,
    pub source_path: String,
    pub checksum: String,
    pub threshold: f32,
    pub loaded_at: DateTime<Utc>,
}

/// Returned by `ModelRegistry::load`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtifactHandle {
    pub version: String,
    pub checksum: String,
    pub loaded_at: DateTime<Utc>,
}

/// Model output after calibration
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Prediction {
    pub label: Verdict,
    /// Probability of `label`, in percent [0, 100]
    pub confidence: f64,
}

// ============================================================================
// ARTIFACT
// ============================================================================

/// A validated, immutable classifier
pub struct ModelArtifact {
    metadata: ModelMetadata,
    normalization: Option<NormalizationParams>,
    classifier: Box<dyn Classifier>,
}

impl std::fmt::Debug for ModelArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelArtifact")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl ModelArtifact {
    /// Wrap an already-built classifier
    pub fn new(
        metadata: ModelMetadata,
        normalization: Option<NormalizationParams>,
        classifier: Box<dyn Classifier>,
    ) -> Self {
        Self { metadata, normalization, classifier }
    }

    /// Read, validate and build an artifact from a manifest path
    pub fn load(path: &Path, schema_version: u8) -> Result<Self, ModelLoadError> {
        let bytes = std::fs::read(path).map_err(|source| ModelLoadError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let manifest: ModelManifest = serde_json::from_slice(&bytes).map_err(|source| {
            ModelLoadError::Parse {
                path: path.display().to_string(),
                source,
            }
        })?;

        manifest.validate(schema_version)?;

        let mut hasher = Sha256::new();
        hasher.update(&bytes);

        let classifier: Box<dyn Classifier> = match &manifest.model {
            ModelSpec::Linear { weights, bias } => {
                Box::new(LinearClassifier::new(weights.clone(), *bias))
            }
            ModelSpec::Onnx { path: model_path, sha256 } => {
                let model_path = path
                    .parent()
                    .map(|dir| dir.join(model_path))
                    .unwrap_or_else(|| model_path.clone());

                let model_bytes = std::fs::read(&model_path).map_err(|source| ModelLoadError::Io {
                    path: model_path.display().to_string(),
                    source,
                })?;

                let actual = hex::encode(Sha256::digest(&model_bytes));
                if let Some(expected) = sha256 {
                    if !expected.eq_ignore_ascii_case(&actual) {
                        return Err(ModelLoadError::Checksum {
                            path: model_path.display().to_string(),
                            expected: expected.clone(),
                            actual,
                        });
                    }
                }
                hasher.update(&model_bytes);

                Box::new(OnnxClassifier::from_bytes(&model_bytes)?)
            }
        };

        let metadata = ModelMetadata {
            version: manifest.version.clone(),
            kind: classifier.kind().to_string(),
            schema_version: manifest.schema_version,
            layout_hash: layout_hash(),
            trained_at: manifest.trained_at,
            source_path: path.display().to_string(),
            checksum: hex::encode(hasher.finalize()),
            threshold: manifest.threshold,
            loaded_at: Utc::now(),
        };

        Ok(Self::new(metadata, manifest.normalization, classifier))
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn version(&self) -> &str {
        &self.metadata.version
    }

    pub fn handle(&self) -> ArtifactHandle {
        ArtifactHandle {
            version: self.metadata.version.clone(),
            checksum: self.metadata.checksum.clone(),
            loaded_at: self.metadata.loaded_at,
        }
    }

    /// Run the classifier and calibrate its output. Work that starts after
    /// `deadline` is skipped.
    pub fn predict(&self, vector: &FeatureVector, deadline: Instant) -> Result<Prediction, InferenceError> {
        vector.validate().map_err(|e| InferenceError::LayoutMismatch {
            expected_version: e.expected_version,
            actual_version: e.actual_version,
        })?;

        if Instant::now() >= deadline {
            return Err(InferenceError::Timeout);
        }

        let input = match &self.normalization {
            Some(norm) => norm.apply(vector.as_array()),
            None => *vector.as_array(),
        };

        let p = self.classifier.predict_proba(&input, deadline)?;
        if !p.is_finite() || !(0.0..=1.0).contains(&p) {
            return Err(InferenceError::InvalidOutput(format!("probability {} outside [0, 1]", p)));
        }

        let p = f64::from(p);
        let (label, probability) = if p >= f64::from(self.metadata.threshold) {
            (Verdict::Phishing, p)
        } else {
            (Verdict::Legitimate, 1.0 - p)
        };

        Ok(Prediction {
            label,
            confidence: round2(probability * 100.0),
        })
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ============================================================================
// TESTS
// ============================================================================
