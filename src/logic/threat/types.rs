//! Threat Types
//!
//! Core types for URL classification. No logic beyond construction.

use serde::{Deserialize, Serialize};

// ============================================================================
// VERDICT
// ============================================================================

/// Classification label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Phishing,
    Legitimate,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Phishing => "phishing",
            Verdict::Legitimate => "legitimate",
        }
    }

    pub fn is_phishing(&self) -> bool {
        matches!(self, Verdict::Phishing)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// DETECTION SOURCE
// ============================================================================

/// Which tier produced the verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionSource {
    MlModel,
    Heuristic,
}

impl DetectionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionSource::MlModel => "ml_model",
            DetectionSource::Heuristic => "heuristic",
        }
    }

    /// Label used on the public API
    pub fn display_name(&self) -> &'static str {
        match self {
            DetectionSource::MlModel => "ML Model",
            DetectionSource::Heuristic => "Heuristic Rules",
        }
    }
}

// ============================================================================
// DECISION RESULT
// ============================================================================

/// Terminal, immutable outcome of one classification.
///
/// Only constructible through `from_model` / `from_heuristic`, so a
/// heuristic result can never carry a model version or confidence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionResult {
    label: Verdict,
    used_model: bool,
    is_zero_day: bool,
    model_version: Option<String>,
    confidence_score: Option<f64>,
    detection_source: DetectionSource,
    matched_rules: Vec<String>,
    latency_us: u64,
}

impl DecisionResult {
    pub fn from_model(label: Verdict, model_version: String, confidence: f64, is_zero_day: bool) -> Self {
        Self {
            label,
            used_model: true,
            is_zero_day,
            model_version: Some(model_version),
            confidence_score: Some(confidence.clamp(0.0, 100.0)),
            detection_source: DetectionSource::MlModel,
            matched_rules: Vec::new(),
            latency_us: 0,
        }
    }

    pub fn from_heuristic(label: Verdict, is_zero_day: bool, matched_rules: Vec<String>) -> Self {
        Self {
            label,
            used_model: false,
            is_zero_day,
            model_version: None,
            confidence_score: None,
            detection_source: DetectionSource::Heuristic,
            matched_rules,
            latency_us: 0,
        }
    }

    pub(crate) fn with_latency(mut self, latency_us: u64) -> Self {
        self.latency_us = latency_us;
        self
    }

    pub fn label(&self) -> Verdict {
        self.label
    }

    pub fn used_model(&self) -> bool {
        self.used_model
    }

    pub fn is_zero_day(&self) -> bool {
        self.is_zero_day
    }

    pub fn model_version(&self) -> Option<&str> {
        self.model_version.as_deref()
    }

    pub fn confidence_score(&self) -> Option<f64> {
        self.confidence_score
    }

    pub fn detection_source(&self) -> DetectionSource {
        self.detection_source
    }

    /// Heuristic rule ids that fired; empty on the model path
    pub fn matched_rules(&self) -> &[String] {
        &self.matched_rules
    }

    pub fn latency_us(&self) -> u64 {
        self.latency_us
    }
}
