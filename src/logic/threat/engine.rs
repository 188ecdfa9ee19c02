//! Classification Engine
//!
//! Tiered decision: model inference when a model is current, deterministic
//! heuristic rules otherwise. Inference failures of any kind (no model,
//! layout mismatch, runtime error, bad output, timeout, worker panic) are
//! absorbed here and never reach the caller. Only an unusable rule set is
//! an error.
//!
//! The inference timeout is a deadline carried into the blocking task, so a
//! call that was abandoned here stops waiting for the model as well.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::logic::external_intel::ThreatReference;
use crate::logic::features::{extract_parts, FeatureVector, UrlParts};
use crate::logic::model::{InferenceError, ModelRegistry, Prediction};

use super::error::EngineError;
use super::rules::HeuristicRuleSet;
use super::stats::{EngineStats, EngineStatsSnapshot};
use super::types::DecisionResult;

/// Default upper bound for one model call
pub const DEFAULT_INFERENCE_TIMEOUT: Duration = Duration::from_millis(250);

pub struct ClassificationEngine {
    registry: Arc<ModelRegistry>,
    rules: HeuristicRuleSet,
    intel: Arc<dyn ThreatReference>,
    inference_timeout: Duration,
    stats: EngineStats,
}

impl ClassificationEngine {
    /// Fails when the heuristic tier would be unusable
    pub fn new(
        registry: Arc<ModelRegistry>,
        rules: HeuristicRuleSet,
        intel: Arc<dyn ThreatReference>,
        inference_timeout: Duration,
    ) -> Result<Self, EngineError> {
        rules.validate()?;

        tracing::info!(
            "Classification engine ready: rules {} ({} rules), inference timeout {:?}",
            rules.version,
            rules.rules.len(),
            inference_timeout
        );

        Ok(Self {
            registry,
            rules,
            intel,
            inference_timeout,
            stats: EngineStats::default(),
        })
    }

    /// Classify one URL
    pub async fn classify(&self, url: &str) -> Result<DecisionResult, EngineError> {
        let start = Instant::now();

        let parts = UrlParts::parse(url);
        let vector = extract_parts(&parts);
        tracing::trace!("Features for {:?}: {}", url, vector.to_log_entry());

        let result = match self.infer(&vector).await {
            Ok((version, prediction)) => {
                let is_zero_day = self.is_zero_day(prediction.label.is_phishing(), url, &parts.host);
                DecisionResult::from_model(prediction.label, version, prediction.confidence, is_zero_day)
            }
            Err(e) => {
                if matches!(e, InferenceError::NoModel) {
                    tracing::debug!("No model loaded, using heuristic rules");
                } else {
                    tracing::warn!("Inference failed ({}), falling back to heuristic rules", e);
                }
                self.stats.record_fallback(&e);

                let verdict = self.rules.evaluate(&vector)?;
                let is_zero_day = self.is_zero_day(verdict.label.is_phishing(), url, &parts.host);
                DecisionResult::from_heuristic(verdict.label, is_zero_day, verdict.matched)
            }
        };

        let result = result.with_latency(start.elapsed().as_micros() as u64);
        self.stats.record_decision(&result);

        tracing::debug!(
            "Classified {:?} as {} via {} (zero-day: {}, rules: {:?})",
            url,
            result.label(),
            result.detection_source().as_str(),
            result.is_zero_day(),
            result.matched_rules()
        );

        Ok(result)
    }

    /// Run the current model on the blocking pool, bounded by the timeout
    async fn infer(&self, vector: &FeatureVector) -> Result<(String, Prediction), InferenceError> {
        let artifact = self.registry.current().ok_or(InferenceError::NoModel)?;
        let version = artifact.version().to_string();

        let deadline = Instant::now() + self.inference_timeout;
        let input = vector.clone();
        let task = tokio::task::spawn_blocking(move || artifact.predict(&input, deadline));

        match tokio::time::timeout_at(tokio::time::Instant::from_std(deadline), task).await {
            Err(_) => Err(InferenceError::Timeout),
            Ok(Err(join_err)) => Err(InferenceError::Runtime(format!("inference worker failed: {}", join_err))),
            Ok(Ok(prediction)) => prediction.map(|p| (version, p)),
        }
    }

    /// Zero-day = phishing and absent from the known-threat reference set
    fn is_zero_day(&self, is_phishing: bool, url: &str, host: &str) -> bool {
        is_phishing && !self.intel.is_known_threat(url, host)
    }

    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    pub fn rules_version(&self) -> &str {
        &self.rules.version
    }

    pub fn stats(&self) -> EngineStatsSnapshot {
        self.stats.snapshot()
    }
}

// ============================================================================
// TESTS
// ============================================================================
