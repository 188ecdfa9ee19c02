//! Engine counters

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::logic::model::InferenceError;

use super::types::DecisionResult;

#[derive(Debug, Default)]
pub struct EngineStats {
    total: AtomicU64,
    model_decisions: AtomicU64,
    heuristic_decisions: AtomicU64,
    phishing_verdicts: AtomicU64,
    zero_day_verdicts: AtomicU64,
    fallback_no_model: AtomicU64,
    fallback_inference_error: AtomicU64,
    fallback_timeout: AtomicU64,
    latency_sum_us: AtomicU64,
}

/// Snapshot for the status endpoint
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct EngineStatsSnapshot {
    pub total: u64,
    pub model_decisions: u64,
    pub heuristic_decisions: u64,
    pub phishing_verdicts: u64,
    pub zero_day_verdicts: u64,
    pub fallback_no_model: u64,
    pub fallback_inference_error: u64,
    pub fallback_timeout: u64,
    pub avg_latency_ms: f64,
}

impl EngineStats {
    pub fn record_decision(&self, result: &DecisionResult) {
        self.total.fetch_add(1, Ordering::Relaxed);
        self.latency_sum_us.fetch_add(result.latency_us(), Ordering::Relaxed);

        if result.used_model() {
            self.model_decisions.fetch_add(1, Ordering::Relaxed);
        } else {
            self.heuristic_decisions.fetch_add(1, Ordering::Relaxed);
        }
        if result.label().is_phishing() {
            self.phishing_verdicts.fetch_add(1, Ordering::Relaxed);
        }
        if result.is_zero_day() {
            self.zero_day_verdicts.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_fallback(&self, error: &InferenceError) {
        let counter = match error.reason() {
            "no_model" => &self.fallback_no_model,
            "timeout" => &self.fallback_timeout,
            _ => &self.fallback_inference_error,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> EngineStatsSnapshot {
        let total = self.total.load(Ordering::Relaxed);
        let sum = self.latency_sum_us.load(Ordering::Relaxed);
        let avg = if total > 0 { (sum as f64 / total as f64) / 1000.0 } else { 0.0 };

        EngineStatsSnapshot {
            total,
            model_decisions: self.model_decisions.load(Ordering::Relaxed),
            heuristic_decisions: self.heuristic_decisions.load(Ordering::Relaxed),
            phishing_verdicts: self.phishing_verdicts.load(Ordering::Relaxed),
            zero_day_verdicts: self.zero_day_verdicts.load(Ordering::Relaxed),
            fallback_no_model: self.fallback_no_model.load(Ordering::Relaxed),
            fallback_inference_error: self.fallback_inference_error.load(Ordering::Relaxed),
            fallback_timeout: self.fallback_timeout.load(Ordering::Relaxed),
            avg_latency_ms: avg,
        }
    }
}
