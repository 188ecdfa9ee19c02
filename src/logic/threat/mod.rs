//! Threat Module - classification decisions
//!
//! Model-first, heuristic-fallback engine plus the result types it emits.

pub mod engine;
pub mod error;
pub mod rules;
pub mod stats;
pub mod types;

// Re-export common types
pub use engine::{ClassificationEngine, DEFAULT_INFERENCE_TIMEOUT};
pub use error::EngineError;
pub use rules::{
    Comparison, HeuristicRule, HeuristicRuleSet, HeuristicVerdict, HEURISTIC_VERSION,
    PHISHING_SCORE_THRESHOLD,
};
pub use stats::{EngineStats, EngineStatsSnapshot};
pub use types::{DecisionResult, DetectionSource, Verdict};
