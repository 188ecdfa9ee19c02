//! Engine errors. These are the only fatal classification failures.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("no heuristic rules loaded")]
    NoHeuristicRules,

    #[error("rule '{rule}' references unknown feature '{feature}'")]
    UnknownFeature { rule: String, feature: String },

    #[error("invalid rule set: {0}")]
    InvalidRuleSet(String),

    #[error("cannot read rule file {0}")]
    RuleFile(String),
}
