//! Heuristic Rules & Thresholds
//!
//! The fallback tier: a versioned, data-driven rule set evaluated over the
//! `FeatureVector`. Each rule compares one named feature against a constant
//! and contributes its weight when it fires. Rule sets can be shipped as
//! JSON and swapped without code changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::logic::features::{layout, FeatureVector};

use super::error::EngineError;
use super::types::Verdict;

// ============================================================================
// THRESHOLDS
// ============================================================================

/// Version tag of the built-in rule set
pub const HEURISTIC_VERSION: &str = "heuristic-v1";

/// At or above this score = Phishing
pub const PHISHING_SCORE_THRESHOLD: f32 = 0.5;

/// URLs longer than this are unusual for legitimate landing pages
pub const LONG_URL_THRESHOLD: f32 = 75.0;

/// Host entropy typical of generated domains
pub const HIGH_ENTROPY_THRESHOLD: f32 = 4.0;

// ============================================================================
// RULE DEFINITIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparison {
    Gt,
    Ge,
    Eq,
    Lt,
    Le,
}

impl Comparison {
    pub fn holds(&self, actual: f32, expected: f32) -> bool {
        match self {
            Comparison::Gt => actual > expected,
            Comparison::Ge => actual >= expected,
            Comparison::Eq => (actual - expected).abs() < f32::EPSILON,
            Comparison::Lt => actual < expected,
            Comparison::Le => actual <= expected,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeuristicRule {
    pub id: String,
    pub description: String,
    /// Name from the feature layout
    pub feature: String,
    pub op: Comparison,
    pub value: f32,
    pub weight: f32,
}

impl HeuristicRule {
    fn new(id: &str, description: &str, feature: &str, op: Comparison, value: f32, weight: f32) -> Self {
        Self {
            id: id.to_string(),
            description: description.to_string(),
            feature: feature.to_string(),
            op,
            value,
            weight,
        }
    }
}

/// Outcome of evaluating a rule set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeuristicVerdict {
    pub label: Verdict,
    pub score: f32,
    pub matched: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeuristicRuleSet {
    pub version: String,
    #[serde(default = "default_threshold")]
    pub threshold: f32,
    pub rules: Vec<HeuristicRule>,
}

fn default_threshold() -> f32 {
    PHISHING_SCORE_THRESHOLD
}

impl Default for HeuristicRuleSet {
    fn default() -> Self {
        use Comparison::*;

        Self {
            version: HEURISTIC_VERSION.to_string(),
            threshold: PHISHING_SCORE_THRESHOLD,
            rules: vec![
                HeuristicRule::new("suspicious_keywords", "Two or more lure keywords", "suspicious_keyword_count", Ge, 2.0, 0.5),
                HeuristicRule::new("single_keyword", "At least one lure keyword", "suspicious_keyword_count", Ge, 1.0, 0.2),
                HeuristicRule::new("ip_host", "Host is a raw IP address", "is_ip_host", Eq, 1.0, 0.6),
                HeuristicRule::new("at_symbol", "'@' can hide the real host", "has_at_symbol", Eq, 1.0, 0.5),
                HeuristicRule::new("hyphenated_host", "Host with two or more hyphens", "hyphen_count", Ge, 2.0, 0.2),
                HeuristicRule::new("deep_subdomains", "Three or more subdomain levels", "subdomain_count", Ge, 3.0, 0.3),
                HeuristicRule::new("long_url", "Unusually long URL", "url_length", Gt, LONG_URL_THRESHOLD, 0.2),
                HeuristicRule::new("digits_in_url", "Five or more digits", "digit_count", Ge, 5.0, 0.1),
                HeuristicRule::new("plain_http", "No TLS", "uses_https", Eq, 0.0, 0.1),
                HeuristicRule::new("high_host_entropy", "Random-looking host", "host_entropy", Gt, HIGH_ENTROPY_THRESHOLD, 0.2),
            ],
        }
    }
}

impl HeuristicRuleSet {
    /// Load and validate a rule set from JSON
    pub fn from_file(path: &Path) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::RuleFile(format!("{}: {}", path.display(), e)))?;

        let rules: Self = serde_json::from_str(&content)
            .map_err(|e| EngineError::RuleFile(format!("{}: {}", path.display(), e)))?;

        rules.validate()?;
        Ok(rules)
    }

    /// A usable rule set has rules, known features and sane numbers
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.rules.is_empty() {
            return Err(EngineError::NoHeuristicRules);
        }

        for rule in &self.rules {
            if layout::feature_index(&rule.feature).is_none() {
                return Err(EngineError::UnknownFeature {
                    rule: rule.id.clone(),
                    feature: rule.feature.clone(),
                });
            }
            if !rule.value.is_finite() || !rule.weight.is_finite() {
                return Err(EngineError::InvalidRuleSet(format!("rule '{}' has non-finite numbers", rule.id)));
            }
        }

        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(EngineError::InvalidRuleSet(format!("threshold {} must be positive", self.threshold)));
        }

        Ok(())
    }

    /// Deterministic evaluation. Errors only for a misconfigured set.
    pub fn evaluate(&self, vector: &FeatureVector) -> Result<HeuristicVerdict, EngineError> {
        if self.rules.is_empty() {
            return Err(EngineError::NoHeuristicRules);
        }

        let mut score = 0.0f32;
        let mut matched = Vec::new();

        for rule in &self.rules {
            let actual = vector.get_by_name(&rule.feature).ok_or_else(|| EngineError::UnknownFeature {
                rule: rule.id.clone(),
                feature: rule.feature.clone(),
            })?;

            if rule.op.holds(actual, rule.value) {
                score += rule.weight;
                matched.push(rule.id.clone());
            }
        }

        let label = if score >= self.threshold {
            Verdict::Phishing
        } else {
            Verdict::Legitimate
        };

        Ok(HeuristicVerdict { label, score, matched })
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::extract;

    #[test]
    fn test_default_rules_are_valid() {
        let rules = HeuristicRuleSet::default();
        assert!(rules.validate().is_ok());
        assert_eq!(rules.version, HEURISTIC_VERSION);
    }

    #[test]
    fn test_suspicious_domain_is_phishing() {
        let verdict = HeuristicRuleSet::default()
            .evaluate(&extract("http://phish-bank-login.com"))
            .unwrap();

        assert_eq!(verdict.label, Verdict::Phishing);
        assert!(verdict.matched.contains(&"suspicious_keywords".to_string()));
        assert!(verdict.matched.contains(&"hyphenated_host".to_string()));
        assert!(verdict.score >= PHISHING_SCORE_THRESHOLD);
    }

    #[test]
    fn test_plain_domain_is_legitimate() {
        let verdict = HeuristicRuleSet::default().evaluate(&extract("https://example.com")).unwrap();
        assert_eq!(verdict.label, Verdict::Legitimate);
        assert!(verdict.matched.is_empty());
        assert_eq!(verdict.score, 0.0);
    }

    #[test]
    fn test_ip_host_alone_is_phishing() {
        let mut vector = FeatureVector::new();
        vector.set_by_name("is_ip_host", 1.0);
        vector.set_by_name("uses_https", 1.0);
        let verdict = HeuristicRuleSet::default().evaluate(&vector).unwrap();
        assert_eq!(verdict.label, Verdict::Phishing);
        assert_eq!(verdict.matched, vec!["ip_host".to_string()]);
    }

    #[test]
    fn test_empty_rule_set_is_fatal() {
        let rules = HeuristicRuleSet {
            version: "empty".into(),
            threshold: 0.5,
            rules: vec![],
        };
        assert!(matches!(rules.validate(), Err(EngineError::NoHeuristicRules)));
        assert!(matches!(rules.evaluate(&FeatureVector::new()), Err(EngineError::NoHeuristicRules)));
    }

    #[test]
    fn test_unknown_feature_is_rejected() {
        let mut rules = HeuristicRuleSet::default();
        rules.rules[0].feature = "tld_rank".into();
        assert!(matches!(rules.validate(), Err(EngineError::UnknownFeature { .. })));
    }

    #[test]
    fn test_rules_from_json_file() {
        let json = serde_json::json!({
            "version": "custom-7",
            "rules": [{
                "id": "long", "description": "long url", "feature": "url_length",
                "op": "gt", "value": 10.0, "weight": 1.0
            }]
        });
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), json.to_string()).unwrap();

        let rules = HeuristicRuleSet::from_file(file.path()).unwrap();
        assert_eq!(rules.version, "custom-7");
        assert_eq!(rules.threshold, PHISHING_SCORE_THRESHOLD);
        assert_eq!(rules.evaluate(&extract("https://example.com")).unwrap().label, Verdict::Phishing);
    }

    #[test]
    fn test_comparisons() {
        assert!(Comparison::Gt.holds(2.0, 1.0));
        assert!(!Comparison::Gt.holds(1.0, 1.0));
        assert!(Comparison::Ge.holds(1.0, 1.0));
        assert!(Comparison::Eq.holds(0.0, 0.0));
        assert!(Comparison::Lt.holds(0.5, 1.0));
        assert!(Comparison::Le.holds(1.0, 1.0));
    }
}
