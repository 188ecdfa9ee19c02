//! URL check request/response

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::logic::threat::DecisionResult;

/// Longest URL accepted at the boundary
pub const MAX_URL_LENGTH: u64 = 2048;

/// Check URL request
#[derive(Debug, Deserialize, Validate)]
pub struct CheckUrlRequest {
    #[validate(length(min = 1, max = MAX_URL_LENGTH), custom(function = "not_blank"))]
    pub url: String,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("url must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Wire shape of a decision
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckUrlResponse {
    pub result: String,
    #[serde(rename = "usedMLModel")]
    pub used_ml_model: bool,
    pub is_zero_day: bool,
    pub model_version: Option<String>,
    pub confidence_score: Option<f64>,
    pub detection_source: String,
}

impl From<&DecisionResult> for CheckUrlResponse {
    fn from(decision: &DecisionResult) -> Self {
        Self {
            result: decision.label().as_str().to_string(),
            used_ml_model: decision.used_model(),
            is_zero_day: decision.is_zero_day(),
            model_version: decision.model_version().map(String::from),
            confidence_score: decision.confidence_score(),
            detection_source: decision.detection_source().display_name().to_string(),
        }
    }
}
