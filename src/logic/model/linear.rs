//! Linear (logistic regression) classifier

use std::time::Instant;

use crate::logic::features::FEATURE_COUNT;

use super::artifact::Classifier;
use super::error::InferenceError;

#[derive(Debug, Clone)]
pub struct LinearClassifier {
    weights: Vec<f32>,
    bias: f32,
}

impl LinearClassifier {
    /// `weights.len()` is checked against the layout by manifest validation
    pub fn new(weights: Vec<f32>, bias: f32) -> Self {
        Self { weights, bias }
    }
}

impl Classifier for LinearClassifier {
    fn kind(&self) -> &'static str {
        "linear"
    }

    fn predict_proba(&self, features: &[f32; FEATURE_COUNT], _deadline: Instant) -> Result<f32, InferenceError> {
        if self.weights.len() != FEATURE_COUNT {
            return Err(InferenceError::Runtime(format!(
                "{} weights for {} features",
                self.weights.len(),
                FEATURE_COUNT
            )));
        }

        let z: f32 = self.weights.iter()
            .zip(features.iter())
            .map(|(w, x)| w * x)
            .sum::<f32>() + self.bias;

        Ok(1.0 / (1.0 + (-z).exp()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn later() -> Instant {
        Instant::now() + Duration::from_secs(5)
    }

    #[test]
    fn test_sigmoid_output() {
        let model = LinearClassifier::new(vec![0.0; FEATURE_COUNT], 0.0);
        assert_eq!(model.predict_proba(&[1.0; FEATURE_COUNT], later()).unwrap(), 0.5);

        let mut weights = vec![0.0; FEATURE_COUNT];
        weights[0] = 10.0;
        let model = LinearClassifier::new(weights, -5.0);
        assert!(model.predict_proba(&[1.0; FEATURE_COUNT], later()).unwrap() > 0.99);
        assert!(model.predict_proba(&[0.0; FEATURE_COUNT], later()).unwrap() < 0.01);
    }

    #[test]
    fn test_wrong_arity_is_runtime_error() {
        let model = LinearClassifier::new(vec![1.0; 3], 0.0);
        assert!(model.predict_proba(&[0.0; FEATURE_COUNT], later()).is_err());
    }
}
