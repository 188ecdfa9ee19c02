//! Inference Engine - ONNX Runtime Integration
//!
//! Runs an exported classifier graph. Input is a `[1, FEATURE_COUNT]` f32
//! tensor. The first output is read as f32: two values are taken as
//! `[p_legitimate, p_phishing]`, a single value as `p_phishing`.

use std::time::Instant;

use ndarray::Array2;
use parking_lot::Mutex;
use ort::session::{Session, builder::GraphOptimizationLevel};
use ort::value::Value;

use crate::logic::features::FEATURE_COUNT;

use super::artifact::Classifier;
use super::error::{InferenceError, ModelLoadError};

/// ONNX-backed classifier. Sessions need `&mut` to run, hence the mutex.
/// Callers waiting on the mutex give up at their deadline.
pub struct OnnxClassifier {
    session: Mutex<Session>,
    output_name: String,
}

impl OnnxClassifier {
    /// Build a session from model bytes
    pub fn from_bytes(model_bytes: &[u8]) -> Result<Self, ModelLoadError> {
        tracing::info!("Loading ONNX model from memory ({} bytes)", model_bytes.len());

        let session = Session::builder()
            .map_err(|e| ModelLoadError::Runtime(format!("Session builder error: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| ModelLoadError::Runtime(format!("Optimization error: {}", e)))?
            .commit_from_memory(model_bytes)
            .map_err(|e| ModelLoadError::Runtime(format!("Load from memory error: {}", e)))?;

        let output_name = session.outputs.first()
            .map(|o| o.name.clone())
            .ok_or_else(|| ModelLoadError::Runtime("No output defined".to_string()))?;

        Ok(Self {
            session: Mutex::new(session),
            output_name,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn kind(&self) -> &'static str {
        "onnx"
    }

    fn predict_proba(&self, features: &[f32; FEATURE_COUNT], deadline: Instant) -> Result<f32, InferenceError> {
        let input_array = Array2::<f32>::from_shape_vec((1, FEATURE_COUNT), features.to_vec())
            .map_err(|e| InferenceError::Runtime(format!("Array error: {}", e)))?;

        let input_tensor = Value::from_array(input_array)
            .map_err(|e| InferenceError::Runtime(format!("Tensor error: {}", e)))?;

        let mut session = self.session
            .try_lock_until(deadline)
            .ok_or(InferenceError::Timeout)?;

        let outputs = session.run(ort::inputs![input_tensor])
            .map_err(|e| InferenceError::Runtime(format!("Inference failed: {}", e)))?;

        let output = outputs.get(&self.output_name)
            .ok_or_else(|| InferenceError::InvalidOutput("No output".to_string()))?;

        let output_tensor = output.try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::InvalidOutput(format!("Extract error: {}", e)))?;

        let data = output_tensor.1;

        match data.len() {
            1 => Ok(data[0]),
            2 => Ok(data[1]),
            n => Err(InferenceError::InvalidOutput(format!("expected 1 or 2 outputs, got {}", n))),
        }
    }
}
