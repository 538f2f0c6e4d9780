//! Harvest Inference Engine
//!
//! Loads the trained preprocessor and regressor once, exposes them through
//! the `ModelStore` seam, and runs the full readings-to-prediction pipeline.

mod artifact;
mod engine;
mod predictor;
mod store;

pub use artifact::{ArtifactModelStore, DecisionTree, ModelArtifact, Regressor, StandardScaler};
pub use engine::InferenceEngine;
pub use predictor::{HarvestPrediction, HarvestPredictor, PredictError, PredictorConfig};
pub use store::ModelStore;

use thiserror::Error;

/// Errors during model loading and inference
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Artifacts are not loaded; the adapter never substitutes a default
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),
    #[error("Model artifact could not be read: {0}")]
    ArtifactIo(#[from] std::io::Error),
    #[error("Model artifact is malformed: {0}")]
    ArtifactFormat(String),
    /// Aligned input does not fit the model; schema drift between the aligner and the store
    #[error("Invalid model input: expected {expected}, got {actual}")]
    ModelInput { expected: String, actual: String },
    #[error("Model returned no usable prediction: {0}")]
    InvalidOutput(String),
}

impl From<serde_json::Error> for InferenceError {
    fn from(e: serde_json::Error) -> Self {
        InferenceError::ArtifactFormat(e.to_string())
    }
}
