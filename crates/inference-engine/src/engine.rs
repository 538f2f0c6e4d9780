//! Prediction Adapter

use crate::artifact::ArtifactModelStore;
use crate::store::ModelStore;
use crate::InferenceError;
use feature_engine::AlignedMatrix;
use std::sync::Arc;
use tracing::{debug, info};

/// Feeds aligned rows through the model store and extracts the scalar
#[derive(Clone)]
pub struct InferenceEngine {
    /// Model artifact path
    model_path: String,
    /// Loaded artifacts, shared read-only across requests
    store: Option<Arc<dyn ModelStore>>,
}

impl InferenceEngine {
    /// Create an engine for the artifact at `model_path`; nothing is loaded yet
    pub fn new(model_path: &str) -> Self {
        info!("Creating inference engine with model: {}", model_path);
        Self {
            model_path: model_path.to_string(),
            store: None,
        }
    }

    /// Create an engine around an already loaded store
    pub fn with_store(store: Arc<dyn ModelStore>) -> Self {
        Self {
            model_path: "in-memory".to_string(),
            store: Some(store),
        }
    }

    /// Load the JSON model artifact
    pub fn load(&mut self) -> Result<(), InferenceError> {
        let store = ArtifactModelStore::load(&self.model_path)?;
        self.store = Some(Arc::new(store));
        info!("Model loaded successfully");
        Ok(())
    }

    /// Check if artifacts are loaded
    pub fn is_loaded(&self) -> bool {
        self.store.is_some()
    }

    /// Get model path
    pub fn model_path(&self) -> &str {
        &self.model_path
    }

    /// The loaded store, or `ModelUnavailable`
    pub fn store(&self) -> Result<&Arc<dyn ModelStore>, InferenceError> {
        self.store
            .as_ref()
            .ok_or_else(|| InferenceError::ModelUnavailable("Model not loaded".to_string()))
    }

    /// Ordered feature names the loaded model expects
    pub fn expected_feature_names(&self) -> Result<&[String], InferenceError> {
        Ok(self.store()?.expected_feature_names())
    }

    /// Run transform then predict on a single aligned row
    pub fn predict(&self, matrix: &AlignedMatrix) -> Result<f64, InferenceError> {
        let store = self.store()?;

        if matrix.n_rows() != 1 {
            return Err(InferenceError::ModelInput {
                expected: "1 row".to_string(),
                actual: format!("{} rows", matrix.n_rows()),
            });
        }

        let input = store.transform(matrix)?;
        debug!("Model input after preprocessing: {:?}", input.row(0));

        let output = store.predict(&input)?;
        let value = output
            .first()
            .copied()
            .ok_or_else(|| InferenceError::InvalidOutput("empty prediction".to_string()))?;
        if !value.is_finite() {
            return Err(InferenceError::InvalidOutput(format!("non-finite prediction {value}")));
        }

        debug!("Raw harvest-day prediction: {}", value);
        Ok(value)
    }
}

impl std::fmt::Debug for InferenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceEngine")
            .field("model_path", &self.model_path)
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_engine::{FeatureAligner, FeatureExtractor};
    use growth_series::{DailyAggregator, GrowthDayCalculator, GrowthDayPolicy};
    use data_validator::Reading;
    use chrono::NaiveDate;

    const ARTIFACT: &str = r#"{
        "schema": {"version": "test-v1", "feature_names": ["Temperature Expanding Mean", "Growth Days"]},
        "preprocessor": {"mean": [20.0, 0.0], "scale": [1.0, 1.0]},
        "regressor": {"kind": "linear", "coefficients": [1.0, -1.0], "intercept": 60.0}
    }"#;

    fn engine() -> InferenceEngine {
        let store = ArtifactModelStore::from_json(ARTIFACT).unwrap();
        InferenceEngine::with_store(Arc::new(store))
    }

    fn aligned(expected: &[String], days: u64) -> AlignedMatrix {
        let start = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let readings: Vec<Reading> = (0..days)
            .map(|i| Reading::new(start + chrono::Days::new(i), 22.0, 60.0, 800.0, 6.0))
            .collect();
        let series = DailyAggregator::aggregate(&readings).unwrap();
        let frame = FeatureExtractor::new().extract(&GrowthDayCalculator::apply(series, GrowthDayPolicy::Compute));
        FeatureAligner::new(expected).align_last(&frame).unwrap()
    }

    #[test]
    fn test_unloaded_engine_is_unavailable() {
        let engine = InferenceEngine::new("/nonexistent/model.json");
        assert!(!engine.is_loaded());
        let expected = vec!["Temperature".to_string()];
        let err = engine.predict(&aligned(&expected, 2)).unwrap_err();
        assert!(matches!(err, InferenceError::ModelUnavailable(_)));
    }

    #[test]
    fn test_load_failure_keeps_engine_unloaded() {
        let mut engine = InferenceEngine::new("/nonexistent/model.json");
        assert!(engine.load().is_err());
        assert!(!engine.is_loaded());
    }

    #[test]
    fn test_prediction() {
        let engine = engine();
        let expected = engine.expected_feature_names().unwrap().to_vec();
        // (22 - 20) * 1 - 4 growth days + 60
        let value = engine.predict(&aligned(&expected, 5)).unwrap();
        assert!((value - 58.0).abs() < 1e-12);
    }

    #[test]
    fn test_schema_drift_is_model_input_error() {
        let engine = engine();
        let drifted = vec!["Growth Days".to_string(), "Temperature Expanding Mean".to_string()];
        let err = engine.predict(&aligned(&drifted, 5)).unwrap_err();
        assert!(matches!(err, InferenceError::ModelInput { .. }));
    }
}
