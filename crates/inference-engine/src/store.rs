//! Model Store seam

use crate::InferenceError;
use feature_engine::AlignedMatrix;
use ndarray::Array2;

/// Frozen model artifacts shared read-only by every request
pub trait ModelStore: Send + Sync {
    /// Ordered feature names the model was trained on
    fn expected_feature_names(&self) -> &[String];

    /// Schema version tag, when the artifact carries one
    fn schema_version(&self) -> Option<&str> {
        None
    }

    /// Preprocess an aligned matrix into model input
    fn transform(&self, matrix: &AlignedMatrix) -> Result<Array2<f64>, InferenceError>;

    /// One prediction per input row
    fn predict(&self, input: &Array2<f64>) -> Result<Vec<f64>, InferenceError>;
}
