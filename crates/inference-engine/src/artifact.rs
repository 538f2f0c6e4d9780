//! JSON model artifacts: standard scaler plus regressor

use crate::store::ModelStore;
use crate::InferenceError;
use feature_engine::{AlignedMatrix, FeatureSchema};
use ndarray::{aview1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Per-column standardization fitted at training time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    fn validate(&mut self, width: usize) -> Result<(), InferenceError> {
        if self.mean.len() != width || self.scale.len() != width {
            return Err(InferenceError::ArtifactFormat(format!(
                "scaler has {} means and {} scales for {} features",
                self.mean.len(),
                self.scale.len(),
                width
            )));
        }
        // Constant training columns are stored with zero scale
        for s in &mut self.scale {
            if *s == 0.0 {
                *s = 1.0;
            }
        }
        Ok(())
    }

    /// `(x - mean) / scale`, column-wise
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, InferenceError> {
        if x.ncols() != self.mean.len() {
            return Err(InferenceError::ModelInput {
                expected: format!("{} columns", self.mean.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }
        Ok((x - &aview1(&self.mean)) / &aview1(&self.scale))
    }
}

/// Regression tree in flattened array form.
///
/// Node `i` is a leaf when `children_left[i] == -1`; otherwise a row goes
/// left when `row[feature[i]] <= threshold[i]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<f64>,
}

impl DecisionTree {
    fn validate(&self, width: usize) -> Result<(), InferenceError> {
        let n = self.children_left.len();
        let bad = |msg: String| Err(InferenceError::ArtifactFormat(msg));
        if n == 0 {
            return bad("tree has no nodes".to_string());
        }
        if [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ]
        .iter()
        .any(|&len| len != n)
        {
            return bad("tree arrays differ in length".to_string());
        }

        for node in 0..n {
            let (left, right) = (self.children_left[node], self.children_right[node]);
            if left < 0 && right < 0 {
                continue;
            }
            // Children must come after their parent so traversal always terminates
            let child_ok = |c: i64| c > node as i64 && (c as usize) < n;
            if !child_ok(left) || !child_ok(right) {
                return bad(format!("node {node} has invalid children ({left}, {right})"));
            }
            let f = self.feature[node];
            if f < 0 || f as usize >= width {
                return bad(format!("node {node} splits on feature {f} of {width}"));
            }
        }
        Ok(())
    }

    pub fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        let mut node = 0usize;
        loop {
            let left = self.children_left[node];
            if left < 0 {
                return self.value[node];
            }
            let f = self.feature[node] as usize;
            node = if row[f] <= self.threshold[node] {
                left as usize
            } else {
                self.children_right[node] as usize
            };
        }
    }
}

/// Trained regressor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Regressor {
    Linear { coefficients: Vec<f64>, intercept: f64 },
    RandomForest { trees: Vec<DecisionTree> },
}

impl Regressor {
    fn validate(&self, width: usize) -> Result<(), InferenceError> {
        match self {
            Regressor::Linear { coefficients, .. } if coefficients.len() != width => {
                Err(InferenceError::ArtifactFormat(format!(
                    "{} coefficients for {} features",
                    coefficients.len(),
                    width
                )))
            }
            Regressor::Linear { .. } => Ok(()),
            Regressor::RandomForest { trees } if trees.is_empty() => {
                Err(InferenceError::ArtifactFormat("forest has no trees".to_string()))
            }
            Regressor::RandomForest { trees } => trees.iter().try_for_each(|t| t.validate(width)),
        }
    }

    pub fn predict(&self, input: &Array2<f64>) -> Vec<f64> {
        match self {
            Regressor::Linear {
                coefficients,
                intercept,
            } => input
                .dot(&aview1(coefficients))
                .mapv(|v| v + intercept)
                .to_vec(),
            Regressor::RandomForest { trees } => input
                .rows()
                .into_iter()
                .map(|row| {
                    trees.iter().map(|t| t.predict_row(row)).sum::<f64>() / trees.len() as f64
                })
                .collect(),
        }
    }
}

/// Everything produced by a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub schema: FeatureSchema,
    pub preprocessor: StandardScaler,
    pub regressor: Regressor,
}

/// Model store backed by a JSON artifact, loaded once at startup
#[derive(Debug, Clone)]
pub struct ArtifactModelStore {
    artifact: ModelArtifact,
}

impl ArtifactModelStore {
    /// Check shapes against the schema width and wrap the artifact
    pub fn from_artifact(mut artifact: ModelArtifact) -> Result<Self, InferenceError> {
        let width = artifact.schema.len();
        artifact.preprocessor.validate(width)?;
        artifact.regressor.validate(width)?;
        Ok(Self { artifact })
    }

    pub fn from_json(json: &str) -> Result<Self, InferenceError> {
        Self::from_artifact(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        let store = Self::from_json(&std::fs::read_to_string(path)?)?;
        info!(
            "Loaded model artifact {} (schema {}, {} features)",
            path.display(),
            store.artifact.schema.version(),
            store.artifact.schema.len()
        );
        Ok(store)
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }
}

impl ModelStore for ArtifactModelStore {
    fn expected_feature_names(&self) -> &[String] {
        self.artifact.schema.feature_names()
    }

    fn schema_version(&self) -> Option<&str> {
        Some(self.artifact.schema.version())
    }

    fn transform(&self, matrix: &AlignedMatrix) -> Result<Array2<f64>, InferenceError> {
        if matrix.columns() != self.expected_feature_names() {
            return Err(InferenceError::ModelInput {
                expected: format!(
                    "{} columns of schema {}",
                    self.artifact.schema.len(),
                    self.artifact.schema.version()
                ),
                actual: format!("{} differently named or ordered columns", matrix.width()),
            });
        }
        self.artifact.preprocessor.transform(matrix.values())
    }

    fn predict(&self, input: &Array2<f64>) -> Result<Vec<f64>, InferenceError> {
        let width = self.artifact.schema.len();
        if input.ncols() != width {
            return Err(InferenceError::ModelInput {
                expected: format!("{width} columns"),
                actual: format!("{} columns", input.ncols()),
            });
        }
        Ok(self.artifact.regressor.predict(input))
    }
}
