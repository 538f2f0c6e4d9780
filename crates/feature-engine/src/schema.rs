//! Versioned feature schema shared by training and inference

use crate::features::FeatureColumn;
use crate::FeatureError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Version tag of the canonical column set produced by `FeatureExtractor`
pub const HARVEST_SCHEMA_VERSION: &str = "harvest-features-v1";

/// Ordered feature names a model was trained on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSchema")]
pub struct FeatureSchema {
    version: String,
    feature_names: Vec<String>,
}

#[derive(Deserialize)]
struct RawSchema {
    version: String,
    feature_names: Vec<String>,
}

impl TryFrom<RawSchema> for FeatureSchema {
    type Error = FeatureError;

    fn try_from(raw: RawSchema) -> Result<Self, Self::Error> {
        FeatureSchema::new(raw.version, raw.feature_names)
    }
}

impl FeatureSchema {
    /// Build a schema; names must be unique and non-empty
    pub fn new(version: impl Into<String>, feature_names: Vec<String>) -> Result<Self, FeatureError> {
        if feature_names.is_empty() {
            return Err(FeatureError::EmptySchema);
        }
        let mut seen = HashSet::with_capacity(feature_names.len());
        for name in &feature_names {
            if !seen.insert(name.as_str()) {
                return Err(FeatureError::DuplicateFeature(name.clone()));
            }
        }
        Ok(Self {
            version: version.into(),
            feature_names,
        })
    }

    /// The full canonical column set
    pub fn harvest_v1() -> Self {
        Self {
            version: HARVEST_SCHEMA_VERSION.to_string(),
            feature_names: FeatureColumn::layout().iter().map(FeatureColumn::name).collect(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn len(&self) -> usize {
        self.feature_names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feature_names.is_empty()
    }

    /// Expected names the extractor never produces; these will be zero-filled
    pub fn unproduced<'a>(&'a self, produced: &[String]) -> Vec<&'a str> {
        let produced: HashSet<&str> = produced.iter().map(String::as_str).collect();
        self.feature_names
            .iter()
            .map(String::as_str)
            .filter(|name| !produced.contains(name))
            .collect()
    }
}
