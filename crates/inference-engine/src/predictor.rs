//! Readings-to-harvest-day pipeline

use crate::engine::InferenceEngine;
use crate::InferenceError;
use chrono::NaiveDate;
use data_validator::{Reading, SensorPayload, ValidationConfig, ValidationError, Validator};
use feature_engine::{FeatureAligner, FeatureError, FeatureExtractor, FeatureFrame, Phase};
use growth_series::{DailyAggregator, GrowthDayCalculator, GrowthDayPolicy, GrowthDaySource, SeriesError};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use thiserror::Error;
use tracing::debug;

/// Any failure between payload and prediction
#[derive(Debug, Error)]
pub enum PredictError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// Duplicate or unordered dates reached the series stage
    #[error(transparent)]
    ScheduleInconsistency(SeriesError),
    #[error(transparent)]
    Feature(#[from] FeatureError),
    #[error(transparent)]
    Inference(#[from] InferenceError),
}

impl From<SeriesError> for PredictError {
    fn from(e: SeriesError) -> Self {
        match e {
            SeriesError::Validation(v) => PredictError::Validation(v),
            other => PredictError::ScheduleInconsistency(other),
        }
    }
}

impl PredictError {
    /// Short label for logs and metrics
    pub fn kind(&self) -> &'static str {
        match self {
            PredictError::Validation(_) => "validation",
            PredictError::ScheduleInconsistency(_) => "schedule_inconsistency",
            PredictError::Feature(_) => "feature",
            PredictError::Inference(InferenceError::ModelInput { .. }) => "model_input",
            PredictError::Inference(InferenceError::InvalidOutput(_)) => "model_output",
            PredictError::Inference(InferenceError::ModelUnavailable(_)) => "model_unavailable",
            PredictError::Inference(InferenceError::ArtifactIo(_) | InferenceError::ArtifactFormat(_)) => {
                "model_artifact"
            }
        }
    }
}

/// Pipeline settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictorConfig {
    pub validation: ValidationConfig,
    pub growth_days: GrowthDayPolicy,
}

/// Prediction for the most recent day of a series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarvestPrediction {
    /// Raw model output truncated toward zero
    pub predicted_harvest_day: i64,
    pub raw_prediction: f64,
    pub last_date: NaiveDate,
    pub growth_days: u32,
    pub phase: Phase,
    pub growth_day_source: GrowthDaySource,
    /// Wall time from payload validation to model output
    pub latency_seconds: f64,
}

/// Runs validation, aggregation, feature extraction, alignment and inference
#[derive(Debug, Clone)]
pub struct HarvestPredictor {
    validator: Validator,
    extractor: FeatureExtractor,
    growth_days: GrowthDayPolicy,
    engine: InferenceEngine,
}

impl HarvestPredictor {
    pub fn new(config: PredictorConfig, engine: InferenceEngine) -> Self {
        Self {
            validator: Validator::new(config.validation),
            extractor: FeatureExtractor::new(),
            growth_days: config.growth_days,
            engine,
        }
    }

    pub fn engine(&self) -> &InferenceEngine {
        &self.engine
    }

    /// Feature frame for validated readings of one plant
    pub fn features(&self, readings: &[Reading]) -> Result<(FeatureFrame, GrowthDaySource), PredictError> {
        let series = DailyAggregator::aggregate(readings)?;
        let tagged = GrowthDayCalculator::apply(series, self.growth_days);
        Ok((self.extractor.extract(&tagged), tagged.source()))
    }

    /// Validate a raw payload and predict
    pub fn predict(&self, payload: &[SensorPayload]) -> Result<HarvestPrediction, PredictError> {
        let start = Instant::now();
        let readings = self.validator.validate_payload(payload)?;
        self.predict_since(&readings, start)
    }

    /// Predict days until harvest from the last date in the readings
    pub fn predict_readings(&self, readings: &[Reading]) -> Result<HarvestPrediction, PredictError> {
        self.predict_since(readings, Instant::now())
    }

    fn predict_since(&self, readings: &[Reading], start: Instant) -> Result<HarvestPrediction, PredictError> {
        // Fail before feature work when the model is missing
        let expected = self.engine.expected_feature_names()?;

        let (frame, source) = self.features(readings)?;
        let last = frame.last_row().ok_or(FeatureError::EmptyFrame)?;
        let (last_date, growth_days, phase) = (last.date, last.growth_days, last.phase);

        let matrix = FeatureAligner::new(expected).align_last(&frame)?;
        debug!("Aligned model input ({} columns): {:?}", matrix.width(), matrix.row(0));

        let raw_prediction = self.engine.predict(&matrix)?;

        Ok(HarvestPrediction {
            predicted_harvest_day: raw_prediction.trunc() as i64,
            raw_prediction,
            last_date,
            growth_days,
            phase,
            growth_day_source: source,
            latency_seconds: start.elapsed().as_secs_f64(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ArtifactModelStore, ModelArtifact, Regressor, StandardScaler};
    use feature_engine::FeatureSchema;
    use std::sync::Arc;

    fn payload(date: &str, temperature: f64) -> SensorPayload {
        SensorPayload {
            date: date.to_string(),
            temperature,
            humidity: 60.0,
            tds: 850.0,
            ph: 6.1,
            growth_days: None,
        }
    }

    /// Linear model over the full canonical schema: 45 - growth days + phase mean of temperature / 10
    fn predictor(policy: GrowthDayPolicy) -> HarvestPredictor {
        let schema = FeatureSchema::harvest_v1();
        let width = schema.len();
        let mut coefficients = vec![0.0; width];
        let gd = schema.feature_names().iter().position(|n| n == "Growth Days").unwrap();
        let pm = schema
            .feature_names()
            .iter()
            .position(|n| n == "Temperature Phase Mean")
            .unwrap();
        coefficients[gd] = -1.0;
        coefficients[pm] = 0.1;
        let artifact = ModelArtifact {
            schema,
            preprocessor: StandardScaler {
                mean: vec![0.0; width],
                scale: vec![1.0; width],
            },
            regressor: Regressor::Linear {
                coefficients,
                intercept: 45.0,
            },
        };
        let store = ArtifactModelStore::from_artifact(artifact).unwrap();
        let config = PredictorConfig {
            growth_days: policy,
            ..Default::default()
        };
        HarvestPredictor::new(config, InferenceEngine::with_store(Arc::new(store)))
    }

    #[test]
    fn test_end_to_end_prediction() {
        let predictor = predictor(GrowthDayPolicy::Compute);
        let prediction = predictor
            .predict(&[
                payload("2024-01-03", 22.0),
                payload("2024-01-01", 18.0),
                payload("2024-01-03", 26.0),
            ])
            .unwrap();
        // Day 2 mean 24, phase mean (18 + 24) / 2 = 21 -> 45 - 2 + 2.1
        assert_eq!(prediction.last_date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(prediction.growth_days, 2);
        assert_eq!(prediction.phase, Phase::Early);
        assert!((prediction.raw_prediction - 45.1).abs() < 1e-9);
        assert_eq!(prediction.predicted_harvest_day, 45);
        assert_eq!(prediction.growth_day_source, GrowthDaySource::Computed);
    }

    #[test]
    fn test_supplied_growth_days() {
        let predictor = predictor(GrowthDayPolicy::PreferSupplied);
        let mut a = payload("2024-01-01", 20.0);
        a.growth_days = Some(31);
        let mut b = payload("2024-01-02", 20.0);
        b.growth_days = Some(32);
        let prediction = predictor.predict(&[a, b]).unwrap();
        assert_eq!(prediction.growth_days, 32);
        assert_eq!(prediction.phase, Phase::Late);
        assert_eq!(prediction.growth_day_source, GrowthDaySource::Supplied);
        // 45 - 32 + 2.0
        assert_eq!(prediction.predicted_harvest_day, 15);
    }

    #[test]
    fn test_empty_payload() {
        let err = predictor(GrowthDayPolicy::Compute).predict(&[]).unwrap_err();
        assert!(matches!(err, PredictError::Validation(ValidationError::EmptyPayload)));
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn test_truncates_toward_zero() {
        let predictor = predictor(GrowthDayPolicy::Compute);
        let readings: Vec<SensorPayload> = (1..=28)
            .map(|d| payload(&format!("2024-02-{d:02}"), 21.0))
            .chain((1..=30).map(|d| payload(&format!("2024-03-{d:02}"), 21.0)))
            .collect();
        let prediction = predictor.predict(&readings).unwrap();
        assert!(prediction.latency_seconds > 0.0);
        assert!(prediction.latency_seconds < 60.0);
        // Leap year: 58 growth days, phase mean 21 -> 45 - 58 + 2.1 = -10.9
        assert_eq!(prediction.growth_days, 58);
        assert!((prediction.raw_prediction + 10.9).abs() < 1e-9);
        assert_eq!(prediction.predicted_harvest_day, -10);
    }

    #[test]
    fn test_unloaded_model() {
        let predictor = HarvestPredictor::new(
            PredictorConfig::default(),
            InferenceEngine::new("/nonexistent/model.json"),
        );
        let err = predictor.predict(&[payload("2024-01-01", 20.0)]).unwrap_err();
        assert_eq!(err.kind(), "model_unavailable");
    }

    #[test]
    fn test_artifact_errors_have_own_kind() {
        let err = PredictError::from(InferenceError::ArtifactFormat("bad tree".to_string()));
        assert_eq!(err.kind(), "model_artifact");
        let err = PredictError::from(InferenceError::ModelUnavailable("Model not loaded".to_string()));
        assert_eq!(err.kind(), "model_unavailable");
        let err = PredictError::from(InferenceError::ModelInput {
            expected: "1 row".to_string(),
            actual: "2 rows".to_string(),
        });
        assert_eq!(err.kind(), "model_input");
    }

    #[test]
    fn test_schedule_inconsistency_mapping() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let err = PredictError::from(SeriesError::DuplicateDate(date));
        assert_eq!(err.kind(), "schedule_inconsistency");
        let err = PredictError::from(SeriesError::Validation(ValidationError::EmptyPayload));
        assert_eq!(err.kind(), "validation");
    }
}
