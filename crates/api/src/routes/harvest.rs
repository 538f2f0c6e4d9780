//! Harvest Prediction Route

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::NaiveDate;
use data_validator::{SensorPayload, ValidationError};
use inference_engine::PredictError;
use metrics::{counter, histogram};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::error::ApiError;
use crate::AppState;

/// Response for the prediction endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// Model output truncated toward zero
    pub predicted_harvest_day: i64,
    /// Untruncated model output
    pub raw_prediction: f64,
    pub last_date: NaiveDate,
    pub growth_days: u32,
    pub phase: u8,
    pub schema_version: Option<String>,
}

/// Predict days until harvest from one plant's readings
pub async fn predict_harvest(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Vec<SensorPayload>>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let Json(payload) = body.map_err(|rejection| {
        failed(ValidationError::InvalidFormat(rejection.body_text()).into())
    })?;

    let prediction = state.predictor.predict(&payload).map_err(failed)?;

    counter!("harvest_predictions_total").increment(1);
    histogram!("harvest_prediction_latency_seconds").record(prediction.latency_seconds);
    info!(
        "Predicted harvest day {} for {} readings (last date {}, phase {})",
        prediction.predicted_harvest_day,
        payload.len(),
        prediction.last_date,
        prediction.phase.index()
    );

    let schema_version = state
        .predictor
        .engine()
        .store()
        .ok()
        .and_then(|s| s.schema_version())
        .map(str::to_string);

    Ok(Json(PredictionResponse {
        predicted_harvest_day: prediction.predicted_harvest_day,
        raw_prediction: prediction.raw_prediction,
        last_date: prediction.last_date,
        growth_days: prediction.growth_days,
        phase: prediction.phase.index(),
        schema_version,
    }))
}

/// Count a pipeline failure by kind before it becomes a response
fn failed(e: PredictError) -> ApiError {
    counter!("harvest_prediction_errors_total", "kind" => e.kind()).increment(1);
    ApiError::from(e)
}
