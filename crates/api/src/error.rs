//! HTTP error mapping

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use inference_engine::PredictError;
use serde::Serialize;
use tracing::{error, warn};

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub detail: String,
}

/// Pipeline failure surfaced to the client
#[derive(Debug)]
pub struct ApiError(pub PredictError);

impl From<PredictError> for ApiError {
    fn from(e: PredictError) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    /// Status code for the pipeline failure kind
    pub fn status(&self) -> StatusCode {
        match self.0.kind() {
            "validation" => StatusCode::UNPROCESSABLE_ENTITY,
            "model_unavailable" | "model_artifact" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Prediction failed ({}): {}", self.0.kind(), self.0);
        } else {
            warn!("Rejected payload: {}", self.0);
        }

        let body = ErrorBody {
            error: self.0.kind().to_string(),
            detail: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
