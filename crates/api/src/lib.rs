//! Harvest Prediction API Server
//!
//! Thin HTTP layer over the harvest predictor: one prediction route, a
//! health check and Prometheus metrics.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, routing::post, Json, Router};
use inference_engine::{HarvestPredictor, InferenceEngine, InferenceError};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

pub mod settings;
mod error;
mod routes;

pub use settings::{LoggingSettings, Settings};
pub use error::{ApiError, ErrorBody};

/// Application state shared read-only across handlers
pub struct AppState {
    /// Pipeline with model artifacts loaded at startup
    pub predictor: HarvestPredictor,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
    /// Prometheus handle, absent when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new application state
    pub fn new(predictor: HarvestPredictor, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            predictor,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
            metrics,
        }
    }

    /// Load the model artifact named in settings; failure is fatal for the service
    pub fn from_settings(
        settings: &Settings,
        metrics: Option<PrometheusHandle>,
    ) -> Result<Self, InferenceError> {
        let mut engine = InferenceEngine::new(&settings.model.artifact_path);
        engine.load()?;
        let predictor = HarvestPredictor::new(settings.predictor_config(), engine);
        Ok(Self::new(predictor, metrics))
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub model: ModelHealth,
}

/// Model artifact status
#[derive(Debug, Serialize)]
pub struct ModelHealth {
    pub loaded: bool,
    pub path: String,
    pub schema_version: Option<String>,
    pub feature_count: usize,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/predict-harvest", post(routes::harvest::predict_harvest))
        .route("/api/v1/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let engine = state.predictor.engine();
    let store = engine.store().ok();
    let model = ModelHealth {
        loaded: engine.is_loaded(),
        path: engine.model_path().to_string(),
        schema_version: store.and_then(|s| s.schema_version()).map(str::to_string),
        feature_count: store.map(|s| s.expected_feature_names().len()).unwrap_or(0),
    };

    let status = if model.loaded { "healthy" } else { "degraded" };
    Json(HealthResponse {
        status: status.to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        model,
    })
}

/// Prometheus text exposition
async fn metrics_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (StatusCode::NOT_FOUND, "metrics recorder not installed".to_string()),
    }
}

/// Initialize logging; `RUST_LOG` overrides the configured level
pub fn init_logging(
    settings: &LoggingSettings,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if settings.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    }
}

/// Run the server
pub async fn run_server(state: Arc<AppState>, addr: &str) -> std::io::Result<()> {
    let app = create_router(state);

    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await
}
