//! Harvest Prediction Service - Main Entry Point

use anyhow::Context;
use api::{init_logging, run_server, AppState, Settings};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Optional config path as the first argument
    let config_path = std::env::args().nth(1);
    let settings = Settings::load(config_path.as_deref()).context("failed to load settings")?;

    init_logging(&settings.logging).map_err(|e| anyhow::anyhow!(e))?;

    info!("=== Harvest Prediction Service v{} ===", env!("CARGO_PKG_VERSION"));
    info!("Loading model artifact from {}", settings.model.artifact_path);

    let metrics = PrometheusBuilder::new()
        .install_recorder()
        .context("failed to install metrics recorder")?;

    let state = AppState::from_settings(&settings, Some(metrics))
        .with_context(|| format!("failed to load model {}", settings.model.artifact_path))?;

    run_server(Arc::new(state), &settings.server.addr).await?;

    Ok(())
}
