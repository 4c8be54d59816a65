//! Carbon Emission Prediction API - Main Entry Point
//!
//! Loads the ONNX emission model at startup and serves single and batch
//! predictions over HTTP.

use anyhow::{Context, Result};
use carbon_emission_api::{
    api::{self, AppState},
    config::AppConfig,
    metrics::{MetricsReporter, ServiceMetrics},
    models::ModelGateway,
};
use std::sync::Arc;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("carbon_emission_api=info".parse()?),
        )
        .init();

    info!("Starting Carbon Emission Prediction API");

    // Load configuration
    let config = AppConfig::load()?;
    info!(
        model_path = %config.model.path.display(),
        model_version = %config.model.version,
        max_batch_size = config.api.max_batch_size,
        "Configuration loaded successfully"
    );

    // Load the model artifact before accepting any traffic. A failed
    // load is fatal: the service must not serve predictions without it.
    let mut gateway = ModelGateway::new(&config.model.version);
    gateway
        .load(&config.model.path, config.model.onnx_threads)
        .context("Model artifact load failed; refusing to start")?;

    let metrics = Arc::new(ServiceMetrics::new());

    // Report serving metrics every 30 seconds
    let reporter_metrics = metrics.clone();
    tokio::spawn(async move {
        MetricsReporter::new(reporter_metrics, 30).start().await;
    });

    let state = AppState {
        gateway: Arc::new(gateway),
        metrics,
        api_title: config.api.title.clone(),
        max_batch_size: config.api.max_batch_size,
    };
    let app = api::build_router(state, &config.server.cors_origins);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context(format!("Failed to bind {addr}"))?;

    info!(addr = %addr, "Listening for prediction requests");

    axum::serve(listener, app).await?;

    Ok(())
}
