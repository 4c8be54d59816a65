//! HTTP API wiring (axum router + shared state).
//!
//! - `routes.rs`: endpoint handlers and boundary validation
//! - `errors.rs`: consistent JSON error responses

use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

use crate::metrics::ServiceMetrics;
use crate::models::ModelGateway;

pub mod errors;
pub mod routes;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<ModelGateway>,
    pub metrics: Arc<ServiceMetrics>,
    pub api_title: String,
    pub max_batch_size: usize,
}

/// Build the full HTTP router.
///
/// An empty origin list opens CORS to any origin, matching local
/// development deployments without a frontend origin configured.
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    let cors = if cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = cors_origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %origin, "Ignoring unparseable CORS origin");
                    None
                }
            })
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers(Any)
    };

    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/predict", post(routes::predict))
        .route("/predict/batch", post(routes::predict_batch))
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state)
}
