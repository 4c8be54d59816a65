//! Carbon Emission Prediction API
//!
//! HTTP service that predicts carbon emissions for logistics routes
//! from a trained ONNX regression model.

pub mod api;
pub mod calculator;
pub mod config;
pub mod metrics;
pub mod models;
pub mod types;

pub use config::AppConfig;
pub use metrics::ServiceMetrics;
pub use models::{EmissionModel, ModelError, ModelGateway};
pub use types::{BatchPredictionResponse, PredictionResponse, RouteDescriptor};
