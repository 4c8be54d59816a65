//! Request and response types for the emission prediction API

pub mod prediction;
pub mod route;

pub use prediction::{BatchPredictionRequest, BatchPredictionResponse, HealthResponse, PredictionResponse};
pub use route::RouteDescriptor;
