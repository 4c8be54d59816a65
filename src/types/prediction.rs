//! Response types for single and batch emission predictions

use crate::calculator::{self, EmissionTotals};
use crate::types::route::RouteDescriptor;
use serde::{Deserialize, Serialize};

/// Round to 2 decimal places for kg presentation.
fn round_kg(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Round to 4 decimal places for tons presentation.
fn round_tons(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

/// Prediction for a single route, as returned over HTTP.
///
/// Rounding happens here, at the presentation boundary; the gateway and
/// calculator work with unrounded values throughout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResponse {
    /// Predicted emission in kg CO2e, rounded to 2 decimals
    pub predicted_emission_kgco2e: f64,
    /// Predicted emission in tons CO2e, rounded to 4 decimals
    pub predicted_emission_tons: f64,
    /// The request this prediction was made for, echoed back
    pub input_data: RouteDescriptor,
    /// Model version tag, static per deployment
    pub model_version: String,
}

impl PredictionResponse {
    /// Build a response from an unrounded kg prediction.
    pub fn new(emission_kg: f64, input_data: RouteDescriptor, model_version: &str) -> Self {
        Self {
            predicted_emission_kgco2e: round_kg(emission_kg),
            predicted_emission_tons: round_tons(calculator::to_tons(emission_kg)),
            input_data,
            model_version: model_version.to_string(),
        }
    }
}

/// Batch prediction request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPredictionRequest {
    pub predictions: Vec<RouteDescriptor>,
}

/// Batch prediction response. `results` is aligned 1:1 with the request
/// order; totals are computed over the unrounded per-item kg values so
/// `total_emission_tons` is exactly `total_kg / 1000`, not a sum of
/// already-rounded per-item tons.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchPredictionResponse {
    pub results: Vec<PredictionResponse>,
    pub total_count: usize,
    pub total_emission_kgco2e: f64,
    pub total_emission_tons: f64,
}

impl BatchPredictionResponse {
    pub fn new(results: Vec<PredictionResponse>, totals: EmissionTotals) -> Self {
        Self {
            results,
            total_count: totals.count,
            total_emission_kgco2e: round_kg(totals.total_kg),
            total_emission_tons: round_tons(totals.total_tons),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
    pub version: String,
}

impl HealthResponse {
    pub fn from_loaded(model_loaded: bool, version: &str) -> Self {
        Self {
            status: if model_loaded { "healthy" } else { "unhealthy" }.to_string(),
            model_loaded,
            version: version.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn route() -> RouteDescriptor {
        RouteDescriptor {
            origin_facility: "WH_Bangalore".to_string(),
            vehicle_type: "truck".to_string(),
            route_type: "highway".to_string(),
            distance_km: 350.0,
        }
    }

    #[test]
    fn test_response_rounding() {
        let resp = PredictionResponse::new(45.6789, route(), "1.0.0");
        assert_eq!(resp.predicted_emission_kgco2e, 45.68);
        assert_eq!(resp.predicted_emission_tons, 0.0457);
        assert_eq!(resp.input_data, route());
        assert_eq!(resp.model_version, "1.0.0");
    }

    #[test]
    fn test_batch_totals_from_unrounded_kg() {
        let kgs = [10.0, 20.5, 5.25];
        let results = kgs
            .iter()
            .map(|&kg| PredictionResponse::new(kg, route(), "1.0.0"))
            .collect();
        let resp = BatchPredictionResponse::new(results, crate::calculator::aggregate(&kgs));

        assert_eq!(resp.total_count, 3);
        assert_eq!(resp.total_emission_kgco2e, 35.75);
        // 35.75 / 1000 sits on a rounding boundary at 4 decimals
        assert!((resp.total_emission_tons - 0.03575).abs() < 1e-4);
    }

    #[test]
    fn test_health_status_strings() {
        let healthy = HealthResponse::from_loaded(true, "1.0.0");
        assert_eq!(healthy.status, "healthy");
        assert!(healthy.model_loaded);

        let unhealthy = HealthResponse::from_loaded(false, "1.0.0");
        assert_eq!(unhealthy.status, "unhealthy");
        assert!(!unhealthy.model_loaded);
    }
}
