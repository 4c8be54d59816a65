//! Endpoint handlers and boundary validation

use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::info;

use crate::api::errors::{json_error, model_error_to_response};
use crate::api::AppState;
use crate::calculator;
use crate::types::prediction::{
    BatchPredictionRequest, BatchPredictionResponse, HealthResponse, PredictionResponse,
};
use crate::types::route::RouteDescriptor;

/// GET /: liveness and service info
pub async fn root(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "message": state.api_title,
        "version": state.gateway.model_version(),
        "docs": "/docs",
    }))
}

/// GET /health: readiness derived from model load state
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse::from_loaded(
        state.gateway.is_loaded(),
        state.gateway.model_version(),
    ))
}

/// POST /predict: single route prediction
pub async fn predict(
    State(state): State<AppState>,
    Json(mut descriptor): Json<RouteDescriptor>,
) -> axum::response::Response {
    descriptor.normalize();
    if let Err(msg) = descriptor.validate() {
        return json_error(StatusCode::BAD_REQUEST, "validation_error", msg);
    }

    let start = Instant::now();
    let emission_kg = match state.gateway.predict_one(&descriptor) {
        Ok(kg) => kg,
        Err(e) => {
            state.metrics.record_failure();
            return model_error_to_response(&e);
        }
    };
    state.metrics.record_prediction(start.elapsed());

    info!(
        origin = %descriptor.origin_facility,
        vehicle = %descriptor.vehicle_type,
        route = %descriptor.route_type,
        distance_km = descriptor.distance_km,
        emission_kg = format!("{emission_kg:.2}"),
        "Prediction served"
    );

    Json(PredictionResponse::new(
        emission_kg,
        descriptor,
        state.gateway.model_version(),
    ))
    .into_response()
}

/// POST /predict/batch: ordered batch prediction, 1..=max_batch_size routes
pub async fn predict_batch(
    State(state): State<AppState>,
    Json(mut request): Json<BatchPredictionRequest>,
) -> axum::response::Response {
    if request.predictions.is_empty() {
        return json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "predictions must contain at least 1 route",
        );
    }
    if request.predictions.len() > state.max_batch_size {
        return json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            format!(
                "predictions must contain at most {} routes",
                state.max_batch_size
            ),
        );
    }

    for (i, descriptor) in request.predictions.iter_mut().enumerate() {
        descriptor.normalize();
        if let Err(msg) = descriptor.validate() {
            return json_error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                format!("predictions[{i}]: {msg}"),
            );
        }
    }

    let start = Instant::now();
    let emissions_kg = match state.gateway.predict_many(&request.predictions) {
        Ok(kgs) => kgs,
        Err(e) => {
            state.metrics.record_failure();
            return model_error_to_response(&e);
        }
    };
    state
        .metrics
        .record_batch(request.predictions.len(), start.elapsed());

    // Totals over the unrounded kg values; per-item rounding happens in
    // the individual responses only.
    let totals = calculator::aggregate(&emissions_kg);

    let results: Vec<PredictionResponse> = request
        .predictions
        .into_iter()
        .zip(emissions_kg)
        .map(|(descriptor, kg)| {
            PredictionResponse::new(kg, descriptor, state.gateway.model_version())
        })
        .collect();

    info!(
        routes = results.len(),
        total_emission_kg = format!("{:.2}", totals.total_kg),
        "Batch prediction served"
    );

    Json(BatchPredictionResponse::new(results, totals)).into_response()
}
