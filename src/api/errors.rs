//! Consistent JSON error responses

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::error;

use crate::models::ModelError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Map a gateway failure to a server error response.
///
/// The detailed cause stays in the server log; callers only ever see a
/// generic message so model internals are not leaked.
pub fn model_error_to_response(err: &ModelError) -> axum::response::Response {
    match err {
        ModelError::NotLoaded => {
            error!("Prediction attempted with no model loaded");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "model_not_loaded",
                "Model is not loaded",
            )
        }
        _ => {
            error!(error = ?err, "Prediction error");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "prediction_error",
                "Prediction failed",
            )
        }
    }
}
