//! Prediction gateway bridging route descriptors to the model artifact

use crate::models::EmissionModel;
use crate::types::route::RouteDescriptor;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Column order the model artifact was fitted with.
///
/// The artifact has no way to detect a reordering; feeding columns in any
/// other order silently corrupts predictions. Every row built by the
/// gateway follows this order, and `tests` pin it.
pub const MODEL_COLUMNS: [&str; 4] = [
    "origin_facility",
    "vehicle_type",
    "route_type",
    "distance_km",
];

/// Errors raised by the model gateway.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Artifact missing, unreadable or incompatible at startup. Fatal:
    /// the service must not accept prediction traffic without a model.
    #[error("failed to load model artifact from {path:?}")]
    Load {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    /// Prediction attempted before a successful load.
    #[error("model artifact not loaded")]
    NotLoaded,

    /// The artifact rejected the input (e.g. a categorical value never
    /// seen during training). The cause is logged server-side; callers
    /// get a generic message.
    #[error("model inference failed")]
    Prediction(#[source] anyhow::Error),
}

/// Tabular input for one artifact invocation.
///
/// One entry per column of [`MODEL_COLUMNS`], each holding one value per
/// row; row `i` across all four columns is descriptor `i`.
#[derive(Debug, Clone)]
pub struct RowBatch {
    pub origin_facility: Vec<String>,
    pub vehicle_type: Vec<String>,
    pub route_type: Vec<String>,
    pub distance_km: Vec<f64>,
}

impl RowBatch {
    /// Build a batch from descriptors, preserving their order exactly.
    pub fn from_descriptors(descriptors: &[RouteDescriptor]) -> Self {
        let mut batch = Self {
            origin_facility: Vec::with_capacity(descriptors.len()),
            vehicle_type: Vec::with_capacity(descriptors.len()),
            route_type: Vec::with_capacity(descriptors.len()),
            distance_km: Vec::with_capacity(descriptors.len()),
        };
        for d in descriptors {
            batch.origin_facility.push(d.origin_facility.clone());
            batch.vehicle_type.push(d.vehicle_type.clone());
            batch.route_type.push(d.route_type.clone());
            batch.distance_km.push(d.distance_km);
        }
        batch
    }

    /// Number of rows in the batch.
    pub fn len(&self) -> usize {
        self.distance_km.len()
    }

    pub fn is_empty(&self) -> bool {
        self.distance_km.is_empty()
    }
}

/// Owns the loaded model artifact for the process lifetime and exposes
/// prediction operations over it.
///
/// Two states: not-ready (no artifact) and ready, with a single one-way
/// transition on successful [`ModelGateway::load`]. The artifact is never
/// replaced after load; a new model means a process restart. Once loaded
/// it is shared read-only across request tasks, so no locking happens at
/// this level (the ONNX implementation serializes its own session calls,
/// see [`crate::models::loader`]).
pub struct ModelGateway {
    model: Option<Box<dyn EmissionModel>>,
    model_version: String,
}

impl ModelGateway {
    /// Create a gateway with no artifact. Every prediction fails with
    /// [`ModelError::NotLoaded`] until `load` succeeds.
    pub fn new(model_version: &str) -> Self {
        Self {
            model: None,
            model_version: model_version.to_string(),
        }
    }

    /// Create a gateway around an already-constructed artifact.
    ///
    /// Used by tests to inject a deterministic fake capability.
    pub fn with_model(model: Box<dyn EmissionModel>, model_version: &str) -> Self {
        Self {
            model: Some(model),
            model_version: model_version.to_string(),
        }
    }

    /// Load the ONNX artifact from `path`. Fails with [`ModelError::Load`]
    /// if the file is missing, malformed or incompatible.
    pub fn load(&mut self, path: &Path, onnx_threads: usize) -> Result<(), ModelError> {
        info!(path = %path.display(), "Loading emission model artifact");

        let model = crate::models::loader::OnnxEmissionModel::load(path, onnx_threads)
            .map_err(|source| ModelError::Load {
                path: path.to_path_buf(),
                source,
            })?;

        self.model = Some(Box::new(model));
        info!(version = %self.model_version, "Model artifact loaded");
        Ok(())
    }

    /// Whether a usable artifact is currently held. Side-effect-free;
    /// drives health reporting.
    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// Model version tag reported with every prediction.
    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    /// Predict emission in kg CO2e for a single route.
    pub fn predict_one(&self, descriptor: &RouteDescriptor) -> Result<f64, ModelError> {
        let predictions = self.predict_many(std::slice::from_ref(descriptor))?;
        predictions
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::Prediction(anyhow::anyhow!("model returned no prediction")))
    }

    /// Predict emissions for an ordered batch of routes.
    ///
    /// The artifact is invoked exactly once for the whole batch and the
    /// returned values are aligned 1:1 with the input order, so callers
    /// may zip inputs to outputs. Batch size bounds are enforced at the
    /// HTTP boundary, not here; an empty batch yields an empty result.
    pub fn predict_many(&self, descriptors: &[RouteDescriptor]) -> Result<Vec<f64>, ModelError> {
        let model = self.model.as_ref().ok_or(ModelError::NotLoaded)?;

        let batch = RowBatch::from_descriptors(descriptors);
        let predictions = model.predict(&batch).map_err(ModelError::Prediction)?;

        if predictions.len() != descriptors.len() {
            return Err(ModelError::Prediction(anyhow::anyhow!(
                "model returned {} predictions for {} rows",
                predictions.len(),
                descriptors.len()
            )));
        }

        debug!(rows = descriptors.len(), "Batch inference complete");
        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Fake artifact: emission = distance * 0.1, by row.
    struct DistanceModel;

    impl EmissionModel for DistanceModel {
        fn predict(&self, batch: &RowBatch) -> Result<Vec<f64>> {
            Ok(batch.distance_km.iter().map(|d| d * 0.1).collect())
        }
    }

    /// Fake artifact that counts how often it is invoked.
    struct CountingModel {
        calls: Arc<AtomicUsize>,
    }

    impl EmissionModel for CountingModel {
        fn predict(&self, batch: &RowBatch) -> Result<Vec<f64>> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Ok(batch.distance_km.iter().map(|d| d * 0.1).collect())
        }
    }

    /// Fake artifact that always fails, like an unseen category would.
    struct RejectingModel;

    impl EmissionModel for RejectingModel {
        fn predict(&self, _batch: &RowBatch) -> Result<Vec<f64>> {
            Err(anyhow::anyhow!("unknown category 'hovercraft'"))
        }
    }

    fn descriptor(distance_km: f64) -> RouteDescriptor {
        RouteDescriptor {
            origin_facility: "WH_Bangalore".to_string(),
            vehicle_type: "truck".to_string(),
            route_type: "highway".to_string(),
            distance_km,
        }
    }

    #[test]
    fn test_column_order_contract() {
        assert_eq!(
            MODEL_COLUMNS,
            ["origin_facility", "vehicle_type", "route_type", "distance_km"]
        );
    }

    #[test]
    fn test_row_batch_preserves_order() {
        let descriptors = vec![descriptor(10.0), descriptor(20.0), descriptor(30.0)];
        let batch = RowBatch::from_descriptors(&descriptors);

        assert_eq!(batch.len(), 3);
        assert_eq!(batch.distance_km, vec![10.0, 20.0, 30.0]);
        assert_eq!(batch.origin_facility.len(), 3);
    }

    #[test]
    fn test_predict_one_passes_value_through() {
        let gateway = ModelGateway::with_model(Box::new(DistanceModel), "1.0.0");
        let kg = gateway.predict_one(&descriptor(350.0)).unwrap();
        assert_eq!(kg, 35.0);
    }

    #[test]
    fn test_predict_one_is_deterministic() {
        let gateway = ModelGateway::with_model(Box::new(DistanceModel), "1.0.0");
        let d = descriptor(350.0);
        let first = gateway.predict_one(&d).unwrap();
        let second = gateway.predict_one(&d).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_predict_many_matches_predict_one_per_row() {
        let gateway = ModelGateway::with_model(Box::new(DistanceModel), "1.0.0");
        let descriptors = vec![descriptor(100.0), descriptor(205.0), descriptor(52.5)];

        let batch = gateway.predict_many(&descriptors).unwrap();
        assert_eq!(batch.len(), 3);
        for (d, &kg) in descriptors.iter().zip(&batch) {
            assert_eq!(kg, gateway.predict_one(d).unwrap());
        }
    }

    #[test]
    fn test_predict_many_invokes_artifact_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let gateway = ModelGateway::with_model(
            Box::new(CountingModel {
                calls: calls.clone(),
            }),
            "1.0.0",
        );

        let descriptors = vec![descriptor(10.0), descriptor(20.0), descriptor(30.0)];
        let predictions = gateway.predict_many(&descriptors).unwrap();

        assert_eq!(predictions.len(), 3);
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_not_loaded_errors() {
        let gateway = ModelGateway::new("1.0.0");
        assert!(!gateway.is_loaded());

        let err = gateway.predict_one(&descriptor(10.0)).unwrap_err();
        assert!(matches!(err, ModelError::NotLoaded));

        let err = gateway.predict_many(&[descriptor(10.0)]).unwrap_err();
        assert!(matches!(err, ModelError::NotLoaded));
    }

    #[test]
    fn test_load_failure_leaves_gateway_not_ready() {
        let mut gateway = ModelGateway::new("1.0.0");
        let err = gateway
            .load(Path::new("/nonexistent/model.onnx"), 1)
            .unwrap_err();
        assert!(matches!(err, ModelError::Load { .. }));
        assert!(!gateway.is_loaded());

        let err = gateway.predict_one(&descriptor(10.0)).unwrap_err();
        assert!(matches!(err, ModelError::NotLoaded));
    }

    #[test]
    fn test_artifact_failure_propagates_as_prediction_error() {
        let gateway = ModelGateway::with_model(Box::new(RejectingModel), "1.0.0");
        let err = gateway.predict_one(&descriptor(10.0)).unwrap_err();
        assert!(matches!(err, ModelError::Prediction(_)));
    }

    #[test]
    fn test_empty_batch_does_not_crash() {
        let gateway = ModelGateway::with_model(Box::new(DistanceModel), "1.0.0");
        let predictions = gateway.predict_many(&[]).unwrap();
        assert!(predictions.is_empty());
    }
}
