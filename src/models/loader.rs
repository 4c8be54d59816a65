//! ONNX-backed emission model artifact

use crate::models::gateway::RowBatch;
use crate::models::EmissionModel;
use anyhow::{anyhow, Context, Result};
use ort::session::{builder::GraphOptimizationLevel, Session};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info};

/// Category vocabularies the model was trained with, shipped as a JSON
/// file next to the `.onnx` artifact by the training pipeline. Vocabulary
/// order defines the ordinal encoding, so it must not be edited by hand.
#[derive(Debug, Deserialize)]
struct FeatureVocab {
    origin_facility: Vec<String>,
    vehicle_type: Vec<String>,
    route_type: Vec<String>,
}

/// Ordinal encoder for one categorical column.
#[derive(Debug)]
struct ColumnEncoder {
    column: &'static str,
    index: HashMap<String, usize>,
}

impl ColumnEncoder {
    fn new(column: &'static str, vocabulary: Vec<String>) -> Self {
        let index = vocabulary
            .into_iter()
            .enumerate()
            .map(|(i, v)| (v, i))
            .collect();
        Self { column, index }
    }

    /// Encode one value, failing on anything not seen during training.
    fn encode(&self, value: &str) -> Result<f32> {
        self.index.get(value).map(|&i| i as f32).ok_or_else(|| {
            anyhow!(
                "value '{}' for column '{}' not seen during training",
                value,
                self.column
            )
        })
    }
}

/// Emission model backed by an ONNX Runtime session.
///
/// `Session::run` takes the session mutably and re-entrancy of the
/// underlying inference path is not guaranteed, so calls are serialized
/// behind a mutex. Everything else is immutable after load.
pub struct OnnxEmissionModel {
    session: Mutex<Session>,
    input_name: String,
    output_name: String,
    origin_encoder: ColumnEncoder,
    vehicle_encoder: ColumnEncoder,
    route_encoder: ColumnEncoder,
}

impl OnnxEmissionModel {
    /// Load the ONNX artifact at `path` and its sibling feature
    /// vocabulary file (`<model>.features.json`).
    pub fn load<P: AsRef<Path>>(path: P, onnx_threads: usize) -> Result<Self> {
        let path = path.as_ref();

        // Initialize ONNX Runtime (no-op after the first call)
        ort::init().commit()?;

        info!(path = %path.display(), threads = onnx_threads, "Loading ONNX model");

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(onnx_threads)?
            .commit_from_file(path)
            .context(format!("Failed to load model from {:?}", path))?;

        let input_name = session
            .inputs
            .first()
            .map(|i| i.name.clone())
            .unwrap_or_else(|| "float_input".to_string());

        let output_name = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .unwrap_or_else(|| "variable".to_string());

        let vocab_path = path.with_extension("features.json");
        let vocab_raw = std::fs::read_to_string(&vocab_path).context(format!(
            "Failed to read feature vocabulary from {:?}",
            vocab_path
        ))?;
        let vocab: FeatureVocab =
            serde_json::from_str(&vocab_raw).context("Failed to parse feature vocabulary")?;

        info!(
            input = %input_name,
            output = %output_name,
            facilities = vocab.origin_facility.len(),
            vehicle_types = vocab.vehicle_type.len(),
            route_types = vocab.route_type.len(),
            "Model loaded successfully"
        );

        Ok(Self {
            session: Mutex::new(session),
            input_name,
            output_name,
            origin_encoder: ColumnEncoder::new("origin_facility", vocab.origin_facility),
            vehicle_encoder: ColumnEncoder::new("vehicle_type", vocab.vehicle_type),
            route_encoder: ColumnEncoder::new("route_type", vocab.route_type),
        })
    }

    /// Encode a batch into a flat row-major feature buffer, one value per
    /// column of [`crate::models::gateway::MODEL_COLUMNS`], in that order.
    fn encode_batch(&self, batch: &RowBatch) -> Result<Vec<f32>> {
        let mut features = Vec::with_capacity(batch.len() * 4);
        for row in 0..batch.len() {
            features.push(self.origin_encoder.encode(&batch.origin_facility[row])?);
            features.push(self.vehicle_encoder.encode(&batch.vehicle_type[row])?);
            features.push(self.route_encoder.encode(&batch.route_type[row])?);
            features.push(batch.distance_km[row] as f32);
        }
        Ok(features)
    }
}

impl EmissionModel for OnnxEmissionModel {
    fn predict(&self, batch: &RowBatch) -> Result<Vec<f64>> {
        use ort::value::Tensor;

        let rows = batch.len();
        if rows == 0 {
            return Ok(Vec::new());
        }

        let features = self.encode_batch(batch)?;

        // Input tensor shape [rows, num_columns]
        let shape = vec![rows as i64, 4_i64];
        let input_tensor =
            Tensor::from_array((shape, features)).context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|e| anyhow!("Lock error: {}", e))?;

        let outputs = session.run(ort::inputs![&self.input_name => input_tensor])?;

        let output = outputs
            .get(&self.output_name)
            .ok_or_else(|| anyhow!("model output '{}' missing", self.output_name))?;

        let (out_shape, data) = output
            .try_extract_tensor::<f32>()
            .context("Failed to extract prediction tensor")?;

        // Regression output is [rows, 1] or [rows]
        if data.len() < rows {
            return Err(anyhow!(
                "model returned {} values for {} rows (output shape {:?})",
                data.len(),
                rows,
                out_shape
            ));
        }

        let predictions: Vec<f64> = data[..rows].iter().map(|&v| v as f64).collect();
        debug!(rows = rows, "ONNX inference complete");
        Ok(predictions)
    }
}
