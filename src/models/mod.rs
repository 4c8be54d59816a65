//! Model artifact loading and the prediction gateway

pub mod gateway;
pub mod loader;

use anyhow::Result;
use gateway::RowBatch;

pub use gateway::{ModelError, ModelGateway};
pub use loader::OnnxEmissionModel;

/// Capability exposed by a loaded emission model artifact.
///
/// The gateway treats the artifact as opaque: anything that can score an
/// ordered batch of rows satisfies this trait, whether it is the ONNX
/// session used in production or a fixture returning canned values in
/// tests. Implementations must return exactly one prediction per input
/// row, in input order.
pub trait EmissionModel: Send + Sync {
    /// Predict emission in kg CO2e for every row in the batch.
    fn predict(&self, batch: &RowBatch) -> Result<Vec<f64>>;
}
