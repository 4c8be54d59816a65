//! Pure numeric derivation over predicted emission values.
//!
//! No I/O and no model access; everything here is a function of its inputs.

/// Aggregate figures for a batch of predictions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmissionTotals {
    /// Sum of per-item kg values, unrounded
    pub total_kg: f64,
    /// `total_kg / 1000`, never a sum of per-item tons
    pub total_tons: f64,
    /// Number of items aggregated
    pub count: usize,
}

/// Convert kilograms of CO2e to tons. No clamping, no rounding.
pub fn to_tons(kg: f64) -> f64 {
    kg / 1000.0
}

/// Sum a batch of per-item kg predictions into batch totals.
///
/// Tons are derived from the kg total so the two stay consistent instead
/// of accumulating per-item rounding drift. An empty slice yields zero
/// totals and count 0.
pub fn aggregate(kg_values: &[f64]) -> EmissionTotals {
    let total_kg: f64 = kg_values.iter().sum();
    EmissionTotals {
        total_kg,
        total_tons: to_tons(total_kg),
        count: kg_values.len(),
    }
}
