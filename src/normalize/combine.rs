//! Averaging several reference genes into one normalizer.

use super::ensure_compatible;
use crate::data::{DeltaCtResult, ReplicateTable, ValueGroup};
use crate::error::{DdctError, Result};

/// Combine several normalizer Delta-Ct results into one.
///
/// Every input must share the same group keys, group order, replicate
/// counts and transform. The output value at each (group, replicate)
/// position is the arithmetic mean of the inputs at that position.
///
/// # Arguments
/// * `normalizers` - Delta-Ct results of the reference genes
///
/// # Returns
/// A DeltaCtResult shaped like any single input, identified by the
/// input ids joined with `+`.
pub fn combine_normalizers(normalizers: &[DeltaCtResult]) -> Result<DeltaCtResult> {
    let first = normalizers.first().ok_or_else(|| {
        DdctError::EmptyData("No normalizers to combine".to_string())
    })?;

    for other in &normalizers[1..] {
        ensure_compatible(first, other)?;
    }

    let n = normalizers.len() as f64;
    let groups = first
        .groups()
        .iter()
        .enumerate()
        .map(|(gi, group)| {
            let values = (0..group.values.len())
                .map(|ri| normalizers.iter().map(|t| t.groups()[gi].values[ri]).sum::<f64>() / n)
                .collect();
            ValueGroup::new(group.name.clone(), values)
        })
        .collect();

    let id = normalizers
        .iter()
        .map(|t| t.id())
        .collect::<Vec<_>>()
        .join("+");

    tracing::debug!(normalizer = %id, inputs = normalizers.len(), "combined normalizers");
    DeltaCtResult::new(id, first.transform(), groups)
}
