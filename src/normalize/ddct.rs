//! Delta-Delta-Ct: normalizing a target against a reference.

use super::ensure_compatible;
use crate::data::{DeltaCtResult, NormalizedResult, ReplicateTable, ValueGroup};
use crate::error::Result;

/// Normalize a target's Delta-Ct values against a normalizer.
///
/// The transform is taken from the inputs, never chosen here: both must
/// carry the same one. Exponential values are divided, linear values are
/// subtracted, replicate by replicate.
///
/// # Arguments
/// * `sample` - Delta-Ct of the target assay
/// * `normalizer` - Delta-Ct of the (possibly combined) reference
///
/// # Returns
/// A NormalizedResult with the sample's group keys and order.
pub fn normalize(sample: &DeltaCtResult, normalizer: &DeltaCtResult) -> Result<NormalizedResult> {
    ensure_compatible(sample, normalizer)?;

    let transform = sample.transform();
    let groups = sample
        .groups()
        .iter()
        .zip(normalizer.groups())
        .map(|(s, n)| {
            let values = s
                .values
                .iter()
                .zip(&n.values)
                .map(|(&sv, &nv)| transform.normalize(sv, nv))
                .collect();
            ValueGroup::new(s.name.clone(), values)
        })
        .collect();

    tracing::debug!(
        sample = sample.id(),
        normalizer = normalizer.id(),
        transform = %transform,
        "normalized"
    );
    Ok(NormalizedResult::new(
        sample.id(),
        normalizer.id(),
        transform,
        groups,
    ))
}
