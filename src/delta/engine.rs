//! Delta-Ct computation within a single dataset.

use super::anchor::{resolve_anchor, AnchorPolicy, ResolvedAnchor};
use crate::data::{DeltaCtResult, GroupedDataset, Transform, ValueGroup};
use crate::error::{DdctError, Result};

/// Compute Delta-Ct values for every record of a grouped dataset.
///
/// # Formula
/// - Linear: `ct - anchor`
/// - Exponential: `2^-(ct - anchor)`, i.e. `2^(anchor - ct)`
///
/// # Arguments
/// * `grouped` - Replicate groups of one dataset
/// * `anchor` - Anchor resolved for this dataset
/// * `transform` - Numeric convention; recorded on the result
///
/// # Returns
/// A DeltaCtResult with the same group keys, order and replicate counts.
pub fn delta_ct(
    grouped: &GroupedDataset,
    anchor: &ResolvedAnchor,
    transform: Transform,
) -> Result<DeltaCtResult> {
    let groups = grouped
        .groups()
        .iter()
        .map(|group| {
            let reference = anchor.for_group(&group.name).ok_or_else(|| {
                DdctError::InvalidAnchor(format!(
                    "no anchor resolved for group '{}' of '{}'",
                    group.name,
                    grouped.id()
                ))
            })?;
            let values = group
                .records
                .iter()
                .map(|r| transform.relative(r.ct, reference))
                .collect();
            Ok(ValueGroup::new(group.name.clone(), values))
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        dataset = grouped.id(),
        transform = %transform,
        groups = groups.len(),
        "computed delta-ct"
    );
    DeltaCtResult::new(grouped.id(), transform, groups)
}

/// Resolve the anchor and compute Delta-Ct in one call.
pub fn analyse(
    grouped: &GroupedDataset,
    policy: &AnchorPolicy,
    transform: Transform,
) -> Result<DeltaCtResult> {
    let anchor = resolve_anchor(grouped, policy)?;
    delta_ct(grouped, &anchor, transform)
}
