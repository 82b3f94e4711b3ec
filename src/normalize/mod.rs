//! Normalization against reference genes.
//!
//! This module provides the Delta-Delta-Ct steps:
//!
//! - **combine**: average several reference genes into one normalizer
//! - **ddct**: normalize one target against one normalizer
//! - **pairwise**: normalize a list of targets against a parallel list of
//!   normalizers

pub mod combine;
pub mod ddct;
pub mod pairwise;

pub use combine::combine_normalizers;
pub use ddct::normalize;
pub use pairwise::{normalize_pairwise, NamedResult};

use crate::data::ReplicateTable;
use crate::error::{DdctError, Result};

/// Check that two tables can be combined position by position.
///
/// Group keys must match in content and order, the transform must be the
/// same, and every group must hold the same number of replicates.
pub fn ensure_compatible<A, B>(left: &A, right: &B) -> Result<()>
where
    A: ReplicateTable + ?Sized,
    B: ReplicateTable + ?Sized,
{
    let left_keys = left.keys();
    let right_keys = right.keys();
    if left_keys != right_keys {
        let detail = if left_keys.len() != right_keys.len() {
            format!(
                "{} groups {:?} vs {} groups {:?}",
                left_keys.len(),
                left_keys,
                right_keys.len(),
                right_keys
            )
        } else {
            let mut sorted_left = left_keys.clone();
            let mut sorted_right = right_keys.clone();
            sorted_left.sort_unstable();
            sorted_right.sort_unstable();
            if sorted_left == sorted_right {
                format!("same groups in different order: {:?} vs {:?}", left_keys, right_keys)
            } else {
                format!("groups {:?} vs {:?}", left_keys, right_keys)
            }
        };
        return Err(DdctError::GroupMismatch {
            left: left.id().to_string(),
            right: right.id().to_string(),
            detail,
        });
    }

    if left.transform() != right.transform() {
        return Err(DdctError::TransformMismatch {
            left: left.id().to_string(),
            left_transform: left.transform().to_string(),
            right: right.id().to_string(),
            right_transform: right.transform().to_string(),
        });
    }

    for (l, r) in left.groups().iter().zip(right.groups()) {
        if l.values.len() != r.values.len() {
            return Err(DdctError::ReplicateCountMismatch {
                group: l.name.clone(),
                left: left.id().to_string(),
                left_count: l.values.len(),
                right: right.id().to_string(),
                right_count: r.values.len(),
            });
        }
    }

    Ok(())
}
