//! Pairwise normalization of independent (target, normalizer) pairs.

use super::ddct::normalize;
use crate::data::{DeltaCtResult, NormalizedResult};
use crate::error::{DdctError, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A normalized result labelled with its pair name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedResult {
    /// Pair name (positional index unless supplied).
    pub name: String,
    /// Normalized values for this pair.
    pub result: NormalizedResult,
}

/// Normalize `targets[i]` against `normalizers[i]` for every `i`.
///
/// Pairs are independent and evaluated in parallel; output order follows
/// input order. Each pair must pass the same checks as [`normalize`].
///
/// # Arguments
/// * `targets` - Delta-Ct results of the target assays
/// * `normalizers` - Delta-Ct results of the matching references
/// * `names` - Optional pair names; defaults to "0", "1", ...
pub fn normalize_pairwise(
    targets: &[DeltaCtResult],
    normalizers: &[DeltaCtResult],
    names: Option<&[String]>,
) -> Result<Vec<NamedResult>> {
    if targets.len() != normalizers.len() {
        return Err(DdctError::LengthMismatch {
            targets: targets.len(),
            normalizers: normalizers.len(),
        });
    }

    let names: Vec<String> = match names {
        Some(names) if names.len() != targets.len() => {
            return Err(DdctError::NamingMismatch(format!(
                "{} pair names supplied for {} pairs",
                names.len(),
                targets.len()
            )));
        }
        Some(names) => names.to_vec(),
        None => (0..targets.len()).map(|i| i.to_string()).collect(),
    };

    let outcomes: Vec<Result<NamedResult>> = targets
        .par_iter()
        .zip(normalizers.par_iter())
        .zip(names.into_par_iter())
        .map(|((target, normalizer), name)| {
            normalize(target, normalizer).map(|result| NamedResult { name, result })
        })
        .collect();
    // Sequential collect so the reported error is the first in input order.
    let results = outcomes.into_iter().collect::<Result<Vec<_>>>()?;

    tracing::info!(pairs = results.len(), "pairwise normalization complete");
    Ok(results)
}
