//! Replicate groups and the replicate-count specification.

use super::dataset::{Dataset, Record};
use crate::error::{DdctError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// How many consecutive records form each replicate group.
///
/// Deserializes from a plain integer (`replicates: 3`) or a list
/// (`replicates: [3, 3, 2]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplicateSpec {
    /// Every group has the same size.
    Uniform(usize),
    /// Per-group sizes, in group order.
    Sizes(Vec<usize>),
}

impl Default for ReplicateSpec {
    fn default() -> Self {
        Self::Uniform(3)
    }
}

impl From<usize> for ReplicateSpec {
    fn from(n: usize) -> Self {
        Self::Uniform(n)
    }
}

impl From<Vec<usize>> for ReplicateSpec {
    fn from(sizes: Vec<usize>) -> Self {
        Self::Sizes(sizes)
    }
}

impl ReplicateSpec {
    /// Resolve the concrete group sizes for a dataset of `n_records`.
    ///
    /// Fails with `SizeMismatch` when the sizes do not cover the dataset
    /// exactly.
    pub fn group_sizes(&self, n_records: usize, dataset: &str) -> Result<Vec<usize>> {
        match self {
            Self::Uniform(n) => {
                if *n == 0 {
                    return Err(DdctError::InvalidParameter(
                        "Replicate count must be positive".to_string(),
                    ));
                }
                if n_records % n != 0 {
                    return Err(DdctError::SizeMismatch {
                        dataset: dataset.to_string(),
                        records: n_records,
                        detail: format!("not divisible into groups of {}", n),
                    });
                }
                Ok(vec![*n; n_records / n])
            }
            Self::Sizes(sizes) => {
                if sizes.iter().any(|&s| s == 0) {
                    return Err(DdctError::InvalidParameter(
                        "Replicate group sizes must be positive".to_string(),
                    ));
                }
                let total: usize = sizes.iter().sum();
                if total != n_records {
                    return Err(DdctError::SizeMismatch {
                        dataset: dataset.to_string(),
                        records: n_records,
                        detail: format!("group sizes {:?} sum to {}", sizes, total),
                    });
                }
                Ok(sizes.clone())
            }
        }
    }
}

/// One named replicate group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicateGroup {
    /// Group key.
    pub name: String,
    /// Records in source order.
    pub records: Vec<Record>,
}

impl ReplicateGroup {
    /// Ct values of this group.
    pub fn cts(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.ct).collect()
    }

    /// Number of replicates.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A dataset partitioned into ordered, uniquely named replicate groups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GroupedDatasetRepr")]
pub struct GroupedDataset {
    id: String,
    groups: Vec<ReplicateGroup>,
}

#[derive(Deserialize)]
struct GroupedDatasetRepr {
    id: String,
    groups: Vec<ReplicateGroup>,
}

impl TryFrom<GroupedDatasetRepr> for GroupedDataset {
    type Error = DdctError;

    fn try_from(repr: GroupedDatasetRepr) -> Result<Self> {
        Self::new(repr.id, repr.groups)
    }
}

impl GroupedDataset {
    /// Create a grouped dataset, checking that group keys are unique.
    pub fn new(id: impl Into<String>, groups: Vec<ReplicateGroup>) -> Result<Self> {
        ensure_unique(groups.iter().map(|g| g.name.as_str()))?;
        Ok(Self {
            id: id.into(),
            groups,
        })
    }

    /// Run identifier of the source dataset.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Groups in order.
    #[inline]
    pub fn groups(&self) -> &[ReplicateGroup] {
        &self.groups
    }

    /// Look up a group by key.
    pub fn group(&self, name: &str) -> Option<&ReplicateGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Group keys in order.
    pub fn keys(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.name.as_str()).collect()
    }

    /// Number of groups.
    #[inline]
    pub fn n_groups(&self) -> usize {
        self.groups.len()
    }

    /// Total number of records across groups.
    pub fn n_records(&self) -> usize {
        self.groups.iter().map(|g| g.records.len()).sum()
    }

    /// Check if there are no records at all.
    pub fn is_empty(&self) -> bool {
        self.n_records() == 0
    }

    /// Concatenate the groups back into a flat dataset.
    pub fn flatten(&self) -> Dataset {
        let records = self
            .groups
            .iter()
            .flat_map(|g| g.records.iter().cloned())
            .collect();
        Dataset::new(self.id.clone(), records)
    }
}

/// Reject duplicate keys.
pub(crate) fn ensure_unique<'a, I: IntoIterator<Item = &'a str>>(names: I) -> Result<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(DdctError::NamingMismatch(format!(
                "duplicate group name '{}'",
                name
            )));
        }
    }
    Ok(())
}
