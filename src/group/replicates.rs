//! Partition a dataset into consecutive replicate groups.

use crate::data::{Dataset, GroupedDataset, ReplicateGroup, ReplicateSpec};
use crate::error::{DdctError, Result};

/// Group the records of a dataset into replicate groups.
///
/// Records are sliced into consecutive chunks whose sizes come from
/// `spec`. Groups are named `Group1`, `Group2`, ... unless `names` is
/// given, in which case it must hold one unique name per group.
///
/// # Arguments
/// * `dataset` - The raw records, in source order
/// * `spec` - Replicate count per group
/// * `names` - Optional group names, in group order
///
/// # Returns
/// A GroupedDataset preserving record order within and across groups.
pub fn group_replicates(
    dataset: &Dataset,
    spec: &ReplicateSpec,
    names: Option<&[String]>,
) -> Result<GroupedDataset> {
    let sizes = spec.group_sizes(dataset.len(), dataset.id())?;

    let names: Vec<String> = match names {
        Some(names) => {
            if names.len() != sizes.len() {
                return Err(DdctError::NamingMismatch(format!(
                    "{} group names supplied for {} groups in '{}'",
                    names.len(),
                    sizes.len(),
                    dataset.id()
                )));
            }
            names.to_vec()
        }
        None => default_group_names(sizes.len()),
    };

    let mut groups = Vec::with_capacity(sizes.len());
    let mut start = 0;
    for (name, size) in names.into_iter().zip(sizes) {
        let records = dataset.records()[start..start + size].to_vec();
        groups.push(ReplicateGroup { name, records });
        start += size;
    }

    let grouped = GroupedDataset::new(dataset.id(), groups)?;
    tracing::debug!(
        dataset = grouped.id(),
        groups = grouped.n_groups(),
        records = grouped.n_records(),
        "grouped replicates"
    );
    Ok(grouped)
}

/// Default group keys: `Group1` .. `GroupN`.
pub fn default_group_names(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("Group{}", i)).collect()
}
