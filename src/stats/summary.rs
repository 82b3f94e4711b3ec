//! Collapse replicate values into per-group statistics.

use super::robust::{finite_values, median};
use crate::data::{GroupSummary, ReplicateTable, Statistic, SummaryResult};
use crate::error::{DdctError, Result};
use statrs::statistics::Statistics;

/// Summarize every group of a table.
///
/// Non-finite values are skipped. The standard deviation is the sample
/// standard deviation and is reported as `0.0` for a group with exactly
/// one usable replicate; callers that need statistical validity must
/// check replicate counts themselves. A group with no usable replicate
/// reports `NaN` for every statistic.
///
/// # Arguments
/// * `table` - Delta-Ct or normalized values
/// * `statistics` - Statistics to compute; duplicates are ignored
pub fn summarize<T>(table: &T, statistics: &[Statistic]) -> Result<SummaryResult>
where
    T: ReplicateTable + ?Sized,
{
    if statistics.is_empty() {
        return Err(DdctError::InvalidParameter(
            "At least one statistic must be requested".to_string(),
        ));
    }

    let mut requested: Vec<Statistic> = Vec::with_capacity(statistics.len());
    for stat in statistics {
        if !requested.contains(stat) {
            requested.push(*stat);
        }
    }

    let groups = table
        .groups()
        .iter()
        .map(|group| {
            let finite = finite_values(&group.values);
            let mut summary = GroupSummary::new(group.name.clone());
            for stat in &requested {
                let value = match stat {
                    _ if finite.is_empty() => f64::NAN,
                    Statistic::Mean => finite.iter().mean(),
                    Statistic::Stdev if finite.len() == 1 => 0.0,
                    Statistic::Stdev => finite.iter().std_dev(),
                    Statistic::Median => median(&finite),
                };
                summary.set(*stat, value);
            }
            summary
        })
        .collect();

    Ok(SummaryResult::new(table.id(), requested, groups))
}
