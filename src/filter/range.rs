//! Fixed-width inclusion range around an anchor Ct.

use super::{ensure_non_negative, Filter, FilterOptions, OutlierAction};
use crate::data::{GroupedDataset, ReplicateGroup};
use crate::error::{DdctError, Result};
use crate::stats::median;
use serde::{Deserialize, Serialize};

/// Default half-width of the inclusion range, in cycles.
pub const DEFAULT_LIMIT: f64 = 1.0;

/// Center of the inclusion range.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangeAnchor {
    /// Median of the group's Ct values.
    #[default]
    Median,
    /// The same Ct for every group.
    Value(f64),
    /// One Ct per group, in group order.
    PerGroup(Vec<f64>),
}

/// Flags replicates outside `[anchor - lower, anchor + upper]`.
///
/// Defaults to `+/- 1` cycle around the group median.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeFilter {
    anchor: RangeAnchor,
    lower: f64,
    upper: f64,
    options: FilterOptions,
}

impl Default for RangeFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl RangeFilter {
    /// Create a filter with the default range.
    pub fn new() -> Self {
        Self {
            anchor: RangeAnchor::Median,
            lower: DEFAULT_LIMIT,
            upper: DEFAULT_LIMIT,
            options: FilterOptions::default(),
        }
    }

    /// Set a symmetric range half-width.
    pub fn with_limit(self, limit: f64) -> Self {
        self.with_limits(limit, limit)
    }

    /// Set lower and upper distances from the anchor.
    pub fn with_limits(mut self, lower: f64, upper: f64) -> Self {
        self.lower = lower;
        self.upper = upper;
        self
    }

    /// Set the range anchor.
    pub fn with_anchor(mut self, anchor: RangeAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    /// Set NaN handling and outlier action together.
    pub fn with_options(mut self, options: FilterOptions) -> Self {
        self.options = options;
        self
    }

    /// Skip groups with a NaN anchor (`true`) or fail on them (`false`).
    pub fn ignore_nan(mut self, ignore: bool) -> Self {
        self.options.ignore_nan = ignore;
        self
    }

    /// Set what happens to flagged replicates.
    pub fn action(mut self, action: OutlierAction) -> Self {
        self.options.action = action;
        self
    }
}

impl Filter for RangeFilter {
    fn name(&self) -> &'static str {
        "RangeFilter"
    }

    fn options(&self) -> FilterOptions {
        self.options
    }

    fn validate(&self, grouped: &GroupedDataset) -> Result<()> {
        ensure_non_negative(self.name(), self.lower, self.upper)?;
        if let RangeAnchor::PerGroup(anchors) = &self.anchor {
            if anchors.len() != grouped.n_groups() {
                return Err(DdctError::InvalidParameter(format!(
                    "{} range anchors supplied for {} groups in '{}'",
                    anchors.len(),
                    grouped.n_groups(),
                    grouped.id()
                )));
            }
        }
        Ok(())
    }

    fn bounds(&self, index: usize, group: &ReplicateGroup) -> Result<(f64, f64, f64)> {
        let anchor = match &self.anchor {
            RangeAnchor::Median => median(&group.cts()),
            RangeAnchor::Value(v) => *v,
            RangeAnchor::PerGroup(anchors) => *anchors.get(index).ok_or_else(|| {
                DdctError::InvalidParameter(format!("no range anchor for group '{}'", group.name))
            })?,
        };
        Ok((anchor, anchor - self.lower, anchor + self.upper))
    }
}
