//! Interquartile-range outlier filter.

use super::{ensure_non_negative, Filter, FilterOptions, OutlierAction};
use crate::data::{GroupedDataset, ReplicateGroup};
use crate::error::Result;
use crate::stats::{median, quantile};

/// Default IQR multiplier on each side of the median.
pub const DEFAULT_SCALE: f64 = 1.5;

/// Lower and upper quantiles that span the IQR.
const LOWER_QUANTILE: f64 = 0.26;
const UPPER_QUANTILE: f64 = 0.76;

/// Flags replicates outside `median -/+ IQR * scale`.
///
/// The IQR is taken over the group's finite Ct values with linear
/// interpolation between ranks.
#[derive(Debug, Clone, PartialEq)]
pub struct IqrFilter {
    lower: f64,
    upper: f64,
    options: FilterOptions,
}

impl Default for IqrFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl IqrFilter {
    /// Create a filter with the default `1.5 * IQR` scales.
    pub fn new() -> Self {
        Self {
            lower: DEFAULT_SCALE,
            upper: DEFAULT_SCALE,
            options: FilterOptions::default(),
        }
    }

    /// Set both IQR multipliers.
    pub fn with_scale(self, scale: f64) -> Self {
        self.with_scales(scale, scale)
    }

    /// Set lower and upper IQR multipliers.
    pub fn with_scales(mut self, lower: f64, upper: f64) -> Self {
        self.lower = lower;
        self.upper = upper;
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

impl Filter for IqrFilter {
    fn name(&self) -> &'static str {
        "IqrFilter"
    }

    fn options(&self) -> FilterOptions {
        self.options
    }

    fn validate(&self, _grouped: &GroupedDataset) -> Result<()> {
        ensure_non_negative(self.name(), self.lower, self.upper)
    }

    fn bounds(&self, _index: usize, group: &ReplicateGroup) -> Result<(f64, f64, f64)> {
        let cts = group.cts();
        let anchor = median(&cts);
        let iqr = quantile(&cts, UPPER_QUANTILE) - quantile(&cts, LOWER_QUANTILE);
        Ok((anchor, anchor - iqr * self.lower, anchor + iqr * self.upper))
    }
}
