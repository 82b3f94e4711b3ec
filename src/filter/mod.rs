//! Outlier filtering for raw replicate Ct values.
//!
//! Filters run on a grouped dataset before Delta-Ct analysis:
//!
//! - **range**: fixed inclusion range around an anchor (group median by default)
//! - **iqr**: inclusion range scaled by the group's interquartile range
//!
//! Flagged replicates are masked (Ct set to NaN) by default so replicate
//! counts stay aligned with the normalizers; dropping them is opt-in.

pub mod iqr;
pub mod range;

pub use iqr::IqrFilter;
pub use range::{RangeAnchor, RangeFilter};

use crate::data::{GroupedDataset, Record, ReplicateGroup};
use crate::error::{DdctError, Result};
use serde::{Deserialize, Serialize};

/// What happens to a replicate outside the inclusion range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutlierAction {
    /// Keep the record with a NaN Ct.
    #[default]
    Mask,
    /// Remove the record from its group.
    Drop,
}

/// Options shared by all filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    /// Skip groups whose anchor is NaN instead of failing.
    pub ignore_nan: bool,
    /// What to do with flagged replicates.
    pub action: OutlierAction,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            ignore_nan: true,
            action: OutlierAction::Mask,
        }
    }
}

/// Inclusion range used for one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupBounds {
    pub group: String,
    pub anchor: f64,
    pub lower: f64,
    pub upper: f64,
}

/// A replicate that fell outside its group's inclusion range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlaggedReplicate {
    pub group: String,
    /// Position within the group.
    pub position: usize,
    pub sample: String,
    pub ct: f64,
}

/// Summary of one filter run over one dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterReport {
    /// Filter name.
    pub filter: String,
    /// Dataset id.
    pub dataset: String,
    /// Inclusion ranges of filtered groups.
    pub bounds: Vec<GroupBounds>,
    /// Flagged replicates in group order.
    pub flagged: Vec<FlaggedReplicate>,
    /// Groups skipped because their anchor was NaN.
    pub skipped: Vec<String>,
}

impl FilterReport {
    /// Number of flagged replicates.
    pub fn n_flagged(&self) -> usize {
        self.flagged.len()
    }
}

impl std::fmt::Display for FilterReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Filter Report")?;
        writeln!(f, "  Filter:   {}", self.filter)?;
        writeln!(f, "  Dataset:  {}", self.dataset)?;
        writeln!(f, "  Flagged:  {} replicates", self.flagged.len())?;
        for b in &self.bounds {
            writeln!(
                f,
                "  {:<16} anchor={:.3} range=[{:.3}, {:.3}]",
                b.group, b.anchor, b.lower, b.upper
            )?;
        }
        for r in &self.flagged {
            writeln!(
                f,
                "  - {} #{} ({}): Ct {:.3}",
                r.group,
                r.position + 1,
                r.sample,
                r.ct
            )?;
        }
        if !self.skipped.is_empty() {
            writeln!(f, "  Skipped (NaN anchor): {}", self.skipped.join(", "))?;
        }
        Ok(())
    }
}

/// An outlier filter over replicate groups.
pub trait Filter {
    /// Filter name used in reports.
    fn name(&self) -> &'static str;

    /// Shared options.
    fn options(&self) -> FilterOptions;

    /// Check parameters against the dataset before filtering.
    fn validate(&self, grouped: &GroupedDataset) -> Result<()>;

    /// Inclusion range `(anchor, lower, upper)` for the group at `index`.
    fn bounds(&self, index: usize, group: &ReplicateGroup) -> Result<(f64, f64, f64)>;

    /// Apply the filter, returning the filtered dataset and a report.
    fn apply(&self, grouped: &GroupedDataset) -> Result<(GroupedDataset, FilterReport)> {
        self.validate(grouped)?;
        let options = self.options();

        let mut report = FilterReport {
            filter: self.name().to_string(),
            dataset: grouped.id().to_string(),
            bounds: Vec::new(),
            flagged: Vec::new(),
            skipped: Vec::new(),
        };

        let mut groups = Vec::with_capacity(grouped.n_groups());
        for (index, group) in grouped.groups().iter().enumerate() {
            let (anchor, lower, upper) = self.bounds(index, group)?;

            if anchor.is_nan() {
                if !options.ignore_nan {
                    return Err(DdctError::InvalidParameter(format!(
                        "{}: group '{}' of '{}' has a NaN anchor",
                        self.name(),
                        group.name,
                        grouped.id()
                    )));
                }
                tracing::warn!(
                    filter = self.name(),
                    dataset = grouped.id(),
                    group = %group.name,
                    "skipping group with NaN anchor"
                );
                report.skipped.push(group.name.clone());
                groups.push(group.clone());
                continue;
            }

            report.bounds.push(GroupBounds {
                group: group.name.clone(),
                anchor,
                lower,
                upper,
            });

            let mut records: Vec<Record> = Vec::with_capacity(group.records.len());
            for (position, record) in group.records.iter().enumerate() {
                let outside = record.ct < lower || record.ct > upper;
                if !outside {
                    records.push(record.clone());
                    continue;
                }
                report.flagged.push(FlaggedReplicate {
                    group: group.name.clone(),
                    position,
                    sample: record.sample.clone(),
                    ct: record.ct,
                });
                if options.action == OutlierAction::Mask {
                    records.push(Record::new(record.sample.clone(), f64::NAN));
                }
            }
            groups.push(ReplicateGroup {
                name: group.name.clone(),
                records,
            });
        }

        if !report.flagged.is_empty() {
            tracing::warn!(
                filter = self.name(),
                dataset = grouped.id(),
                flagged = report.flagged.len(),
                "outlier replicates flagged"
            );
        }

        let filtered = GroupedDataset::new(grouped.id(), groups)?;
        Ok((filtered, report))
    }
}

/// Filter selection for configuration files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum FilterConfig {
    /// Fixed range around an anchor.
    Range {
        #[serde(default = "default_range_limit")]
        lower: f64,
        #[serde(default = "default_range_limit")]
        upper: f64,
        #[serde(default)]
        anchor: RangeAnchor,
        #[serde(default = "default_true")]
        ignore_nan: bool,
        #[serde(default)]
        action: OutlierAction,
    },
    /// Range scaled by the interquartile range around the median.
    Iqr {
        #[serde(default = "default_iqr_scale")]
        lower: f64,
        #[serde(default = "default_iqr_scale")]
        upper: f64,
        #[serde(default = "default_true")]
        ignore_nan: bool,
        #[serde(default)]
        action: OutlierAction,
    },
}

fn default_range_limit() -> f64 {
    range::DEFAULT_LIMIT
}

fn default_iqr_scale() -> f64 {
    iqr::DEFAULT_SCALE
}

fn default_true() -> bool {
    true
}

impl FilterConfig {
    /// Build the configured filter.
    pub fn build(&self) -> Box<dyn Filter + Send + Sync> {
        match self {
            Self::Range {
                lower,
                upper,
                anchor,
                ignore_nan,
                action,
            } => Box::new(
                RangeFilter::new()
                    .with_limits(*lower, *upper)
                    .with_anchor(anchor.clone())
                    .with_options(FilterOptions {
                        ignore_nan: *ignore_nan,
                        action: *action,
                    }),
            ),
            Self::Iqr {
                lower,
                upper,
                ignore_nan,
                action,
            } => Box::new(
                IqrFilter::new()
                    .with_scales(*lower, *upper)
                    .with_options(FilterOptions {
                        ignore_nan: *ignore_nan,
                        action: *action,
                    }),
            ),
        }
    }
}

pub(crate) fn ensure_non_negative(name: &str, lower: f64, upper: f64) -> Result<()> {
    if !(lower >= 0.0 && upper >= 0.0) {
        return Err(DdctError::InvalidParameter(format!(
            "{} limits must be non-negative, got lower={} upper={}",
            name, lower, upper
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_config_yaml() {
        let yaml = "method: range\nlower: 0.5\nupper: 0.8\naction: drop\n";
        let config: FilterConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            config,
            FilterConfig::Range {
                lower: 0.5,
                upper: 0.8,
                anchor: RangeAnchor::Median,
                ignore_nan: true,
                action: OutlierAction::Drop,
            }
        );
        assert_eq!(config.build().name(), "RangeFilter");

        let iqr: FilterConfig = serde_yaml::from_str("method: iqr").unwrap();
        match iqr {
            FilterConfig::Iqr { lower, upper, .. } => {
                assert_eq!(lower, 1.5);
                assert_eq!(upper, 1.5);
            }
            other => panic!("unexpected config: {:?}", other),
        }
    }

    #[test]
    fn test_report_display() {
        let report = FilterReport {
            filter: "RangeFilter".into(),
            dataset: "actin".into(),
            bounds: vec![GroupBounds {
                group: "wt".into(),
                anchor: 20.0,
                lower: 19.0,
                upper: 21.0,
            }],
            flagged: vec![FlaggedReplicate {
                group: "wt".into(),
                position: 2,
                sample: "wt_3".into(),
                ct: 25.0,
            }],
            skipped: vec![],
        };
        let text = report.to_string();
        assert!(text.contains("Flagged:  1 replicates"));
        assert!(text.contains("wt #3 (wt_3)"));
    }
}
