//! Per-dataset analysis: grouping, optional outlier filtering and Delta-Ct.

use crate::data::{Dataset, DeltaCtResult, GroupedDataset, ReplicateSpec, Statistic, Transform};
use crate::delta::{self, AnchorPolicy};
use crate::error::{DdctError, Result};
use crate::filter::{FilterConfig, FilterReport};
use crate::group::group_replicates;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// A step applied to every dataset, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisStep {
    /// Partition records into replicate groups.
    Group,
    /// Mask or drop outlier replicates.
    Filter,
    /// Express Cts relative to their anchor.
    DeltaCt,
}

impl fmt::Display for AnalysisStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Group => "group",
            Self::Filter => "filter",
            Self::DeltaCt => "delta-ct",
        };
        f.write_str(name)
    }
}

/// Analysis configuration for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Replicates per group: one size for all groups or one per group.
    pub replicates: ReplicateSpec,
    /// Group keys; `Group1`.. when absent.
    pub group_names: Option<Vec<String>>,
    /// Anchor for Delta-Ct.
    pub anchor: AnchorPolicy,
    /// Exponential fold change or linear difference.
    pub transform: Transform,
    /// Statistics reported per group.
    pub statistics: Vec<Statistic>,
    /// Optional outlier filter run after grouping.
    pub filter: Option<FilterConfig>,
    /// Write result files.
    pub export: bool,
    /// One row per group in exported tables.
    pub transpose: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            replicates: ReplicateSpec::default(),
            group_names: None,
            anchor: AnchorPolicy::default(),
            transform: Transform::default(),
            statistics: Statistic::defaults(),
            filter: None,
            export: true,
            transpose: false,
        }
    }
}

impl AnalysisConfig {
    /// Load from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(DdctError::from)
    }

    /// Save to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(DdctError::from)
    }

    /// Load from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }
}

/// Delta-Ct values of one dataset plus the filter report, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysedDataset {
    pub delta: DeltaCtResult,
    pub filter_report: Option<FilterReport>,
}

/// Builder for the per-dataset analysis.
#[derive(Debug, Clone, Default)]
pub struct Analysis {
    config: AnalysisConfig,
}

impl Analysis {
    /// Create an analysis with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from a config.
    pub fn from_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Current configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Set replicates per group.
    pub fn replicates(mut self, spec: impl Into<ReplicateSpec>) -> Self {
        self.config.replicates = spec.into();
        self
    }

    /// Set group keys.
    pub fn group_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.config.group_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn anchor(mut self, anchor: AnchorPolicy) -> Self {
        self.config.anchor = anchor;
        self
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.config.transform = transform;
        self
    }

    /// Set the reported statistics.
    pub fn statistics(mut self, statistics: Vec<Statistic>) -> Self {
        self.config.statistics = statistics;
        self
    }

    /// Add an outlier filter after grouping.
    pub fn filter(mut self, filter: FilterConfig) -> Self {
        self.config.filter = Some(filter);
        self
    }

    pub fn transpose(mut self, transpose: bool) -> Self {
        self.config.transpose = transpose;
        self
    }

    pub fn export(mut self, export: bool) -> Self {
        self.config.export = export;
        self
    }

    /// Steps run for every dataset.
    pub fn steps(&self) -> Vec<AnalysisStep> {
        let mut steps = vec![AnalysisStep::Group];
        if self.config.filter.is_some() {
            steps.push(AnalysisStep::Filter);
        }
        steps.push(AnalysisStep::DeltaCt);
        steps
    }

    /// Group and filter a dataset.
    pub fn prepare(&self, dataset: &Dataset) -> Result<GroupedDataset> {
        self.prepare_with_report(dataset).map(|(grouped, _)| grouped)
    }

    /// Group and filter a dataset, keeping the filter report.
    pub fn prepare_with_report(
        &self,
        dataset: &Dataset,
    ) -> Result<(GroupedDataset, Option<FilterReport>)> {
        let grouped = group_replicates(
            dataset,
            &self.config.replicates,
            self.config.group_names.as_deref(),
        )
        .map_err(|e| step_error(dataset.id(), AnalysisStep::Group, e))?;

        match &self.config.filter {
            None => Ok((grouped, None)),
            Some(filter) => {
                let (filtered, report) = filter
                    .build()
                    .apply(&grouped)
                    .map_err(|e| step_error(dataset.id(), AnalysisStep::Filter, e))?;
                Ok((filtered, Some(report)))
            }
        }
    }

    /// Delta-Ct values of a dataset.
    pub fn delta_ct(&self, dataset: &Dataset) -> Result<DeltaCtResult> {
        self.analyse(dataset).map(|a| a.delta)
    }

    /// Run every step on a dataset.
    pub fn analyse(&self, dataset: &Dataset) -> Result<AnalysedDataset> {
        let (grouped, filter_report) = self.prepare_with_report(dataset)?;
        let delta = delta::analyse(&grouped, &self.config.anchor, self.config.transform)
            .map_err(|e| step_error(dataset.id(), AnalysisStep::DeltaCt, e))?;

        tracing::debug!(
            dataset = dataset.id(),
            groups = grouped.n_groups(),
            transform = %self.config.transform,
            "analysed dataset"
        );
        Ok(AnalysedDataset {
            delta,
            filter_report,
        })
    }
}

fn step_error(dataset: &str, step: AnalysisStep, e: DdctError) -> DdctError {
    DdctError::Pipeline(format!("'{}': step {} failed: {}", dataset, step, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ReplicateTable;
    use crate::filter::OutlierAction;

    fn create_test_dataset() -> Dataset {
        Dataset::from_pairs(
            "target",
            vec![("g_1", 10.0), ("g_2", 10.2), ("h_1", 5.0), ("h_2", 5.4)],
        )
    }

    #[test]
    fn test_analysis_builder() {
        let analysis = Analysis::new()
            .replicates(ReplicateSpec::Uniform(2))
            .group_names(["ctrl", "treated"])
            .transform(Transform::Linear)
            .filter(FilterConfig::Iqr {
                lower: 1.5,
                upper: 1.5,
                ignore_nan: true,
                action: OutlierAction::Mask,
            });

        assert_eq!(
            analysis.steps(),
            vec![AnalysisStep::Group, AnalysisStep::Filter, AnalysisStep::DeltaCt]
        );
        assert_eq!(analysis.config().replicates, ReplicateSpec::Uniform(2));
    }

    #[test]
    fn test_delta_ct_linear() {
        let analysis = Analysis::new().replicates(ReplicateSpec::Uniform(2)).transform(Transform::Linear);
        let result = analysis.delta_ct(&create_test_dataset()).unwrap();

        assert_eq!(result.id(), "target");
        let g1 = &result.group("Group1").unwrap().values;
        assert_eq!(g1[0], 0.0);
        assert!((g1[1] - 0.2).abs() < 1e-9);
        let g2 = &result.group("Group2").unwrap().values;
        assert!((g2[1] - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_step_errors_name_the_dataset() {
        let analysis = Analysis::new().replicates(ReplicateSpec::Sizes(vec![2, 1]));
        let err = analysis.prepare(&create_test_dataset()).unwrap_err();

        match err {
            DdctError::Pipeline(msg) => {
                assert!(msg.contains("'target'"));
                assert!(msg.contains("group"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_filter_masks_before_delta_ct() {
        let ds = Dataset::from_pairs(
            "run",
            vec![("a", 20.0), ("b", 20.2), ("c", 24.0)],
        );
        let analysis = Analysis::new()
            .replicates(ReplicateSpec::Uniform(3))
            .transform(Transform::Linear)
            .filter(FilterConfig::Range {
                lower: 1.0,
                upper: 1.0,
                anchor: Default::default(),
                ignore_nan: true,
                action: OutlierAction::Mask,
            });

        let analysed = analysis.analyse(&ds).unwrap();
        let values = &analysed.delta.group("Group1").unwrap().values;
        assert_eq!(values.len(), 3);
        assert!(values[2].is_nan());
        assert_eq!(analysed.filter_report.unwrap().n_flagged(), 1);
    }

    #[test]
    fn test_masked_first_replicate_keeps_group() {
        let ds = Dataset::from_pairs(
            "run",
            vec![
                ("a_1", 25.0),
                ("a_2", 20.0),
                ("a_3", 20.1),
                ("b_1", 18.0),
                ("b_2", 18.1),
                ("b_3", 18.2),
            ],
        );
        let base = Analysis::new()
            .replicates(ReplicateSpec::Uniform(3))
            .transform(Transform::Linear)
            .filter(FilterConfig::Range {
                lower: 1.0,
                upper: 1.0,
                anchor: Default::default(),
                ignore_nan: true,
                action: OutlierAction::Mask,
            });

        let grouped = base.clone().anchor(AnchorPolicy::Grouped).delta_ct(&ds).unwrap();
        let a = &grouped.group("Group1").unwrap().values;
        assert!(a[0].is_nan());
        assert_eq!(a[1], 0.0);
        assert!((a[2] - 0.1).abs() < 1e-9);
        assert_eq!(grouped.group("Group2").unwrap().values[0], 0.0);

        let first = base.anchor(AnchorPolicy::First).delta_ct(&ds).unwrap();
        let b = &first.group("Group2").unwrap().values;
        assert!((b[0] + 2.0).abs() < 1e-9);
        assert!((b[2] + 1.8).abs() < 1e-9);
    }

    #[test]
    fn test_undetermined_first_well() {
        let ds = Dataset::from_pairs("run", vec![("a", f64::NAN), ("b", 20.0), ("c", 21.0)]);
        let result = Analysis::new()
            .replicates(ReplicateSpec::Uniform(3))
            .delta_ct(&ds)
            .unwrap();

        let values = &result.group("Group1").unwrap().values;
        assert!(values[0].is_nan());
        assert_eq!(values[1], 1.0);
        assert!((values[2] - 0.5).abs() < 1e-12);

        let all_missing = Dataset::from_pairs("run", vec![("a", f64::NAN), ("b", f64::NAN)]);
        let err = Analysis::new()
            .replicates(ReplicateSpec::Uniform(2))
            .delta_ct(&all_missing)
            .unwrap_err();
        assert!(err.to_string().contains("Group1"));
    }

    #[test]
    fn test_config_yaml() {
        let yaml = r#"
replicates: [2, 3]
group_names: [wt, ko]
anchor: first
transform: linear
statistics: [mean, median]
filter:
  method: iqr
transpose: true
"#;
        let config = AnalysisConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.replicates, ReplicateSpec::Sizes(vec![2, 3]));
        assert_eq!(config.anchor, AnchorPolicy::First);
        assert_eq!(config.transform, Transform::Linear);
        assert_eq!(config.statistics, vec![Statistic::Mean, Statistic::Median]);
        assert!(config.export);
        assert!(config.transpose);

        let restored = AnalysisConfig::from_yaml(&config.to_yaml().unwrap()).unwrap();
        assert_eq!(restored, config);
    }

    #[test]
    fn test_config_defaults() {
        let config = AnalysisConfig::from_yaml("anchor: 18.5").unwrap();
        assert_eq!(config.anchor, AnchorPolicy::Value(18.5));
        assert_eq!(config.replicates, ReplicateSpec::Uniform(3));
        assert_eq!(config.transform, Transform::Exponential);
        assert_eq!(config.statistics, Statistic::defaults());
        assert!(config.filter.is_none());
    }
}
