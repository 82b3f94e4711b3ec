//! Per-group descriptive statistics.

use crate::error::{DdctError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A statistic the summarizer can compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Statistic {
    /// Arithmetic mean.
    Mean,
    /// Sample standard deviation (n - 1).
    Stdev,
    /// Median.
    Median,
}

impl Statistic {
    /// Default selection: mean and standard deviation.
    pub fn defaults() -> Vec<Self> {
        vec![Self::Mean, Self::Stdev]
    }

    /// Get the descriptive name, also used as export column header.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Mean => "mean",
            Self::Stdev => "stdev",
            Self::Median => "median",
        }
    }
}

impl fmt::Display for Statistic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Statistic {
    type Err = DdctError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mean" | "avg" => Ok(Self::Mean),
            "stdev" | "std" | "sd" => Ok(Self::Stdev),
            "median" => Ok(Self::Median),
            other => Err(DdctError::InvalidParameter(format!(
                "Unknown statistic '{}', expected mean, stdev or median",
                other
            ))),
        }
    }
}

/// Selected statistics for one group. Unrequested fields are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSummary {
    /// Group key.
    pub group: String,
    pub mean: Option<f64>,
    pub stdev: Option<f64>,
    pub median: Option<f64>,
}

impl GroupSummary {
    /// Create an empty summary for a group.
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            mean: None,
            stdev: None,
            median: None,
        }
    }

    /// Get a statistic by kind.
    pub fn get(&self, stat: Statistic) -> Option<f64> {
        match stat {
            Statistic::Mean => self.mean,
            Statistic::Stdev => self.stdev,
            Statistic::Median => self.median,
        }
    }

    /// Set a statistic by kind.
    pub fn set(&mut self, stat: Statistic, value: f64) {
        match stat {
            Statistic::Mean => self.mean = Some(value),
            Statistic::Stdev => self.stdev = Some(value),
            Statistic::Median => self.median = Some(value),
        }
    }
}

/// Summaries of every group of a table, in group order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResult {
    id: String,
    statistics: Vec<Statistic>,
    groups: Vec<GroupSummary>,
}

impl SummaryResult {
    /// Create a new summary result.
    pub fn new(id: impl Into<String>, statistics: Vec<Statistic>, groups: Vec<GroupSummary>) -> Self {
        Self {
            id: id.into(),
            statistics,
            groups,
        }
    }

    /// Identifier of the summarized table.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Requested statistics in request order.
    pub fn statistics(&self) -> &[Statistic] {
        &self.statistics
    }

    /// Group summaries in order.
    pub fn groups(&self) -> &[GroupSummary] {
        &self.groups
    }

    /// Look up a group summary by key.
    pub fn group(&self, name: &str) -> Option<&GroupSummary> {
        self.groups.iter().find(|g| g.group == name)
    }

    /// Group keys in order.
    pub fn keys(&self) -> Vec<&str> {
        self.groups.iter().map(|g| g.group.as_str()).collect()
    }
}

impl fmt::Display for SummaryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Summary: {}", self.id)?;
        write!(f, "  {:<16}", "group")?;
        for stat in &self.statistics {
            write!(f, "{:>12}", stat.name())?;
        }
        writeln!(f)?;
        for g in &self.groups {
            write!(f, "  {:<16}", g.group)?;
            for stat in &self.statistics {
                match g.get(*stat) {
                    Some(v) => write!(f, "{:>12.4}", v)?,
                    None => write!(f, "{:>12}", "-")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statistic_parse() {
        assert_eq!("SD".parse::<Statistic>().unwrap(), Statistic::Stdev);
        assert_eq!("median".parse::<Statistic>().unwrap(), Statistic::Median);
        assert!("variance".parse::<Statistic>().is_err());
    }

    #[test]
    fn test_group_summary_get_set() {
        let mut g = GroupSummary::new("wt");
        assert_eq!(g.get(Statistic::Mean), None);
        g.set(Statistic::Mean, 0.5);
        assert_eq!(g.get(Statistic::Mean), Some(0.5));
        assert_eq!(g.get(Statistic::Median), None);
    }

    #[test]
    fn test_display_lists_requested_columns() {
        let mut g = GroupSummary::new("ko");
        g.set(Statistic::Mean, 1.25);
        let summary = SummaryResult::new("run", vec![Statistic::Mean], vec![g]);
        let text = summary.to_string();
        assert!(text.contains("mean"));
        assert!(!text.contains("stdev"));
        assert!(text.contains("1.2500"));
    }
}
