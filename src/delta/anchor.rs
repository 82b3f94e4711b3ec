//! Reference Ct (anchor) resolution.

use crate::data::GroupedDataset;
use crate::error::{DdctError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which Ct value every record is compared against.
///
/// In configuration files this is written as `first`, `grouped`, or a
/// number.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "AnchorRepr", into = "AnchorRepr")]
pub enum AnchorPolicy {
    /// First finite Ct of the dataset, for every group.
    First,
    /// First finite Ct of each group.
    #[default]
    Grouped,
    /// A fixed Ct supplied by the user.
    Value(f64),
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum AnchorRepr {
    Value(f64),
    Name(String),
}

impl TryFrom<AnchorRepr> for AnchorPolicy {
    type Error = DdctError;

    fn try_from(repr: AnchorRepr) -> Result<Self> {
        match repr {
            AnchorRepr::Value(v) => AnchorPolicy::literal(v),
            AnchorRepr::Name(name) => name.parse(),
        }
    }
}

impl From<AnchorPolicy> for AnchorRepr {
    fn from(policy: AnchorPolicy) -> Self {
        match policy {
            AnchorPolicy::First => AnchorRepr::Name("first".to_string()),
            AnchorPolicy::Grouped => AnchorRepr::Name("grouped".to_string()),
            AnchorPolicy::Value(v) => AnchorRepr::Value(v),
        }
    }
}

impl AnchorPolicy {
    /// A literal anchor; rejects NaN and infinities.
    pub fn literal(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(DdctError::InvalidAnchor(format!(
                "literal anchor must be a finite number, got {}",
                value
            )));
        }
        Ok(Self::Value(value))
    }
}

impl FromStr for AnchorPolicy {
    type Err = DdctError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "first" => Ok(Self::First),
            "grouped" => Ok(Self::Grouped),
            _ => {
                let value: f64 = trimmed.parse().map_err(|_| {
                    DdctError::InvalidAnchor(format!(
                        "'{}' is neither 'first', 'grouped' nor a number",
                        s
                    ))
                })?;
                Self::literal(value)
            }
        }
    }
}

impl fmt::Display for AnchorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => f.write_str("first"),
            Self::Grouped => f.write_str("grouped"),
            Self::Value(v) => write!(f, "{}", v),
        }
    }
}

/// An anchor resolved against a concrete dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ResolvedAnchor {
    /// One Ct for the whole dataset.
    Uniform(f64),
    /// One Ct per group, in group order.
    PerGroup(Vec<(String, f64)>),
}

impl ResolvedAnchor {
    /// Anchor Ct for a group, if known.
    pub fn for_group(&self, name: &str) -> Option<f64> {
        match self {
            Self::Uniform(v) => Some(*v),
            Self::PerGroup(anchors) => anchors
                .iter()
                .find(|(group, _)| group == name)
                .map(|(_, v)| *v),
        }
    }
}

/// Resolve an anchor policy against a grouped dataset.
///
/// Resolution happens once per analysis, before any Delta-Ct value is
/// computed. Missing Cts (NaN, e.g. "Undetermined" wells or masked
/// outliers) are never used as anchors: `first` takes the first finite Ct
/// of the dataset and `grouped` the first finite Ct of each group.
///
/// # Errors
/// `InvalidAnchor` when the dataset is empty, or when a group (for
/// `grouped`) or the whole dataset (for `first`) has no finite Ct.
pub fn resolve_anchor(grouped: &GroupedDataset, policy: &AnchorPolicy) -> Result<ResolvedAnchor> {
    let anchor = match policy {
        AnchorPolicy::First => {
            if grouped.is_empty() {
                return Err(DdctError::InvalidAnchor(format!(
                    "cannot use 'first' anchor on empty dataset '{}'",
                    grouped.id()
                )));
            }
            let (position, ct) = grouped
                .groups()
                .iter()
                .flat_map(|g| g.records.iter())
                .map(|r| r.ct)
                .enumerate()
                .find(|(_, ct)| ct.is_finite())
                .ok_or_else(|| {
                    DdctError::InvalidAnchor(format!(
                        "dataset '{}' has no finite Ct to use as 'first' anchor",
                        grouped.id()
                    ))
                })?;
            if position > 0 {
                tracing::warn!(
                    dataset = grouped.id(),
                    skipped = position,
                    "first record has no Ct; anchoring on the first finite Ct"
                );
            }
            ResolvedAnchor::Uniform(ct)
        }
        AnchorPolicy::Grouped => {
            if grouped.is_empty() {
                return Err(DdctError::InvalidAnchor(format!(
                    "cannot use 'grouped' anchor on empty dataset '{}'",
                    grouped.id()
                )));
            }
            let anchors = grouped
                .groups()
                .iter()
                .map(|g| {
                    let (position, ct) = g
                        .records
                        .iter()
                        .map(|r| r.ct)
                        .enumerate()
                        .find(|(_, ct)| ct.is_finite())
                        .ok_or_else(|| {
                            DdctError::InvalidAnchor(format!(
                                "group '{}' of '{}' has no finite Ct",
                                g.name,
                                grouped.id()
                            ))
                        })?;
                    if position > 0 {
                        tracing::warn!(
                            dataset = grouped.id(),
                            group = %g.name,
                            skipped = position,
                            "first replicate has no Ct; anchoring on the next finite Ct"
                        );
                    }
                    Ok((g.name.clone(), ct))
                })
                .collect::<Result<Vec<_>>>()?;
            ResolvedAnchor::PerGroup(anchors)
        }
        AnchorPolicy::Value(v) => {
            AnchorPolicy::literal(*v)?;
            ResolvedAnchor::Uniform(*v)
        }
    };

    tracing::debug!(dataset = grouped.id(), policy = %policy, "resolved anchor");
    Ok(anchor)
}
