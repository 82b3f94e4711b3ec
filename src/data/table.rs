//! Grouped value tables produced by the Delta-Ct and Delta-Delta-Ct steps.

use super::grouped::ensure_unique;
use crate::error::{DdctError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Numeric convention used to express a value relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transform {
    /// Fold change, `2^-(ct - anchor)`.
    #[default]
    Exponential,
    /// Plain difference, `ct - anchor`.
    Linear,
}

impl Transform {
    /// The value of a record relative to itself.
    pub fn neutral(self) -> f64 {
        match self {
            Self::Exponential => 1.0,
            Self::Linear => 0.0,
        }
    }

    /// Express `ct` relative to `anchor`.
    ///
    /// Lower Ct means more template, so the exponential form inverts the
    /// sign of the difference.
    #[inline]
    pub fn relative(self, ct: f64, anchor: f64) -> f64 {
        let delta = ct - anchor;
        match self {
            Self::Exponential => (-delta).exp2(),
            Self::Linear => delta,
        }
    }

    /// Express a target value relative to its normalizer value.
    #[inline]
    pub fn normalize(self, sample: f64, normalizer: f64) -> f64 {
        match self {
            Self::Exponential => sample / normalizer,
            Self::Linear => sample - normalizer,
        }
    }

    /// Get the descriptive name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Exponential => "exponential",
            Self::Linear => "linear",
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Transform {
    type Err = DdctError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "exponential" | "exp" => Ok(Self::Exponential),
            "linear" | "lin" => Ok(Self::Linear),
            other => Err(DdctError::InvalidParameter(format!(
                "Unknown transform '{}', expected 'exponential' or 'linear'",
                other
            ))),
        }
    }
}

/// Values of one group, one per original replicate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueGroup {
    /// Group key.
    pub name: String,
    /// Replicate values in source order.
    pub values: Vec<f64>,
}

impl ValueGroup {
    /// Create a new value group.
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

/// Shared read access to grouped replicate values.
///
/// Implemented by every stage output that keeps one value per replicate,
/// so summaries and exports accept any of them.
pub trait ReplicateTable {
    /// Identifier of the run this table describes.
    fn id(&self) -> &str;

    /// Transform that produced the values.
    fn transform(&self) -> Transform;

    /// Groups in order.
    fn groups(&self) -> &[ValueGroup];

    /// Group keys in order.
    fn keys(&self) -> Vec<&str> {
        self.groups().iter().map(|g| g.name.as_str()).collect()
    }

    /// Look up a group by key.
    fn group(&self, name: &str) -> Option<&ValueGroup> {
        self.groups().iter().find(|g| g.name == name)
    }

    /// Number of groups.
    fn n_groups(&self) -> usize {
        self.groups().len()
    }
}

/// Delta-Ct values of one dataset, tagged with the transform used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DeltaCtRepr")]
pub struct DeltaCtResult {
    id: String,
    transform: Transform,
    groups: Vec<ValueGroup>,
}

#[derive(Deserialize)]
struct DeltaCtRepr {
    id: String,
    transform: Transform,
    groups: Vec<ValueGroup>,
}

impl TryFrom<DeltaCtRepr> for DeltaCtResult {
    type Error = DdctError;

    fn try_from(repr: DeltaCtRepr) -> Result<Self> {
        Self::new(repr.id, repr.transform, repr.groups)
    }
}

impl DeltaCtResult {
    /// Create a result from already-computed values.
    ///
    /// Use this to re-tag values loaded from a previous export; group
    /// keys must be unique.
    pub fn new(id: impl Into<String>, transform: Transform, groups: Vec<ValueGroup>) -> Result<Self> {
        ensure_unique(groups.iter().map(|g| g.name.as_str()))?;
        Ok(Self {
            id: id.into(),
            transform,
            groups,
        })
    }

    /// Return a copy under another identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

impl ReplicateTable for DeltaCtResult {
    fn id(&self) -> &str {
        &self.id
    }

    fn transform(&self) -> Transform {
        self.transform
    }

    fn groups(&self) -> &[ValueGroup] {
        &self.groups
    }
}

/// Delta-Delta-Ct values: a target normalized against a reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NormalizedRepr")]
pub struct NormalizedResult {
    id: String,
    normalizer: String,
    transform: Transform,
    groups: Vec<ValueGroup>,
}

#[derive(Deserialize)]
struct NormalizedRepr {
    id: String,
    normalizer: String,
    transform: Transform,
    groups: Vec<ValueGroup>,
}

impl TryFrom<NormalizedRepr> for NormalizedResult {
    type Error = DdctError;

    fn try_from(repr: NormalizedRepr) -> Result<Self> {
        ensure_unique(repr.groups.iter().map(|g| g.name.as_str()))?;
        Ok(Self::new(repr.id, repr.normalizer, repr.transform, repr.groups))
    }
}

impl NormalizedResult {
    pub(crate) fn new(
        id: impl Into<String>,
        normalizer: impl Into<String>,
        transform: Transform,
        groups: Vec<ValueGroup>,
    ) -> Self {
        Self {
            id: id.into(),
            normalizer: normalizer.into(),
            transform,
            groups,
        }
    }

    /// Identifier of the normalizer used.
    pub fn normalizer(&self) -> &str {
        &self.normalizer
    }
}

impl ReplicateTable for NormalizedResult {
    fn id(&self) -> &str {
        &self.id
    }

    fn transform(&self) -> Transform {
        self.transform
    }

    fn groups(&self) -> &[ValueGroup] {
        &self.groups
    }
}
