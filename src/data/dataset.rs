//! Raw Ct records as read from a two-column qPCR export.

use crate::error::{DdctError, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// A single well: sample name and its cycle-threshold value.
///
/// Undetermined wells and masked outliers carry a `NaN` Ct.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Sample name as written in the source file.
    pub sample: String,
    /// Cycle threshold.
    pub ct: f64,
}

impl Record {
    /// Create a new record.
    pub fn new(sample: impl Into<String>, ct: f64) -> Self {
        Self {
            sample: sample.into(),
            ct,
        }
    }
}

/// An ordered sequence of records from one run.
///
/// Record order is significant: it decides replicate group membership
/// and which record anchors a "first" analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Source identifier (run name).
    id: String,
    records: Vec<Record>,
}

impl Dataset {
    /// Create a dataset from records.
    pub fn new(id: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            id: id.into(),
            records,
        }
    }

    /// Create a dataset from `(sample, ct)` pairs.
    pub fn from_pairs<S, I>(id: impl Into<String>, pairs: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, f64)>,
    {
        let records = pairs
            .into_iter()
            .map(|(sample, ct)| Record::new(sample, ct))
            .collect();
        Self::new(id, records)
    }

    /// Load a dataset from a CSV file.
    ///
    /// Expected format:
    /// - First row: header (discarded)
    /// - Subsequent rows: sample name, Ct value (extra columns are ignored)
    ///
    /// The run id is the file stem. Empty, `NaN` and `Undetermined` Ct
    /// cells are read as `NaN`.
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unnamed".to_string());
        let file = File::open(path)?;
        let dataset = Self::from_reader(id, file)?;
        tracing::debug!(
            path = %path.display(),
            records = dataset.len(),
            "loaded dataset"
        );
        Ok(dataset)
    }

    /// Read a dataset from any CSV source.
    pub fn from_reader<R: Read>(id: impl Into<String>, reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut records = Vec::new();
        for (row_idx, row) in csv_reader.records().enumerate() {
            let row = row?;
            let row_num = row_idx + 1;
            if row.len() < 2 {
                return Err(DdctError::InvalidParameter(format!(
                    "Row {} has {} column(s), expected sample name and Ct",
                    row_num,
                    row.len()
                )));
            }
            let ct = parse_ct(&row[1], row_num)?;
            records.push(Record::new(&row[0], ct));
        }

        Ok(Self::new(id, records))
    }

    /// Run identifier.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Records in source order.
    #[inline]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Number of records.
    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Ct values in source order.
    pub fn cts(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.ct).collect()
    }

    /// Return a copy of this dataset under another run id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

/// Parse a Ct cell. Machine exports write "Undetermined" for wells that
/// never crossed the threshold. Infinite values are rejected.
pub(crate) fn parse_ct(value: &str, row: usize) -> Result<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("nan")
        || trimmed.eq_ignore_ascii_case("undetermined")
    {
        return Ok(f64::NAN);
    }
    match trimmed.parse::<f64>() {
        Ok(ct) if ct.is_finite() => Ok(ct),
        _ => Err(DdctError::InvalidCt {
            value: value.to_string(),
            row,
        }),
    }
}
