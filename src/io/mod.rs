//! File input and output.
//!
//! Reading raw qPCR exports, writing result tables and summaries, and
//! locating previously written result files.

pub mod tables;

pub use tables::{
    read_summary, read_summary_from, read_table, read_table_from, write_summary, write_summary_to,
    write_table, write_table_to, LEGEND,
};

use crate::data::Dataset;
use crate::error::{DdctError, Result};
use std::path::{Path, PathBuf};

/// Read a two-column (sample, Ct) CSV export. The run id is the file stem.
pub fn read_dataset<P: AsRef<Path>>(path: P) -> Result<Dataset> {
    Dataset::from_csv(path)
}

/// Read several exports, preserving order.
pub fn read_datasets<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Dataset>> {
    paths.iter().map(read_dataset).collect()
}

/// Locate the single CSV file in `dir` whose name contains `query`.
///
/// # Returns
/// The matching path. No match and several matches are both errors,
/// the latter listing the candidates.
pub fn find_result_file<P: AsRef<Path>>(dir: P, query: &str) -> Result<PathBuf> {
    let dir = dir.as_ref();
    let mut matches: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path.extension().map_or(false, |ext| ext == "csv")
                && path
                    .file_name()
                    .map_or(false, |name| name.to_string_lossy().contains(query))
        })
        .collect();
    matches.sort();

    match matches.len() {
        0 => Err(DdctError::InvalidParameter(format!(
            "No result file matching '{}' in {}",
            query,
            dir.display()
        ))),
        1 => Ok(matches.remove(0)),
        n => Err(DdctError::InvalidParameter(format!(
            "{} result files match '{}' in {}: {}",
            n,
            query,
            dir.display(),
            matches
                .iter()
                .filter_map(|p| p.file_name())
                .map(|name| name.to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join(", ")
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_find_result_file() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("actin.csv"), "a\n").unwrap();
        fs::write(dir.path().join("actin_stats.csv"), "a\n").unwrap();
        fs::write(dir.path().join("gapdh_stats.csv"), "a\n").unwrap();
        fs::write(dir.path().join("gapdh_notes.txt"), "a\n").unwrap();

        let found = find_result_file(dir.path(), "gapdh").unwrap();
        assert_eq!(found.file_name().unwrap(), "gapdh_stats.csv");

        assert!(find_result_file(dir.path(), "actin").is_err());
        assert!(find_result_file(dir.path(), "tubulin").is_err());
    }

    #[test]
    fn test_read_datasets_keeps_order() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("b_run.csv");
        let b = dir.path().join("a_run.csv");
        fs::write(&a, "Sample,Ct\nx,20.0\n").unwrap();
        fs::write(&b, "Sample,Ct\ny,Undetermined\n").unwrap();

        let sets = read_datasets(&[a, b]).unwrap();
        assert_eq!(sets[0].id(), "b_run");
        assert_eq!(sets[1].id(), "a_run");
        assert!(sets[1].records()[0].ct.is_nan());
    }
}
