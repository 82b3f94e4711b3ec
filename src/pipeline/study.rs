//! Multi-assay runs: every assay against a combined reference, or
//! independent (target, normalizer) pairs.

use super::runner::{AnalysedDataset, Analysis};
use crate::data::{Dataset, DeltaCtResult, NormalizedResult, ReplicateTable, SummaryResult};
use crate::error::{DdctError, Result};
use crate::filter::FilterReport;
use crate::io::{write_summary, write_table};
use crate::normalize::{combine_normalizers, normalize, normalize_pairwise, NamedResult};
use crate::stats::summarize;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// File name of the exported combined normalizer.
pub const NORMALIZER_FILE: &str = "normalizer.csv";

/// Normalized values and summary of one assay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssayResult {
    pub normalized: NormalizedResult,
    pub summary: SummaryResult,
}

impl AssayResult {
    /// Run id of the assay.
    pub fn id(&self) -> &str {
        self.normalized.id()
    }
}

/// Output of [`Study::run`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyResult {
    /// Combined normalizer Delta-Ct values.
    pub normalizer: DeltaCtResult,
    /// One entry per assay, in input order.
    pub assays: Vec<AssayResult>,
    /// Filter reports of assays and normalizers, when a filter ran.
    pub filter_reports: Vec<FilterReport>,
}

impl StudyResult {
    /// Look up an assay by run id.
    pub fn assay(&self, id: &str) -> Option<&AssayResult> {
        self.assays.iter().find(|a| a.id() == id)
    }

    /// Write `<assay>.csv` and `<assay>_stats.csv` per assay and
    /// `normalizer.csv` into `dir`, creating it if needed.
    ///
    /// Nothing is written when two outputs would share a file name, e.g.
    /// two assays with the same run id or an assay named `normalizer`.
    ///
    /// # Returns
    /// Paths written, in write order.
    pub fn export<P: AsRef<Path>>(&self, dir: P, transpose: bool) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        let file_names = self.export_file_names()?;
        std::fs::create_dir_all(dir)?;

        let mut written = Vec::with_capacity(file_names.len());
        for (assay, names) in self.assays.iter().zip(file_names.chunks(2)) {
            let table_path = dir.join(&names[0]);
            write_table(&assay.normalized, &table_path, transpose)?;
            written.push(table_path);

            let stats_path = dir.join(&names[1]);
            write_summary(&assay.summary, &stats_path, transpose)?;
            written.push(stats_path);
        }

        let normalizer_path = dir.join(NORMALIZER_FILE);
        write_table(&self.normalizer, &normalizer_path, transpose)?;
        written.push(normalizer_path);

        tracing::info!(dir = %dir.display(), files = written.len(), "exported results");
        Ok(written)
    }

    /// Export file names in write order, normalizer last.
    fn export_file_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::with_capacity(self.assays.len() * 2 + 1);
        for assay in &self.assays {
            names.push(format!("{}.csv", assay.id()));
            names.push(format!("{}_stats.csv", assay.id()));
        }
        names.push(NORMALIZER_FILE.to_string());

        let mut seen = HashSet::with_capacity(names.len());
        for name in &names {
            if !seen.insert(name.as_str()) {
                return Err(DdctError::InvalidParameter(format!(
                    "Export would write '{}' more than once; assay run ids must be unique and must not be '{}'",
                    name,
                    NORMALIZER_FILE.trim_end_matches(".csv")
                )));
            }
        }
        Ok(names)
    }

    /// Serialize the whole result as pretty JSON. Missing values become `null`.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(DdctError::from)
    }
}

/// Entry points for multi-dataset runs.
pub struct Study;

impl Study {
    /// Normalize every assay against the combination of all normalizers.
    ///
    /// Datasets are analysed in parallel; the reported error is the
    /// first one in input order, assays before normalizers.
    ///
    /// # Arguments
    /// * `analysis` - Per-dataset settings
    /// * `assays` - Target datasets
    /// * `normalizers` - Reference datasets, combined by position-wise mean
    pub fn run(analysis: &Analysis, assays: &[Dataset], normalizers: &[Dataset]) -> Result<StudyResult> {
        if normalizers.is_empty() {
            return Err(DdctError::EmptyData(
                "at least one normalizer dataset is required".to_string(),
            ));
        }
        tracing::info!(
            assays = assays.len(),
            normalizers = normalizers.len(),
            "running study"
        );

        let analysed_assays = analyse_all(analysis, assays)?;
        let analysed_normalizers = analyse_all(analysis, normalizers)?;

        let mut filter_reports = Vec::new();
        let mut assay_deltas = Vec::with_capacity(analysed_assays.len());
        for a in analysed_assays {
            filter_reports.extend(a.filter_report);
            assay_deltas.push(a.delta);
        }
        let mut normalizer_deltas = Vec::with_capacity(analysed_normalizers.len());
        for a in analysed_normalizers {
            filter_reports.extend(a.filter_report);
            normalizer_deltas.push(a.delta);
        }

        let normalizer = combine_normalizers(&normalizer_deltas)
            .map_err(|e| DdctError::Pipeline(format!("combining normalizers failed: {}", e)))?;

        let statistics = &analysis.config().statistics;
        let outcomes: Vec<Result<AssayResult>> = assay_deltas
            .par_iter()
            .map(|delta| {
                let normalized = normalize(delta, &normalizer).map_err(|e| {
                    DdctError::Pipeline(format!("'{}': normalization failed: {}", delta.id(), e))
                })?;
                let summary = summarize(&normalized, statistics)?;
                Ok(AssayResult {
                    normalized,
                    summary,
                })
            })
            .collect();
        let assays = outcomes.into_iter().collect::<Result<Vec<_>>>()?;

        tracing::info!(assays = assays.len(), normalizer = normalizer.id(), "study complete");
        Ok(StudyResult {
            normalizer,
            assays,
            filter_reports,
        })
    }

    /// Normalize `targets[i]` against `normalizers[i]` after analysing
    /// each dataset.
    pub fn run_pairwise(
        analysis: &Analysis,
        targets: &[Dataset],
        normalizers: &[Dataset],
        names: Option<&[String]>,
    ) -> Result<Vec<NamedResult>> {
        if targets.len() != normalizers.len() {
            return Err(DdctError::LengthMismatch {
                targets: targets.len(),
                normalizers: normalizers.len(),
            });
        }
        let target_deltas: Vec<DeltaCtResult> = analyse_all(analysis, targets)?
            .into_iter()
            .map(|a| a.delta)
            .collect();
        let normalizer_deltas: Vec<DeltaCtResult> = analyse_all(analysis, normalizers)?
            .into_iter()
            .map(|a| a.delta)
            .collect();

        normalize_pairwise(&target_deltas, &normalizer_deltas, names)
    }
}

fn analyse_all(analysis: &Analysis, datasets: &[Dataset]) -> Result<Vec<AnalysedDataset>> {
    let outcomes: Vec<Result<AnalysedDataset>> =
        datasets.par_iter().map(|d| analysis.analyse(d)).collect();
    outcomes.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ReplicateSpec, Statistic, Transform};
    use tempfile::tempdir;

    fn analysis() -> Analysis {
        Analysis::new()
            .replicates(ReplicateSpec::Uniform(2))
            .group_names(["wt", "ko"])
            .transform(Transform::Linear)
    }

    fn assay(id: &str, cts: [f64; 4]) -> Dataset {
        Dataset::from_pairs(
            id,
            vec![
                ("wt_1", cts[0]),
                ("wt_2", cts[1]),
                ("ko_1", cts[2]),
                ("ko_2", cts[3]),
            ],
        )
    }

    #[test]
    fn test_run_against_combined_normalizer() {
        let assays = vec![assay("il6", [25.0, 25.5, 22.0, 23.0])];
        let normalizers = vec![
            assay("actin", [18.0, 18.2, 18.0, 18.4]),
            assay("gapdh", [19.0, 19.4, 19.0, 19.0]),
        ];

        let result = Study::run(&analysis(), &assays, &normalizers).unwrap();

        assert_eq!(result.normalizer.id(), "actin+gapdh");
        let il6 = result.assay("il6").unwrap();
        // delta il6 wt = [0, 0.5], combined normalizer wt = [0, 0.3]
        let wt = &il6.normalized.group("wt").unwrap().values;
        assert!((wt[1] - 0.2).abs() < 1e-9);
        assert_eq!(il6.normalized.normalizer(), "actin+gapdh");
        assert_eq!(il6.summary.statistics(), Statistic::defaults().as_slice());
        assert!(result.filter_reports.is_empty());
    }

    #[test]
    fn test_run_requires_normalizer() {
        let assays = vec![assay("il6", [25.0, 25.5, 22.0, 23.0])];
        assert!(matches!(
            Study::run(&analysis(), &assays, &[]),
            Err(DdctError::EmptyData(_))
        ));
    }

    #[test]
    fn test_run_reports_failing_dataset() {
        let assays = vec![Dataset::from_pairs("short", vec![("a", 20.0)])];
        let normalizers = vec![assay("actin", [18.0, 18.2, 18.0, 18.4])];

        let err = Study::run(&analysis(), &assays, &normalizers).unwrap_err();
        assert!(err.to_string().contains("short"));
    }

    #[test]
    fn test_export_writes_expected_files() {
        let dir = tempdir().unwrap();
        let assays = vec![assay("il6", [25.0, 25.5, 22.0, 23.0])];
        let normalizers = vec![assay("actin", [18.0, 18.2, 18.0, 18.4])];
        let result = Study::run(&analysis(), &assays, &normalizers).unwrap();

        let written = result.export(dir.path().join("out"), false).unwrap();
        let names: Vec<String> = written
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["il6.csv", "il6_stats.csv", "normalizer.csv"]);
        assert!(written.iter().all(|p| p.exists()));

        let json = result.to_json().unwrap();
        assert!(json.contains("\"normalizer\""));
    }

    #[test]
    fn test_export_rejects_clashing_file_names() {
        let normalizers = vec![assay("actin", [18.0, 18.2, 18.0, 18.4])];
        let clashes = [
            vec![assay("il6", [25.0, 25.5, 22.0, 23.0]), assay("il6", [24.0, 24.5, 21.0, 22.0])],
            vec![assay("normalizer", [25.0, 25.5, 22.0, 23.0])],
            vec![assay("il6", [25.0, 25.5, 22.0, 23.0]), assay("il6_stats", [24.0, 24.5, 21.0, 22.0])],
        ];

        for assays in clashes {
            let dir = tempdir().unwrap();
            let out = dir.path().join("out");
            let result = Study::run(&analysis(), &assays, &normalizers).unwrap();

            assert!(matches!(
                result.export(&out, false),
                Err(DdctError::InvalidParameter(_))
            ));
            assert!(!out.exists());
        }
    }

    #[test]
    fn test_run_pairwise() {
        let targets = vec![
            assay("il6", [25.0, 25.5, 22.0, 23.0]),
            assay("tnf", [30.0, 30.0, 28.0, 28.5]),
        ];
        let normalizers = vec![
            assay("actin", [18.0, 18.2, 18.0, 18.4]),
            assay("gapdh", [19.0, 19.4, 19.0, 19.0]),
        ];
        let names = vec!["il6/actin".to_string(), "tnf/gapdh".to_string()];

        let pairs = Study::run_pairwise(&analysis(), &targets, &normalizers, Some(&names)).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[1].name, "tnf/gapdh");
        assert_eq!(pairs[1].result.normalizer(), "gapdh");

        assert!(matches!(
            Study::run_pairwise(&analysis(), &targets, &normalizers[..1], None),
            Err(DdctError::LengthMismatch { .. })
        ));
    }
}
