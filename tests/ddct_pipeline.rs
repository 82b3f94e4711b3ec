//! Integration tests for the Delta-Delta-Ct pipeline.

use composable_ddct::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// Write a raw (sample, Ct) export the way qPCR instruments produce them.
fn write_run(dir: &Path, name: &str, rows: &[(&str, &str)]) -> PathBuf {
    let path = dir.join(format!("{}.csv", name));
    let mut text = String::from("Sample Name,CT\n");
    for (sample, ct) in rows {
        text.push_str(&format!("{},{}\n", sample, ct));
    }
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn test_concrete_delta_ct_scenarios() {
    let dataset = Dataset::from_pairs(
        "run",
        vec![("g_1", 10.0), ("g_2", 10.2), ("h_1", 5.0), ("h_2", 5.4)],
    );
    let grouped = group_replicates(&dataset, &ReplicateSpec::Uniform(2), None).unwrap();

    let linear = analyse(&grouped, &AnchorPolicy::Grouped, Transform::Linear).unwrap();
    let g1 = &linear.group("Group1").unwrap().values;
    let g2 = &linear.group("Group2").unwrap().values;
    assert_eq!(g1[0], 0.0);
    assert!((g1[1] - 0.2).abs() < 1e-9);
    assert_eq!(g2[0], 0.0);
    assert!((g2[1] - 0.4).abs() < 1e-9);

    let exp = analyse(&grouped, &AnchorPolicy::Grouped, Transform::Exponential).unwrap();
    let g1 = &exp.group("Group1").unwrap().values;
    let g2 = &exp.group("Group2").unwrap().values;
    assert_eq!(g1[0], 1.0);
    assert!((g1[1] - 2f64.powf(-0.2)).abs() < 1e-9);
    assert!((g2[1] - 2f64.powf(-0.4)).abs() < 1e-9);

    let summary = summarize(&linear, &[Statistic::Mean, Statistic::Stdev]).unwrap();
    let s1 = summary.group("Group1").unwrap();
    assert!((s1.mean.unwrap() - 0.1).abs() < 1e-9);
    assert!((s1.stdev.unwrap() - 0.141_421_356).abs() < 1e-6);

    let err = group_replicates(&dataset, &ReplicateSpec::Sizes(vec![2, 1]), None).unwrap_err();
    assert!(matches!(err, DdctError::SizeMismatch { .. }));
}

#[test]
fn test_study_from_files_and_export_reload() {
    let dir = tempdir().unwrap();
    let il6 = write_run(
        dir.path(),
        "il6",
        &[
            ("ctrl_1", "25.0"),
            ("ctrl_2", "25.4"),
            ("ctrl_3", "Undetermined"),
            ("lps_1", "21.0"),
            ("lps_2", "21.2"),
            ("lps_3", "21.1"),
        ],
    );
    let actin = write_run(
        dir.path(),
        "actin",
        &[
            ("ctrl_1", "17.0"),
            ("ctrl_2", "17.2"),
            ("ctrl_3", "17.1"),
            ("lps_1", "17.5"),
            ("lps_2", "17.4"),
            ("lps_3", "17.6"),
        ],
    );

    let assays = vec![read_dataset(&il6).unwrap()];
    let normalizers = vec![read_dataset(&actin).unwrap()];
    assert_eq!(assays[0].id(), "il6");
    assert!(assays[0].records()[2].ct.is_nan());

    let analysis = Analysis::new()
        .replicates(ReplicateSpec::Uniform(3))
        .group_names(["ctrl", "lps"])
        .transform(Transform::Linear)
        .statistics(vec![Statistic::Mean, Statistic::Median]);
    let results = Study::run(&analysis, &assays, &normalizers).unwrap();

    let il6_result = results.assay("il6").unwrap();
    let ctrl = &il6_result.normalized.group("ctrl").unwrap().values;
    // il6 ctrl delta [0, 0.4, NaN] against actin ctrl delta [0, 0.2, 0.1]
    assert!((ctrl[1] - 0.2).abs() < 1e-9);
    assert!(ctrl[2].is_nan());
    let ctrl_summary = il6_result.summary.group("ctrl").unwrap();
    assert!((ctrl_summary.mean.unwrap() - 0.1).abs() < 1e-9);

    let out = dir.path().join("results");
    results.export(&out, false).unwrap();

    let stats_path = find_result_file(&out, "il6_stats").unwrap();
    let reloaded = read_summary(&stats_path, false).unwrap();
    assert_eq!(reloaded.keys(), vec!["ctrl", "lps"]);
    assert_eq!(reloaded.statistics(), &[Statistic::Mean, Statistic::Median]);
    assert!((reloaded.group("ctrl").unwrap().mean.unwrap() - 0.1).abs() < 1e-9);

    let table = read_table(out.join("il6.csv"), false).unwrap();
    assert_eq!(table.group("ctrl").unwrap().len(), 3);
    assert!(table.group("ctrl").unwrap().records[2].ct.is_nan());

    // "il6" matches both the table and its summary.
    assert!(find_result_file(&out, "il6").is_err());
}

#[test]
fn test_group_mismatch_between_target_and_normalizer() {
    let target = Dataset::from_pairs("t", vec![("a", 20.0), ("b", 20.5)]);
    let reference = Dataset::from_pairs("r", vec![("a", 15.0), ("b", 15.5)]);

    let t = analyse(
        &group_replicates(&target, &ReplicateSpec::Uniform(2), Some(&["wt".to_string()][..])).unwrap(),
        &AnchorPolicy::Grouped,
        Transform::Exponential,
    )
    .unwrap();
    let r = analyse(
        &group_replicates(&reference, &ReplicateSpec::Uniform(2), Some(&["ko".to_string()][..])).unwrap(),
        &AnchorPolicy::Grouped,
        Transform::Exponential,
    )
    .unwrap();

    assert!(matches!(normalize(&t, &r), Err(DdctError::GroupMismatch { .. })));
    assert!(matches!(
        combine_normalizers(&[t.clone(), r.clone()]),
        Err(DdctError::GroupMismatch { .. })
    ));
}

#[test]
fn test_iqr_filter_in_study_masks_outlier() {
    let target = Dataset::from_pairs(
        "tnf",
        vec![("a", 28.0), ("b", 28.1), ("c", 28.2), ("d", 28.3), ("e", 35.0)],
    );
    let reference = Dataset::from_pairs(
        "gapdh",
        vec![("a", 18.0), ("b", 18.0), ("c", 18.0), ("d", 18.0), ("e", 18.0)],
    );
    let analysis = Analysis::new()
        .replicates(ReplicateSpec::Uniform(5))
        .transform(Transform::Linear)
        .filter(FilterConfig::Iqr {
            lower: 1.5,
            upper: 1.5,
            ignore_nan: true,
            action: OutlierAction::Mask,
        });

    let results = Study::run(&analysis, &[target], &[reference]).unwrap();
    let values = &results.assay("tnf").unwrap().normalized.group("Group1").unwrap().values;
    assert!(values[4].is_nan());
    assert_eq!(results.filter_reports.len(), 2);
    assert_eq!(results.filter_reports[0].n_flagged(), 1);
    assert_eq!(results.filter_reports[1].n_flagged(), 0);

    // Masked replicate is skipped: mean of [0, 0.1, 0.2, 0.3].
    let mean = results.assay("tnf").unwrap().summary.group("Group1").unwrap().mean.unwrap();
    assert!((mean - 0.15).abs() < 1e-9);
}
