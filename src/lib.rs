//! Composable Delta-Ct / Delta-Delta-Ct Library
//!
//! This library provides modular primitives for relative quantification
//! of qPCR data.
//!
//! # Overview
//!
//! The library is organized into composable modules:
//!
//! - **data**: Core data structures (Dataset, GroupedDataset, result tables)
//! - **group**: Replicate grouping
//! - **filter**: Outlier filtering (range, IQR)
//! - **delta**: Anchor resolution and Delta-Ct
//! - **normalize**: Normalizer combination and Delta-Delta-Ct
//! - **stats**: Per-group summaries
//! - **io**: CSV ingestion and export
//! - **pipeline**: Pipeline composition and execution
//!
//! # Example
//!
//! ```no_run
//! use composable_ddct::prelude::*;
//!
//! // Load data
//! let target = Dataset::from_csv("il6.csv").unwrap();
//! let actin = Dataset::from_csv("actin.csv").unwrap();
//! let gapdh = Dataset::from_csv("gapdh.csv").unwrap();
//!
//! // Run analysis pipeline
//! let analysis = Analysis::new()
//!     .replicates(ReplicateSpec::Uniform(3))
//!     .anchor(AnchorPolicy::Grouped)
//!     .transform(Transform::Exponential)
//!     .filter(FilterConfig::Iqr {
//!         lower: 1.5,
//!         upper: 1.5,
//!         ignore_nan: true,
//!         action: OutlierAction::Mask,
//!     });
//! let results = Study::run(&analysis, &[target], &[actin, gapdh]).unwrap();
//! results.export("results", false).unwrap();
//! ```

pub mod data;
pub mod delta;
pub mod error;
pub mod filter;
pub mod group;
pub mod io;
pub mod normalize;
pub mod pipeline;
pub mod stats;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::data::{
        Dataset, DeltaCtResult, GroupSummary, GroupedDataset, NormalizedResult, Record,
        ReplicateGroup, ReplicateSpec, ReplicateTable, Statistic, SummaryResult, Transform,
        ValueGroup,
    };
    pub use crate::delta::{analyse, delta_ct, resolve_anchor, AnchorPolicy, ResolvedAnchor};
    pub use crate::error::{DdctError, Result};
    pub use crate::filter::{
        Filter, FilterConfig, FilterOptions, FilterReport, IqrFilter, OutlierAction,
        RangeAnchor, RangeFilter,
    };
    pub use crate::group::{default_group_names, group_replicates};
    pub use crate::io::{
        find_result_file, read_dataset, read_summary, read_table, write_summary, write_table,
    };
    pub use crate::normalize::{
        combine_normalizers, normalize, normalize_pairwise, NamedResult,
    };
    pub use crate::pipeline::{Analysis, AnalysisConfig, AssayResult, Study, StudyResult};
    pub use crate::stats::summarize;
}
