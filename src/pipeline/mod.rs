//! Pipeline composition and execution for relative quantification.

mod runner;
mod study;

pub use runner::{AnalysedDataset, Analysis, AnalysisConfig, AnalysisStep};
pub use study::{AssayResult, Study, StudyResult, NORMALIZER_FILE};
