//! Data structures for relative quantification.
//!
//! Each pipeline stage has its own value type so that, for example, a
//! raw dataset can never be passed where Delta-Ct values are expected.

mod dataset;
mod grouped;
mod summary;
mod table;

pub use dataset::{Dataset, Record};
pub(crate) use dataset::parse_ct;
pub use grouped::{GroupedDataset, ReplicateGroup, ReplicateSpec};
pub use summary::{GroupSummary, Statistic, SummaryResult};
pub use table::{DeltaCtResult, NormalizedResult, ReplicateTable, Transform, ValueGroup};
