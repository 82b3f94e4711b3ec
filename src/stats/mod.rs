//! Descriptive statistics over replicate groups.

pub mod robust;
pub mod summary;

pub use robust::{median, quantile};
pub use summary::summarize;
