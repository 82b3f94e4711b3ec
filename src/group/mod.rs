//! Replicate grouping.

pub mod replicates;

pub use replicates::{default_group_names, group_replicates};
