//! Anchor resolution and Delta-Ct computation.
//!
//! - **anchor**: which reference Ct each group is compared against
//! - **engine**: relative values under a linear or exponential transform

pub mod anchor;
pub mod engine;

pub use anchor::{resolve_anchor, AnchorPolicy, ResolvedAnchor};
pub use engine::{analyse, delta_ct};
