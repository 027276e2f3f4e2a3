//! Discrimination-based grouping of views and weighted group fusion.
//!
//! The stages run in a fixed order:
//! 1. [`GroupScheme::build`] buckets views by discrimination score.
//! 2. [`GroupWeights::compute`] averages member scores per group.
//! 3. [`pool_groups`] averages member descriptors per group.
//! 4. [`fuse_groups`] combines group descriptors by weight.
mod errors;
mod fusion;
mod pooling;
mod scheme;
mod weight;

pub use errors::GroupingError;
pub use fusion::fuse_groups;
pub use pooling::{check_descriptor_shapes, pool_groups};
pub use scheme::GroupScheme;
pub use weight::GroupWeights;
