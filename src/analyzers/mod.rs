//! Aggregation engine.
//!
//! Computes grouped statistics over a derived record collection: grade
//! distributions, subject rankings, grade-level trends, gender comparison
//! and pairwise-complete subject correlations. Every statistic reports an
//! explicit [`types::ComputationGap`] instead of a substitute number when it
//! cannot be computed.

pub mod aggregate;
pub mod types;
pub mod utility;

pub use aggregate::{aggregate, aggregate_grouped};
pub use types::{ComputationGap, Computed, Summary};
