//! Validation results per site, rolled up into device and site scores.

mod aggregator;
mod summary;

pub use aggregator::{AggregatorSnapshot, ValidationAggregator};
