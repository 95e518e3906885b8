//! Per-segment probing/slot aggregator and map-level reporting.
//!
//! Unlike the monitors in [`crate::inflated`] and [`crate::skewed`], nothing
//! here runs on the hot insertion path: it is invoked only on demand, for a
//! diagnostics dump of the map's observed probe-chain and load shape.

pub mod aggregator;
pub mod chain;
pub mod report;

pub use aggregator::SegmentStatsAggregator;
pub use chain::build_chain_len;
