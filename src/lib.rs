//! Hash-code distribution monitoring and inflated-segment accounting for a
//! segmented, dynamically-resizing open-addressing hash map ("SmoothieMap").
//!
//! A SmoothieMap shards its key space across many small fixed-capacity hash
//! table "segments", indexed by the high bits of each key's hash. This crate
//! does not implement the map itself (insertion, deletion, iteration, and the
//! rehash/split machinery are external collaborators) — it implements the
//! part of such a map that is actually interesting to get right: deciding,
//! on the hot path, whether the *observed* shape of the map (an oversized
//! segment, a lopsided split) is something a well-behaved hash function could
//! plausibly have produced, or whether it is evidence of a poor hash code
//! distribution worth surfacing to the caller.
//!
//! The monitor is advisory only: it never rejects an operation, it only
//! reports "poor hash distribution" occasions to a user-supplied [`ReportSink`].
//!
//! # Layout
//!
//! - [`stats`] — Binomial/Poisson/χ² kernels used to decide statistical
//!   significance.
//! - [`probing`] — per-segment slot aggregation and human-readable reporting,
//!   used for diagnostics dumps rather than the hot monitoring path.
//! - [`accumulator`] — map-wide aggregation of per-segment statistics.
//! - [`size`] — cross-order segment size comparison.
//! - [`inflated`] — the inflated-segment size monitor.
//! - [`skewed`] — the skewed-split monitor.
//! - [`reporter`] — occasions and the [`ReportSink`] trait.
//! - [`host`] — the contract the containing map must satisfy.
//! - [`monitor`] — [`Monitor`], which ties the above together.

pub mod accumulator;
pub mod error;
pub mod host;
pub mod inflated;
pub mod monitor;
pub mod probing;
pub mod reporter;
pub mod size;
pub mod skewed;
pub mod stats;

pub use error::MonitorError;
pub use host::Host;
pub use monitor::Monitor;
pub use reporter::{Occasion, OccasionKind, ReportSink};
