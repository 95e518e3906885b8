//! The contract the containing map must satisfy.
//!
//! Everything here is an external collaborator: the map's own key/value
//! storage, rehash/split machinery, and segment layout are out of scope for
//! this crate and are represented only by this trait's method signatures.

/// Operations the monitor needs from its containing map. `Key` and
/// `InflatedSegment` are the host's own types; the monitor only ever
/// receives borrows of them to forward into reports.
pub trait Host {
    type Key;
    type InflatedSegment;

    /// Recomputes (and caches, on the host side) the average segment order
    /// for a map of `map_size` keys.
    fn compute_average_segment_order(&mut self, map_size: u64) -> u32;

    /// The largest segment order the host will currently let a split
    /// produce, given the current average order.
    fn max_splittable_segment_order(&self, average_order: u32) -> u32;

    /// Attempts to split `segment` (currently at `order`), excluding
    /// `excluded_key` (identified by `excluded_key_hash`) from the
    /// invariants the split must preserve. Returns whether the split
    /// succeeded.
    fn try_split_inflated(
        &mut self,
        segment: &mut Self::InflatedSegment,
        order: u32,
        excluded_key_hash: u64,
        excluded_key: &Self::Key,
    ) -> bool;
}
