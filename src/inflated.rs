//! Inflated-segment size monitor.
//!
//! On each touch of an inflated segment, decides whether its size is
//! statistically implausible for a well-distributed hash function given the
//! current map size, caching a size threshold and the map-size range over
//! which that threshold remains valid so repeat touches of the same segment
//! hit only the fast path.

use crate::error::MonitorError;
use crate::size::compare_normalized;
use crate::stats::poisson;

/// The cached "how big can an inflated segment of `order_for_which_computed`
/// get before it's worth reporting" threshold, plus the map-size range over
/// which it remains valid.
#[derive(Debug, Clone, Copy)]
pub struct InflatedCache {
    size_max_non_reported: u64,
    order_for_which_computed: u32,
    min_map_size_for_which_cache_valid: u64,
}

impl Default for InflatedCache {
    fn default() -> Self {
        Self {
            size_max_non_reported: 0,
            order_for_which_computed: 0,
            // 0 means the cache starts invalid for any map_size > 0: the fast
            // path's `map_size < min_map_size_for_which_cache_valid` check
            // only suppresses the slow path once the cache has actually been
            // populated; start it so the first touch always falls through.
            min_map_size_for_which_cache_valid: u64::MAX,
        }
    }
}

/// Outcome of the slow-path recomputation in [`InflatedCache::recompute`].
pub struct Recomputed {
    pub average_order: u32,
    pub virtual_segments: u64,
    pub mean: f64,
    pub q: f64,
    /// `1 - CDF(size_virtual - 1)`, the actual occasion probability, only
    /// meaningful when `should_report` is true.
    pub occasion_probability: f64,
    pub should_report: bool,
}

impl InflatedCache {
    /// Fast, amortized path: `true` means the slow path must run; `false`
    /// means this touch is definitely not worth reporting.
    pub fn might_be_poor(&self, map_size: u64, inflated_size: u64, inflated_order: u32) -> bool {
        map_size < self.min_map_size_for_which_cache_valid
            || compare_normalized(
                inflated_size,
                inflated_order,
                self.size_max_non_reported,
                self.order_for_which_computed,
            ) > std::cmp::Ordering::Equal
    }

    /// Rare, slow path: recomputes the threshold for `average_order`,
    /// decides whether `inflated_size` (normalized to `average_order`)
    /// crosses it, and updates the cache either way.
    ///
    /// Precondition (guaranteed by the caller after a failed `try_split`):
    /// `inflated_order >= average_order`.
    pub fn recompute(
        &mut self,
        min_reporting_prob: f64,
        map_size: u64,
        inflated_size: u64,
        inflated_order: u32,
        average_order: u32,
    ) -> Result<Recomputed, MonitorError> {
        debug_assert!(inflated_order >= average_order);
        let virtual_segments = 1u64 << average_order.min(62);
        let mean = map_size as f64 / virtual_segments as f64;
        let q = min_reporting_prob.powf(1.0 / virtual_segments as f64);

        let size_max_non_reported = poisson::inverse_cdf(mean, q);

        let max_mean_invalid = poisson::mean_by_cdf(size_max_non_reported as i64 - 1, q);
        let mut min_map_size = (max_mean_invalid * virtual_segments as f64).ceil() as u64;
        if min_map_size > map_size {
            return Err(MonitorError::Assertion(format!(
                "min_map_size_for_which_cache_valid ({}) exceeded map_size ({}) while computing \
                 the inflated-segment threshold for average_order {}",
                min_map_size, map_size, average_order
            )));
        }
        // Nudge upward to compensate for chi-square inverse precision limits.
        let nudge = ((map_size - min_map_size) / 100).max(1);
        min_map_size += nudge;

        self.size_max_non_reported = size_max_non_reported;
        self.order_for_which_computed = average_order;
        self.min_map_size_for_which_cache_valid = min_map_size;

        let shift = inflated_order - average_order;
        let size_virtual = inflated_size << shift.min(62);
        let should_report = size_virtual > size_max_non_reported;
        let occasion_probability = if should_report {
            poisson::ccdf(size_virtual - 1, mean)
        } else {
            0.0
        };

        Ok(Recomputed {
            average_order,
            virtual_segments,
            mean,
            q,
            occasion_probability,
            should_report,
        })
    }

    pub fn size_max_non_reported(&self) -> u64 {
        self.size_max_non_reported
    }

    pub fn order_for_which_computed(&self) -> u32 {
        self.order_for_which_computed
    }

    pub fn min_map_size_for_which_cache_valid(&self) -> u64 {
        self.min_map_size_for_which_cache_valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_cache_always_falls_through_to_slow_path() {
        let cache = InflatedCache::default();
        assert!(cache.might_be_poor(1, 1, 0));
    }

    #[test]
    fn inflated_segment_grows_past_cached_threshold_then_reports() {
        let mut cache = InflatedCache::default();
        let min_reporting_prob = 1e-9;
        let map_size = 1_000_000u64;
        let average_order = 10u32; // V = 1024

        let r = cache
            .recompute(min_reporting_prob, map_size, 180, average_order, average_order)
            .unwrap();
        assert_eq!(r.virtual_segments, 1024);
        assert!((r.mean - 976.6).abs() < 1.0);
        assert!((r.q - 0.979_7).abs() < 1e-3);
        assert!(!r.should_report, "size 180 should not be reported");
        assert!((cache.size_max_non_reported() as i64 - 1040).abs() <= 10);

        // growing past the cached threshold should now report.
        let big_size = cache.size_max_non_reported() + 100;
        let r2 = cache
            .recompute(min_reporting_prob, map_size, big_size, average_order, average_order)
            .unwrap();
        assert!(r2.should_report);
        assert!(r2.occasion_probability < min_reporting_prob * 10.0);
    }

    #[test]
    fn fast_path_agrees_with_normalized_size_comparison() {
        let mut cache = InflatedCache::default();
        cache
            .recompute(1e-9, 1_000_000, 180, 10, 10)
            .unwrap();

        // map_size below the validity floor always falls through.
        assert!(cache.might_be_poor(cache.min_map_size_for_which_cache_valid() - 1, 1, 10));

        // at/above the floor, matches compare_normalized against the cache.
        let at_floor = cache.min_map_size_for_which_cache_valid();
        let small = cache.size_max_non_reported();
        assert!(!cache.might_be_poor(at_floor, small, 10));
        assert!(cache.might_be_poor(at_floor, small + 1, 10));
    }
}
