//! [`Monitor`], the facade that ties the statistical kernels, the inflated-
//! segment cache, and the skewed-split generations together behind the
//! host-facing API.
//!
//! The monitor owns its reporting callback: the ownership chain runs
//! map -> monitor -> callback, never the reverse. Every inbound method below
//! borrows the host map for the duration of the call rather than retaining it.

use indexmap::IndexMap;

use crate::error::MonitorError;
use crate::host::Host;
use crate::inflated::InflatedCache;
use crate::reporter::{Occasion, OccasionKind, ReportSink};
use crate::skewed::{self, AccountResult, SkewGenerations, SkewTables, NUM_SKEW_LEVELS};
use crate::stats::binomial;

/// One per map. `H` is the host map's own contract; `S` is the user's
/// reporting callback, owned rather than borrowed per call.
pub struct Monitor<H: Host, S: ReportSink<H>> {
    min_reporting_prob: f64,
    sink: S,

    /// Latches false once a `TooLargeInflatedSegment` report's callback
    /// declines to remove the offending element.
    report_too_large_inflated: bool,
    /// Latches true after the first `TooManySkewedSegmentSplits` report:
    /// once set, the skewed monitor does no further work.
    has_reported_too_many_skewed: bool,

    /// The host's last-reported average segment order, used to pick a
    /// split's generation and to normalize inflated-segment sizes.
    average_order: u32,
    /// Whether `average_segment_order_updated` has been called yet. The
    /// first call establishes the starting average order directly, with no
    /// prior generation state to rotate out of; every later call goes
    /// through the ordinary delta-validated rotation.
    average_order_initialized: bool,

    inflated: InflatedCache,
    skew: SkewGenerations,
    p_skew: [f64; NUM_SKEW_LEVELS],
    skew_tables: SkewTables,

    _host: std::marker::PhantomData<H>,
}

impl<H: Host, S: ReportSink<H>> Monitor<H, S> {
    /// `min_reporting_prob` is the lower bound on `P[occasion | uniform
    /// hash]` below which an occasion is worth surfacing; `sink` is the
    /// user's reporting callback. The starting average segment order is set
    /// by the first call to [`Self::average_segment_order_updated`], not
    /// here.
    pub fn new(min_reporting_prob: f64, sink: S) -> Self {
        debug_assert!(min_reporting_prob > 0.0 && min_reporting_prob <= 1.0);
        let p_skew = binomial::p_skew();
        Self {
            min_reporting_prob,
            sink,
            report_too_large_inflated: true,
            has_reported_too_many_skewed: false,
            average_order: 0,
            average_order_initialized: false,
            inflated: InflatedCache::default(),
            skew: SkewGenerations::default(),
            p_skew,
            skew_tables: SkewTables::new(p_skew, min_reporting_prob),
            _host: std::marker::PhantomData,
        }
    }

    /// Whether the inflated-segment monitor would still surface a report
    /// (it latches off once a callback declines to remove the offending
    /// element).
    pub fn is_reporting_too_large_inflated_segment(&self) -> bool {
        self.report_too_large_inflated
    }

    /// Borrows the owned reporting callback, e.g. for tests that need to
    /// inspect what was reported.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Mutably borrows the owned reporting callback.
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Rotates the skewed-split generations for a change in the host's
    /// computed average segment order, and remembers the new average for
    /// subsequent `account_segment_split`/inflated calls.
    ///
    /// The very first call establishes the starting average order: there is
    /// no prior generation state to rotate out of yet, so `old` is ignored
    /// and no delta is validated. Every call after that rotates on
    /// `new - old` as usual.
    pub fn average_segment_order_updated(&mut self, old: u32, new: u32) -> Result<(), MonitorError> {
        if !self.average_order_initialized {
            self.average_order = new;
            self.average_order_initialized = true;
            return Ok(());
        }
        let delta = new as i64 - old as i64;
        self.skew.rotate(delta)?;
        self.average_order = new;
        Ok(())
    }

    /// Records how imbalanced a completed split was, reporting
    /// `TooManySkewedSegmentSplits` if the count of skewed splits at some
    /// level now exceeds what a well-behaved hash function would plausibly
    /// produce.
    pub fn account_segment_split(
        &mut self,
        host: &H,
        prior_segment_order: u32,
        num_keys_half_1: u32,
        total_num_keys_before_split: u32,
    ) -> Result<(), MonitorError> {
        if self.has_reported_too_many_skewed {
            return Ok(());
        }
        let num_keys_half_2 = total_num_keys_before_split - num_keys_half_1;

        let stats = if self.average_order > 0 && prior_segment_order == self.average_order - 1 {
            &mut self.skew.current
        } else if prior_segment_order == self.average_order {
            &mut self.skew.next
        } else {
            if prior_segment_order > host.max_splittable_segment_order(self.average_order) {
                return Err(MonitorError::ConcurrentModification(format!(
                    "split from prior_segment_order {} exceeds max_splittable_segment_order({}) = {}",
                    prior_segment_order,
                    self.average_order,
                    host.max_splittable_segment_order(self.average_order)
                )));
            }
            // behind-the-average split: silently not accounted.
            return Ok(());
        };

        let result = skewed::account_split(
            stats,
            &mut self.skew_tables,
            &self.p_skew,
            self.min_reporting_prob,
            num_keys_half_1,
            num_keys_half_2,
        );

        if let AccountResult::Report { level, n_splits, count } = result {
            self.has_reported_too_many_skewed = true;
            let message = format!(
                "too many skewed segment splits at skewness level {}: {} of {} splits (p_skew={:.5})",
                level, count, n_splits, self.p_skew[level]
            );
            let occasion = Occasion::<H>::new(OccasionKind::TooManySkewedSegmentSplits, message, move || {
                let mut debug = IndexMap::new();
                debug.insert("skewness_level".to_string(), level.to_string());
                debug.insert("count".to_string(), count.to_string());
                debug.insert("n_splits".to_string(), n_splits.to_string());
                debug
            });
            self.sink.report(host, &occasion);
        }
        Ok(())
    }

    /// The inflated-segment size monitor's full hot+slow path. `order` is
    /// the inflated segment's own order (not necessarily the average).
    #[allow(clippy::too_many_arguments)]
    pub fn check_and_report_too_large_inflated_segment(
        &mut self,
        host: &mut H,
        segment: &mut H::InflatedSegment,
        order: u32,
        map_size: u64,
        inflated_size: u64,
        excluded_key_hash: u64,
        excluded_key: &H::Key,
    ) -> Result<(), MonitorError> {
        if !self.report_too_large_inflated {
            return Ok(());
        }
        if !self.inflated.might_be_poor(map_size, inflated_size, order) {
            return Ok(());
        }
        self.check_and_report_slow(host, segment, order, map_size, inflated_size, excluded_key_hash, excluded_key)
    }

    /// The rare path out of [`Self::check_and_report_too_large_inflated_segment`],
    /// kept separate so the hot-path method above stays small.
    #[allow(clippy::too_many_arguments)]
    fn check_and_report_slow(
        &mut self,
        host: &mut H,
        segment: &mut H::InflatedSegment,
        order: u32,
        map_size: u64,
        inflated_size: u64,
        excluded_key_hash: u64,
        excluded_key: &H::Key,
    ) -> Result<(), MonitorError> {
        let average_order = host.compute_average_segment_order(map_size);
        if host.try_split_inflated(segment, order, excluded_key_hash, excluded_key) {
            // successfully split: nothing to report for this call.
            return Ok(());
        }
        debug_assert!(order >= average_order, "try_split_inflated must leave order >= average_order on failure");

        let recomputed =
            self.inflated
                .recompute(self.min_reporting_prob, map_size, inflated_size, order, average_order)?;

        if !recomputed.should_report {
            return Ok(());
        }

        let average_order_dbg = recomputed.average_order;
        let virtual_segments = recomputed.virtual_segments;
        let mean = recomputed.mean;
        let q = recomputed.q;
        let occasion_probability = recomputed.occasion_probability;
        let size_max_non_reported = self.inflated.size_max_non_reported();
        let min_map_size = self.inflated.min_map_size_for_which_cache_valid();

        let message = format!(
            "inflated segment of size {} at order {} is implausibly large for a map of size {} \
             (occasion probability {:.3e} < min_reporting_prob {:.3e})",
            inflated_size, order, map_size, occasion_probability, self.min_reporting_prob
        );
        let occasion = Occasion::<H>::new(OccasionKind::TooLargeInflatedSegment, message, move || {
            let mut debug = IndexMap::new();
            debug.insert("average_order".to_string(), average_order_dbg.to_string());
            debug.insert("virtual_segments".to_string(), virtual_segments.to_string());
            debug.insert("mean".to_string(), format!("{:.3}", mean));
            debug.insert("q".to_string(), format!("{:.6}", q));
            debug.insert("ccdf_expr".to_string(), "1 - CDF(size_virtual - 1; mean)".to_string());
            debug.insert("occasion_probability".to_string(), format!("{:.3e}", occasion_probability));
            debug.insert("size_max_non_reported".to_string(), size_max_non_reported.to_string());
            debug.insert("min_map_size_for_which_cache_valid".to_string(), min_map_size.to_string());
            debug
        })
        .with_inflated(segment, excluded_key);

        let removed_some_element = self.sink.report(host, &occasion);
        self.report_too_large_inflated = removed_some_element;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct FakeMap {
        average_order: u32,
        max_splittable: u32,
        split_succeeds: bool,
    }

    impl Host for FakeMap {
        type Key = u64;
        type InflatedSegment = u64;

        fn compute_average_segment_order(&mut self, _map_size: u64) -> u32 {
            self.average_order
        }

        fn max_splittable_segment_order(&self, _average_order: u32) -> u32 {
            self.max_splittable
        }

        fn try_split_inflated(
            &mut self,
            _segment: &mut Self::InflatedSegment,
            _order: u32,
            _excluded_key_hash: u64,
            _excluded_key: &Self::Key,
        ) -> bool {
            self.split_succeeds
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        reports: RefCell<Vec<OccasionKind>>,
        removal_reply: bool,
    }

    impl ReportSink<FakeMap> for RecordingSink {
        fn report(&mut self, _map: &FakeMap, occasion: &Occasion<'_, FakeMap>) -> bool {
            self.reports.borrow_mut().push(occasion.kind);
            let _ = occasion.debug_map();
            self.removal_reply
        }
    }

    #[test]
    fn average_order_rotation_moves_splits_between_generations() {
        let mut monitor = Monitor::<FakeMap, RecordingSink>::new(1e-9, RecordingSink::default());
        let host = FakeMap { average_order: 6, max_splittable: 10, split_succeeds: false };

        monitor.average_segment_order_updated(5, 6).unwrap();
        for _ in 0..10 {
            // prior_segment_order == average_order (6) touches `next`.
            monitor.account_segment_split(&host, 6, 24, 48).unwrap();
        }
        assert_eq!(monitor.skew.next.n_splits(), 10);
        assert_eq!(monitor.skew.current.n_splits(), 0);

        monitor.average_segment_order_updated(6, 5).unwrap();
        assert_eq!(monitor.skew.current.n_splits(), 10);
        assert_eq!(monitor.skew.next.n_splits(), 0);
    }

    #[test]
    fn pathological_skew_reports_once_then_latches() {
        let sink = RecordingSink::default();
        let mut monitor = Monitor::<FakeMap, RecordingSink>::new(1e-9, sink);
        let host = FakeMap { average_order: 6, max_splittable: 10, split_succeeds: false };
        monitor.average_segment_order_updated(0, 6).unwrap();

        for _ in 0..200 {
            monitor.account_segment_split(&host, 6, 48, 48).unwrap();
        }

        assert!(monitor.has_reported_too_many_skewed);
        assert_eq!(monitor.sink.reports.borrow().len(), 1);
        assert_eq!(monitor.sink.reports.borrow()[0], OccasionKind::TooManySkewedSegmentSplits);
    }

    #[test]
    fn split_past_max_splittable_order_is_concurrent_modification() {
        let mut monitor = Monitor::<FakeMap, RecordingSink>::new(1e-9, RecordingSink::default());
        let host = FakeMap { average_order: 6, max_splittable: 7, split_succeeds: false };
        monitor.average_segment_order_updated(0, 6).unwrap();

        // prior_segment_order = average + 2 = 8 > max_splittable (7).
        let err = monitor.account_segment_split(&host, 8, 24, 48).unwrap_err();
        assert!(matches!(err, MonitorError::ConcurrentModification(_)));
    }

    #[test]
    fn behind_the_average_split_is_silently_ignored() {
        let mut monitor = Monitor::<FakeMap, RecordingSink>::new(1e-9, RecordingSink::default());
        let host = FakeMap { average_order: 6, max_splittable: 10, split_succeeds: false };
        monitor.average_segment_order_updated(0, 6).unwrap();

        // prior_segment_order = 2 is neither average-1 nor average, and
        // below max_splittable: silently dropped, not an error.
        monitor.account_segment_split(&host, 2, 24, 48).unwrap();
        assert_eq!(monitor.skew.current.n_splits(), 0);
        assert_eq!(monitor.skew.next.n_splits(), 0);
    }

    #[test]
    fn successful_split_suppresses_report() {
        let mut monitor = Monitor::<FakeMap, RecordingSink>::new(1e-9, RecordingSink::default());
        let mut host = FakeMap { average_order: 10, max_splittable: 12, split_succeeds: true };
        let mut segment = 1_000_000u64;
        let key = 42u64;

        monitor
            .check_and_report_too_large_inflated_segment(&mut host, &mut segment, 10, 1_000_000, 1_000_000, 0, &key)
            .unwrap();
        assert_eq!(monitor.sink.reports.borrow().len(), 0);
    }

    #[test]
    fn inflated_segment_reports_then_latches_off_when_removal_declined() {
        let mut monitor = Monitor::<FakeMap, RecordingSink>::new(1e-9, RecordingSink::default());
        monitor.sink.removal_reply = false;
        let mut host = FakeMap { average_order: 10, max_splittable: 12, split_succeeds: false };
        let mut segment = 2_000u64;
        let key = 42u64;

        monitor
            .check_and_report_too_large_inflated_segment(&mut host, &mut segment, 10, 1_000_000, 2_000, 0, &key)
            .unwrap();
        assert_eq!(monitor.sink.reports.borrow().len(), 1);
        assert!(!monitor.is_reporting_too_large_inflated_segment());

        // further touches, however extreme, produce no more reports once latched off.
        monitor
            .check_and_report_too_large_inflated_segment(&mut host, &mut segment, 10, 1_000_000, 50_000, 0, &key)
            .unwrap();
        assert_eq!(monitor.sink.reports.borrow().len(), 1);
    }
}
