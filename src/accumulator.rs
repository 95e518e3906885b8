//! Map-level stats accumulator: buckets per-segment aggregators by
//! `(segment_order, num_non_empty_slots)` and produces a formatted
//! "segment order and load distribution" dump.

use std::collections::BTreeMap;

use crate::probing::report::format_histogram;
use crate::probing::SegmentStatsAggregator;

pub struct MapStatsAccumulator {
    num_groups: usize,
    by_order_and_load: BTreeMap<(u32, u32), SegmentStatsAggregator>,
    num_inflated_segments: u64,
}

impl MapStatsAccumulator {
    pub fn new(num_groups: usize) -> Self {
        Self {
            num_groups,
            by_order_and_load: BTreeMap::new(),
            num_inflated_segments: 0,
        }
    }

    /// Folds one ordinary segment's slot aggregator into the bucket for its
    /// `(segment_order, num_non_empty_slots)`.
    pub fn record_ordinary_segment(
        &mut self,
        segment_order: u32,
        num_non_empty_slots: u32,
        segment_stats: &SegmentStatsAggregator,
    ) {
        let entry = self
            .by_order_and_load
            .entry((segment_order, num_non_empty_slots))
            .or_insert_with(|| SegmentStatsAggregator::new(self.num_groups, 1));
        entry.combine(segment_stats);
    }

    /// Inflated segments are tallied separately, not aggregated into the
    /// ordinary per-slot histograms.
    pub fn record_inflated_segment(&mut self) {
        self.num_inflated_segments += 1;
    }

    pub fn num_inflated_segments(&self) -> u64 {
        self.num_inflated_segments
    }

    /// Number of ordinary segments observed at each segment order.
    pub fn per_order_segment_counts(&self) -> BTreeMap<u32, u64> {
        let mut counts = BTreeMap::new();
        for ((order, _), agg) in &self.by_order_and_load {
            *counts.entry(*order).or_insert(0) += agg.num_segments();
        }
        counts
    }

    /// The additive combination of every bucketed aggregator.
    pub fn total_aggregator(&self) -> SegmentStatsAggregator {
        let mut total = SegmentStatsAggregator::new(self.num_groups, 1);
        for agg in self.by_order_and_load.values() {
            total.combine(agg);
        }
        total
    }

    /// The additive combination of every aggregator for a given
    /// `num_non_empty_slots`, across all segment orders.
    pub fn per_load_aggregator(&self) -> BTreeMap<u32, SegmentStatsAggregator> {
        let mut by_load: BTreeMap<u32, SegmentStatsAggregator> = BTreeMap::new();
        for ((_, load), agg) in &self.by_order_and_load {
            by_load
                .entry(*load)
                .or_insert_with(|| SegmentStatsAggregator::new(self.num_groups, 1))
                .combine(agg);
        }
        by_load
    }

    /// Formats the segment order and load distribution report.
    pub fn format_report(&self) -> String {
        let mut out = String::new();
        let counts = self.per_order_segment_counts();
        let histogram: Vec<u64> = (0..=counts.keys().copied().max().unwrap_or(0))
            .map(|order| *counts.get(&order).unwrap_or(&0))
            .collect();
        out.push_str(&format_histogram("segment_order", "segments", &histogram));

        if self.num_inflated_segments > 0 {
            out.push_str(&format!("inflated segments: {}\n", self.num_inflated_segments));
        }

        let total = self.total_aggregator();
        out.push_str(&format_histogram(
            "chain_group_length",
            "slots",
            total.chain_group_length_histogram(),
        ));
        out.push_str(&format_histogram(
            "num_collision_key_comparisons",
            "slots",
            total.num_collision_key_comparisons_histogram(),
        ));
        out.push_str(&format_histogram(
            "distance_to_alloc_boundary",
            "slots",
            total.distance_to_alloc_boundary_histogram(),
        ));
        out
    }
}
