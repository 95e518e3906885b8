//! Per-segment slot statistics aggregator.

use std::collections::BTreeMap;

use super::chain::relative_group_index;

/// `|alloc_idx - boundary| - (alloc_idx >= boundary ? 0 : 1)`: the boundary
/// itself is distance `0` on the "upper" (`alloc_idx >= boundary`) side,
/// making the metric asymmetric around the boundary.
pub fn distance_to_alloc_boundary(alloc_idx: usize, boundary: usize) -> usize {
    if alloc_idx >= boundary {
        alloc_idx - boundary
    } else {
        boundary - alloc_idx - 1
    }
}

/// Per-slot histograms for one segment (or the additive combination of many).
#[derive(Clone, Debug)]
pub struct SegmentStatsAggregator {
    chain_group_length: Vec<u64>,
    num_collision_key_comparisons: Vec<u64>,
    distance_to_alloc_boundary: Vec<u64>,
    num_full_slots: u64,
    num_segments: u64,
    num_segments_per_alloc_capacity: BTreeMap<usize, u64>,
}

impl SegmentStatsAggregator {
    pub fn new(num_groups: usize, alloc_capacity: usize) -> Self {
        Self {
            chain_group_length: vec![0; num_groups],
            num_collision_key_comparisons: vec![0; alloc_capacity.max(1)],
            distance_to_alloc_boundary: vec![0; alloc_capacity.max(1)],
            num_full_slots: 0,
            num_segments: 0,
            num_segments_per_alloc_capacity: BTreeMap::new(),
        }
    }

    fn ensure_capacity(hist: &mut Vec<u64>, len: usize) {
        if hist.len() < len {
            hist.resize(len, 0);
        }
    }

    /// Records one filled slot found in `group_idx` while probing from
    /// `base_group_idx`, with `num_collision_key_comparisons` comparisons
    /// made to find it and allocation index `alloc_idx` relative to
    /// `boundary`.
    pub fn record_slot(
        &mut self,
        chain_len_table: &[u32],
        base_group_idx: usize,
        group_idx: usize,
        num_collision_key_comparisons: usize,
        alloc_idx: usize,
        boundary: usize,
    ) {
        let rel = relative_group_index(chain_len_table, base_group_idx, group_idx);
        let chain_len = chain_len_table[rel] as usize;
        Self::ensure_capacity(&mut self.chain_group_length, chain_len + 1);
        self.chain_group_length[chain_len] += 1;

        Self::ensure_capacity(
            &mut self.num_collision_key_comparisons,
            num_collision_key_comparisons + 1,
        );
        self.num_collision_key_comparisons[num_collision_key_comparisons] += 1;

        let dist = distance_to_alloc_boundary(alloc_idx, boundary);
        Self::ensure_capacity(&mut self.distance_to_alloc_boundary, dist + 1);
        self.distance_to_alloc_boundary[dist] += 1;

        self.num_full_slots += 1;
    }

    pub fn record_segment(&mut self, alloc_capacity: usize) {
        self.num_segments += 1;
        *self
            .num_segments_per_alloc_capacity
            .entry(alloc_capacity)
            .or_insert(0) += 1;
    }

    /// Folds `other`'s counts into `self`: aggregators are additively
    /// combinable.
    pub fn combine(&mut self, other: &SegmentStatsAggregator) {
        Self::ensure_capacity(&mut self.chain_group_length, other.chain_group_length.len());
        for (i, &v) in other.chain_group_length.iter().enumerate() {
            self.chain_group_length[i] += v;
        }
        Self::ensure_capacity(
            &mut self.num_collision_key_comparisons,
            other.num_collision_key_comparisons.len(),
        );
        for (i, &v) in other.num_collision_key_comparisons.iter().enumerate() {
            self.num_collision_key_comparisons[i] += v;
        }
        Self::ensure_capacity(
            &mut self.distance_to_alloc_boundary,
            other.distance_to_alloc_boundary.len(),
        );
        for (i, &v) in other.distance_to_alloc_boundary.iter().enumerate() {
            self.distance_to_alloc_boundary[i] += v;
        }
        self.num_full_slots += other.num_full_slots;
        self.num_segments += other.num_segments;
        for (&cap, &count) in &other.num_segments_per_alloc_capacity {
            *self.num_segments_per_alloc_capacity.entry(cap).or_insert(0) += count;
        }
    }

    pub fn num_segments(&self) -> u64 {
        self.num_segments
    }

    pub fn num_full_slots(&self) -> u64 {
        self.num_full_slots
    }

    pub fn average_chain_group_length(&self) -> f64 {
        weighted_average(&self.chain_group_length)
    }

    pub fn average_num_collision_key_comparisons(&self) -> f64 {
        weighted_average(&self.num_collision_key_comparisons)
    }

    pub fn average_distance_to_alloc_boundary(&self) -> f64 {
        weighted_average(&self.distance_to_alloc_boundary)
    }

    pub fn chain_group_length_histogram(&self) -> &[u64] {
        &self.chain_group_length
    }

    pub fn num_collision_key_comparisons_histogram(&self) -> &[u64] {
        &self.num_collision_key_comparisons
    }

    pub fn distance_to_alloc_boundary_histogram(&self) -> &[u64] {
        &self.distance_to_alloc_boundary
    }

    pub fn num_segments_per_alloc_capacity(&self) -> &BTreeMap<usize, u64> {
        &self.num_segments_per_alloc_capacity
    }
}

fn weighted_average(histogram: &[u64]) -> f64 {
    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return 0.0;
    }
    let weighted: u64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &count)| i as u64 * count)
        .sum();
    weighted as f64 / total as f64
}
