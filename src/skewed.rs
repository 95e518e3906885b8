//! Skewed-split monitor.
//!
//! Records how imbalanced each segment split was, across two generations of
//! statistics that rotate as the map's average segment order changes, and
//! triggers a report once the count of skewed splits at some skewness level
//! exceeds the Binomial inverse-CDF bound for a well-distributed hash
//! function.

use crate::error::MonitorError;
use crate::stats::precomputed::BinomialInverseCdfTable;
use crate::stats::{binomial, MAX_SPLITS_WITH_PRECOMPUTED};

/// The number of skewness levels tracked, `{0,1,2,3}`.
pub const NUM_SKEW_LEVELS: usize = 4;
/// A segment's hash table has 48 slots, split across two halves of 24 each.
pub const HASH_TABLE_SLOTS: u32 = 48;

/// One generation's split counts: total splits observed, and, per skewness
/// level, how many of those splits were skewed at least that much plus the
/// last computed "safe to not report up to this count" bound.
#[derive(Debug, Clone, Default)]
pub struct SkewStats {
    n_splits: u64,
    counts: [u64; NUM_SKEW_LEVELS],
    max_non_reported_last_computed: [u64; NUM_SKEW_LEVELS],
}

impl SkewStats {
    pub fn n_splits(&self) -> u64 {
        self.n_splits
    }

    pub fn count(&self, level: usize) -> u64 {
        self.counts[level]
    }

    fn zero(&mut self) {
        *self = SkewStats::default();
    }
}

/// The two coexisting generations: `current` accounts splits whose prior
/// order is `average - 1`; `next` accounts splits whose prior order is
/// `average`.
#[derive(Debug, Clone, Default)]
pub struct SkewGenerations {
    pub current: SkewStats,
    pub next: SkewStats,
}

impl SkewGenerations {
    /// Rotates the generations for a change in computed average order of
    /// `delta = new_average - old_average`. A segment order change can only
    /// ever move the average up by one (a split happened) or down (a
    /// coalesce, or several); any other delta, including zero, means the
    /// host reported a change in average order when there wasn't one, which
    /// the caller never has a rotation for and treats as a bug.
    pub fn rotate(&mut self, delta: i64) -> Result<(), MonitorError> {
        match delta {
            1 => {
                self.current = std::mem::take(&mut self.next);
                self.next.zero();
            }
            -1 => {
                self.next = std::mem::take(&mut self.current);
                self.current.zero();
            }
            d if d <= -2 => {
                self.current.zero();
                self.next.zero();
            }
            d => {
                return Err(MonitorError::IllegalState(format!(
                    "average segment order changed by an unsupported delta: {}",
                    d
                )));
            }
        }
        Ok(())
    }
}

/// `skewness_level = 3 - max(0, 24 - max_keys_half)`, or `None` if the split
/// isn't skewed enough to account per-level (`max_keys_half < 25`).
fn skewness_level(max_keys_half: u32) -> Option<usize> {
    let half = HASH_TABLE_SLOTS / 2; // 24
    if max_keys_half < half + 1 {
        return None;
    }
    let level = 3i64 - (half as i64 - max_keys_half as i64).max(0);
    Some(level.clamp(0, 3) as usize)
}

/// Outcome of accounting one split.
pub enum AccountResult {
    /// Nothing to report.
    Ok,
    /// The skewed monitor should emit a `TooManySkewedSegmentSplits`
    /// occasion for this `level`, with `n_splits` and `count` at the time of
    /// the report.
    Report { level: usize, n_splits: u64, count: u64 },
}

/// Per-skew-level precomputed tables. `p` differs per level (`P_skew[level]`)
/// but `q = min_reporting_prob` is fixed for the monitor's lifetime, so one
/// table per level, shared across both generations, covers every lookup.
pub struct SkewTables {
    tables: [BinomialInverseCdfTable; NUM_SKEW_LEVELS],
}

impl SkewTables {
    pub fn new(p_skew: [f64; NUM_SKEW_LEVELS], min_reporting_prob: f64) -> Self {
        Self {
            tables: p_skew.map(|p| BinomialInverseCdfTable::new(p, min_reporting_prob)),
        }
    }
}

/// Generation-scoped accounting of one split. `p_skew[l]` is the probability
/// mass for skewness level `l`; each level gets its own table since each has
/// a different `p`.
pub fn account_split(
    stats: &mut SkewStats,
    tables: &mut SkewTables,
    p_skew: &[f64; NUM_SKEW_LEVELS],
    min_reporting_prob: f64,
    num_keys_half_1: u32,
    num_keys_half_2: u32,
) -> AccountResult {
    stats.n_splits += 1;
    let max_keys_half = num_keys_half_1.max(num_keys_half_2);
    let level = match skewness_level(max_keys_half) {
        Some(level) => level,
        None => return AccountResult::Ok,
    };

    for l in (0..=level).rev() {
        stats.counts[l] += 1;
        let count = stats.counts[l];

        if count <= stats.max_non_reported_last_computed[l] {
            continue;
        }

        let lower = (p_skew[l] * stats.n_splits as f64).floor() as u64;
        if count <= lower {
            stats.max_non_reported_last_computed[l] = lower;
            continue;
        }

        let prev_bound = stats.max_non_reported_last_computed[l].max(lower);
        let precise = if stats.n_splits <= MAX_SPLITS_WITH_PRECOMPUTED {
            tables.tables[l].inverse_cdf(stats.n_splits, prev_bound)
        } else {
            binomial::inverse_cdf_approx(stats.n_splits, p_skew[l], min_reporting_prob, prev_bound)
        };

        if count <= precise {
            stats.max_non_reported_last_computed[l] = precise;
            continue;
        }

        return AccountResult::Report {
            level: l,
            n_splits: stats.n_splits,
            count,
        };
    }
    AccountResult::Ok
}
