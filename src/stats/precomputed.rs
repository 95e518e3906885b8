//! Precomputed Binomial inverse-CDF table for `n <= MAX_SPLITS_WITH_PRECOMPUTED`.
//!
//! A packed lookup keyed by `n`. Since `q` is fixed to the monitor's
//! `min_reporting_prob` for the whole lifetime of a map, and there are only
//! four skew levels (one fixed `p` each), a table per `(p, q)` pair covers
//! every lookup a given monitor will ever make. Rather than bake in a static
//! array computed offline, this builds the table lazily and incrementally:
//! each call grows the table up to the requested `n` by one row of
//! Pascal's-triangle-style pmf recurrence, reusing the previous row to avoid
//! per-call allocation on the hot split path.

use super::binomial;
use super::MAX_SPLITS_WITH_PRECOMPUTED;

pub struct BinomialInverseCdfTable {
    p: f64,
    q: f64,
    pmf: Vec<f64>,
    /// `k_for_n[n]` = smallest `k` with `CDF(k; n, p) >= q`.
    k_for_n: Vec<u32>,
}

impl BinomialInverseCdfTable {
    pub fn new(p: f64, q: f64) -> Self {
        Self {
            p,
            q,
            pmf: vec![1.0],
            k_for_n: vec![0],
        }
    }

    fn built_n(&self) -> u64 {
        (self.pmf.len() - 1) as u64
    }

    fn extend_to(&mut self, n: u64) {
        debug_assert!(n <= MAX_SPLITS_WITH_PRECOMPUTED);
        while self.built_n() < n {
            let prev = &self.pmf;
            let mut next = vec![0.0; prev.len() + 1];
            next[0] = prev[0] * (1.0 - self.p);
            for k in 1..prev.len() {
                next[k] = prev[k] * (1.0 - self.p) + prev[k - 1] * self.p;
            }
            *next.last_mut().unwrap() = prev[prev.len() - 1] * self.p;
            self.pmf = next;

            let mut cum = 0.0;
            let mut k_found = self.pmf.len() as u32 - 1;
            for (k, &mass) in self.pmf.iter().enumerate() {
                cum += mass;
                if cum >= self.q {
                    k_found = k as u32;
                    break;
                }
            }
            self.k_for_n.push(k_found);
        }
    }

    /// Smallest `k` with `CDF(k; n, p) >= q`, at least `k_prev`.
    pub fn inverse_cdf(&mut self, n: u64, k_prev: u64) -> u64 {
        debug_assert!(n <= MAX_SPLITS_WITH_PRECOMPUTED);
        self.extend_to(n);
        (self.k_for_n[n as usize] as u64).max(k_prev)
    }
}
