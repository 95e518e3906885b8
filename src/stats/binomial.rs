//! Binomial(n,p) CDF and inverse CDF.
//!
//! Two regimes:
//! - `n <= MAX_SPLITS_WITH_PRECOMPUTED`: exact pmf via forward recurrence,
//!   cheap enough to memoize in a table (see [`crate::stats::precomputed`]).
//! - larger `n`: a normal/Edgeworth approximation with a continuity
//!   correction, since an exact pmf recurrence over millions of splits would
//!   dominate the skewed-split hot path.
//!
//! The per-skewness-level split probabilities are derived here at run time
//! as `2 * Binomial(48, 0.5).ccdf(28+s)` rather than hard-coded, since the
//! exact recurrence for `n=48` is cheap and this avoids carrying copied
//! decimal literals nobody can re-derive.

use super::normal;

/// Exact pmf of Binomial(n,p) as a dense array of length `n+1`, built by the
/// standard forward recurrence `pmf_n[k] = pmf_{n-1}[k]*(1-p) + pmf_{n-1}[k-1]*p`.
/// `O(n^2)` total; intended only for `n` bounded by `MAX_SPLITS_WITH_PRECOMPUTED`.
pub fn pmf_array(n: u64, p: f64) -> Vec<f64> {
    debug_assert!((0.0..=1.0).contains(&p));
    let mut pmf = vec![1.0f64];
    for _ in 0..n {
        let mut next = vec![0.0; pmf.len() + 1];
        next[0] = pmf[0] * (1.0 - p);
        for k in 1..pmf.len() {
            next[k] = pmf[k] * (1.0 - p) + pmf[k - 1] * p;
        }
        *next.last_mut().unwrap() = pmf[pmf.len() - 1] * p;
        pmf = next;
    }
    pmf
}

/// Exact `CDF(k; n, p)` via the full pmf array. `O(n)`.
pub fn cdf_exact(n: u64, p: f64, k: u64) -> f64 {
    let pmf = pmf_array(n, p);
    let k = (k as usize).min(pmf.len() - 1);
    pmf[..=k].iter().sum()
}

/// `P_skew[s]` for `s` in `0..4`: twice the Binomial(48, 1/2) upper tail
/// probability of at least `29+s` keys landing on one half of a split.
pub fn p_skew() -> [f64; 4] {
    let pmf = pmf_array(48, 0.5);
    let mut out = [0.0; 4];
    for (s, slot) in out.iter_mut().enumerate() {
        let tail: f64 = pmf[(29 + s)..].iter().sum();
        *slot = 2.0 * tail;
    }
    out
}

/// Continuity-corrected Edgeworth approximation of `CDF(k; n, p)`, for `n`
/// too large to compute the exact pmf. First-order skew correction on top
/// of the normal approximation: `Phi(z) - phi(z)*skew/6*(z^2-1)`.
pub fn approx_cdf(n: u64, p: f64, k: u64) -> f64 {
    debug_assert!((0.0..=1.0).contains(&p));
    let n = n as f64;
    let mean = n * p;
    let var = n * p * (1.0 - p);
    if var <= 0.0 {
        return if (k as f64) >= mean { 1.0 } else { 0.0 };
    }
    let sigma = var.sqrt();
    let z = (k as f64 + 0.5 - mean) / sigma;
    let skew = (1.0 - 2.0 * p) / sigma;
    let phi = (-0.5 * z * z).exp() / (2.0 * std::f64::consts::PI).sqrt();
    let approx = normal::cdf(z) - phi * skew / 6.0 * (z * z - 1.0);
    approx.clamp(0.0, 1.0)
}

/// Smallest `k` in `[k_prev, n]` such that `approx_cdf(k; n, p) >= q`,
/// biased to never return less than `k_prev` — the same monotonic-
/// tightening contract the precomputed table guarantees, since callers
/// reuse the previous bound as a starting point rather than recomputing
/// from scratch.
pub fn inverse_cdf_approx(n: u64, p: f64, q: f64, k_prev: u64) -> u64 {
    debug_assert!(q > 0.0 && q <= 1.0);
    if n == 0 {
        return 0;
    }
    let mut lo = k_prev.min(n);
    let mut hi = lo.max(1);
    while hi < n && approx_cdf(n, p, hi) < q {
        hi = (hi * 2).min(n).max(hi + 1);
    }
    hi = hi.min(n);
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if approx_cdf(n, p, mid) >= q {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    lo.max(k_prev)
}
