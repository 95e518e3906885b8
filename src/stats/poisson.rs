//! Poisson(λ) CDF, inverse CDF, and the mean-from-CDF helper.

use super::chi_square;
use super::gamma::gamma_q;

/// `P[Poisson(lambda) <= k]`, via the standard identity `CDF(k;lambda) = Q(k+1, lambda)`
/// (the regularized upper incomplete gamma function).
pub fn cdf(k: u64, lambda: f64) -> f64 {
    debug_assert!(lambda >= 0.0 && lambda.is_finite(), "bad lambda: {}", lambda);
    gamma_q(k as f64 + 1.0, lambda)
}

/// `P[Poisson(lambda) > k] = 1 - CDF(k; lambda)`.
pub fn ccdf(k: u64, lambda: f64) -> f64 {
    1.0 - cdf(k, lambda)
}

/// Smallest `k` such that `CDF(k; lambda) >= q`. Documented as "max
/// non-reported" by callers, since the reporting threshold falls on the
/// histogram bar at this `k`.
pub fn inverse_cdf(lambda: f64, q: f64) -> u64 {
    debug_assert!(lambda >= 0.0 && lambda.is_finite(), "bad lambda: {}", lambda);
    debug_assert!(q > 0.0 && q <= 1.0, "q out of (0,1]: {}", q);
    if lambda == 0.0 {
        return 0;
    }
    let mut hi: u64 = lambda.ceil().max(1.0) as u64;
    while cdf(hi, lambda) < q {
        hi = hi.saturating_mul(2).max(hi + 1);
    }
    let mut lo: u64 = 0;
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if cdf(mid, lambda) >= q {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    lo
}

/// The mean `lambda` such that `CDF(k; lambda) = cdf`, via the classical
/// identity `lambda = chi_square(2(k+1)).inverse_CDF(1 - cdf) / 2`.
///
/// `k` may be `-1` (the "no keys expected" edge case that arises from
/// `poisson_mean_by_cdf(size_max_non_reported - 1, q)` when
/// `size_max_non_reported` is `0`); the mean there is defined as `0`.
///
/// Precision here inherits the χ² approximation's imprecision; callers
/// apply a 1% safety margin rather than trusting this exactly.
pub fn mean_by_cdf(k: i64, cdf_target: f64) -> f64 {
    debug_assert!(cdf_target > 0.0 && cdf_target < 1.0, "bad cdf: {}", cdf_target);
    if k < 0 {
        return 0.0;
    }
    let degrees_of_freedom = 2.0 * (k as f64 + 1.0);
    chi_square::inverse_cdf(degrees_of_freedom, 1.0 - cdf_target) / 2.0
}
