//! χ² inverse CDF, via the Wilson-Hilferty cube-root normal approximation.
//!
//! This backs [`crate::stats::poisson::mean_by_cdf`] (the classical
//! `Poisson CDF(k;λ) = χ²(2(k+1)).inverse_CDF(1-cdf)/2` identity) and the
//! large-`n` [`crate::stats::binomial`] approximation. Precision here is
//! explicitly untrusted by callers: `mean_by_cdf` documents a 1% safety
//! margin, and the Binomial approximation path is allowed a bounded margin
//! of false negatives rather than exactness.

use super::normal;

/// Approximate inverse CDF of the χ² distribution with `degrees_of_freedom`
/// degrees of freedom, via Wilson-Hilferty: `χ²(k,q) ≈ k·(1 - 2/(9k) + z_q·sqrt(2/(9k)))³`.
pub fn inverse_cdf(degrees_of_freedom: f64, q: f64) -> f64 {
    debug_assert!(degrees_of_freedom > 0.0);
    debug_assert!(q > 0.0 && q < 1.0, "q out of (0,1): {}", q);
    let k = degrees_of_freedom;
    let z = normal::inverse_cdf(q);
    let nine_k = 9.0 * k;
    let term = 1.0 - 2.0 / nine_k + z * (2.0 / nine_k).sqrt();
    (k * term * term * term).max(0.0)
}
