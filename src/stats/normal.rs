//! Standard normal CDF and its inverse (quantile function).
//!
//! `cdf` is expressed via `erf`, which is in turn expressed via the
//! regularized lower incomplete gamma function (`erf(x) = sign(x)·P(1/2, x²)`),
//! reusing [`crate::stats::gamma`] rather than a separate erf approximation.
//! `inverse_cdf` uses Peter Acklam's rational approximation, accurate to
//! about 1.15e-9 absolute error, which is more than enough given the 1%
//! safety margin callers of the χ² kernel are required to apply.

use super::gamma::gamma_p;

pub fn erf(x: f64) -> f64 {
    if x == 0.0 {
        return 0.0;
    }
    let p = gamma_p(0.5, x * x);
    if x > 0.0 {
        p
    } else {
        -p
    }
}

pub fn cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

// Coefficients for Acklam's rational approximation of the inverse normal CDF.
const A: [f64; 6] = [
    -3.969_683_028_665_376e1,
    2.209_460_984_245_205e2,
    -2.759_285_104_469_687e2,
    1.383_577_518_672_690e2,
    -3.066_479_806_614_716e1,
    2.506_628_277_459_239,
];
const B: [f64; 5] = [
    -5.447_609_879_822_406e1,
    1.615_858_368_580_409e2,
    -1.556_989_798_598_866e2,
    6.680_131_188_771_972e1,
    -1.328_068_155_288_572e1,
];
const C: [f64; 6] = [
    -7.784_894_002_430_293e-3,
    -3.223_964_580_411_365e-1,
    -2.400_758_277_161_838,
    -2.549_732_539_343_734,
    4.374_664_141_464_968,
    2.938_163_982_698_783,
];
const D: [f64; 4] = [
    7.784_695_709_041_462e-3,
    3.224_671_290_700_398e-1,
    2.445_134_137_142_996,
    3.754_408_661_907_416,
];

const P_LOW: f64 = 0.024_25;

/// Inverse of the standard normal CDF ("quantile function" / z-score for `q`).
pub fn inverse_cdf(q: f64) -> f64 {
    debug_assert!(q > 0.0 && q < 1.0, "q out of (0,1): {}", q);
    let p_high = 1.0 - P_LOW;
    if q < P_LOW {
        let r = (-2.0 * q.ln()).sqrt();
        (((((C[0] * r + C[1]) * r + C[2]) * r + C[3]) * r + C[4]) * r + C[5])
            / ((((D[0] * r + D[1]) * r + D[2]) * r + D[3]) * r + 1.0)
    } else if q <= p_high {
        let r = q - 0.5;
        let t = r * r;
        (((((A[0] * t + A[1]) * t + A[2]) * t + A[3]) * t + A[4]) * t + A[5]) * r
            / (((((B[0] * t + B[1]) * t + B[2]) * t + B[3]) * t + B[4]) * t + 1.0)
    } else {
        let r = (-2.0 * (1.0 - q).ln()).sqrt();
        -(((((C[0] * r + C[1]) * r + C[2]) * r + C[3]) * r + C[4]) * r + C[5])
            / ((((D[0] * r + D[1]) * r + D[2]) * r + D[3]) * r + 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cdf_of_zero_is_half() {
        assert!((cdf(0.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn inverse_cdf_round_trips_through_cdf() {
        for &q in &[0.001, 0.01, 0.1, 0.3, 0.5, 0.7, 0.9, 0.99, 0.999, 0.999_999] {
            let z = inverse_cdf(q);
            let back = cdf(z);
            assert!((back - q).abs() < 1e-6, "q={} z={} back={}", q, z, back);
        }
    }

    #[test]
    fn inverse_cdf_known_values() {
        // z for q=0.975 is ~1.959964
        assert!((inverse_cdf(0.975) - 1.959_964).abs() < 1e-4);
        assert!((inverse_cdf(0.5) - 0.0).abs() < 1e-9);
    }
}
