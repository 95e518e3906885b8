//! Statistical kernels: Binomial and Poisson distributions plus the χ²
//! machinery they both lean on for large parameters. All kernels are total
//! for finite, in-domain inputs; out-of-domain inputs (NaN, negative λ,
//! p outside [0,1]) are programmer errors and are `debug_assert`ed rather
//! than threaded through `Result`, matching the kernels never being on a
//! path a caller can recover from mid-calculation.

pub mod binomial;
pub mod chi_square;
pub mod gamma;
pub mod normal;
pub mod poisson;
pub mod precomputed;

/// Above this `n`, the Binomial inverse-CDF bound uses the normal/Edgeworth
/// approximation rather than the exact, memoized pmf table. Chosen so that
/// split counts in the low hundreds to low thousands, the common case for a
/// single segment's lifetime, land comfortably inside the precomputed
/// regime.
pub const MAX_SPLITS_WITH_PRECOMPUTED: u64 = 1024;
