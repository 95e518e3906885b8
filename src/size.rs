//! Cross-order segment size comparison.
//!
//! A segment of order `o` covers `1/2^o` of the hash space, so two segments
//! of different orders need their sizes normalized to the same order before
//! they can be compared: a segment of size `size` and order `order` holds,
//! per unit of hash space, `size * 2^-order` keys.

use std::cmp::Ordering;

/// Clamp shift amounts so the `i128` widening below never overflows even for
/// pathological order differences; any real segment order fits comfortably
/// under this.
const MAX_SHIFT: u32 = 100;

/// `size1 * 2^max(order2-order1, 0) - size2 * 2^max(order1-order2, 0)`,
/// i.e. both sizes normalized to `max(order1, order2)` and then subtracted,
/// using widened arithmetic so no precision is lost.
pub fn normalize(size1: u64, order1: u32, size2: u64, order2: u32) -> i128 {
    let shift1 = order2.saturating_sub(order1).min(MAX_SHIFT);
    let shift2 = order1.saturating_sub(order2).min(MAX_SHIFT);
    ((size1 as i128) << shift1) - ((size2 as i128) << shift2)
}

/// Total order over "size per unit of hash space" compatible with the sign
/// of `size1*2^-order1 - size2*2^-order2`.
pub fn compare_normalized(size1: u64, order1: u32, size2: u64, order2: u32) -> Ordering {
    normalize(size1, order1, size2, order2).cmp(&0)
}
