//! Precomputed quadratic-probing chain length table.
//!
//! `chain_len[g]` maps any group index reachable from group `0` by quadratic
//! probing (step 1, 2, 3, ...) back to the number of probes it took to reach
//! it. For a power-of-two `num_groups`, the triangular-number probing
//! sequence `0, 1, 3, 6, 10, ...  (mod num_groups)` visits every residue
//! exactly once before repeating, so the walk below terminates having filled
//! every entry.

/// Builds the chain length table for `num_groups` (a power of two). Walks
/// the quadratic probe sequence starting at group `0`, recording the probe
/// count at which each group is first reached, until the walk returns to an
/// already-visited group — which, for a power-of-two table, is exactly when
/// every group has been visited once.
pub fn build_chain_len(num_groups: usize) -> Vec<u32> {
    assert!(num_groups > 0 && num_groups.is_power_of_two());
    let mut chain_len = vec![u32::MAX; num_groups];
    let mut current = 0usize;
    let mut step: u64 = 1;
    let mut step_count: u32 = 0;
    loop {
        if chain_len[current] != u32::MAX {
            break;
        }
        chain_len[current] = step_count;
        current = ((current as u64 + step) % num_groups as u64) as usize;
        step += 1;
        step_count += 1;
    }
    chain_len
}

/// `(group_idx - base_group_idx) mod chain_len_table.len()`, the index into
/// `chain_len_table` for a slot found in `group_idx` while probing from
/// `base_group_idx`.
pub fn relative_group_index(chain_len_table: &[u32], base_group_idx: usize, group_idx: usize) -> usize {
    let g = chain_len_table.len();
    ((group_idx + g) - (base_group_idx % g)) % g
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_group_has_chain_length_zero() {
        let table = build_chain_len(64);
        assert_eq!(table[0], 0);
    }

    #[test]
    fn every_group_is_covered_exactly_once() {
        for &g in &[8usize, 16, 32, 64, 128, 256] {
            let table = build_chain_len(g);
            assert_eq!(table.len(), g);
            assert!(table.iter().all(|&v| v != u32::MAX), "num_groups={}", g);
            let mut seen: Vec<u32> = table.clone();
            seen.sort_unstable();
            let want: Vec<u32> = (0..g as u32).collect();
            assert_eq!(seen, want, "num_groups={}", g);
        }
    }

    #[test]
    fn relative_index_wraps() {
        let table = build_chain_len(16);
        assert_eq!(relative_group_index(&table, 0, 0), 0);
        assert_eq!(relative_group_index(&table, 5, 5), 0);
        assert_eq!(relative_group_index(&table, 15, 1), 2);
    }
}
