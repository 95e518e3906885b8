//! Human-readable histogram reports.
//!
//! Format: `"<prefix> <index>: <count> <name>, <pct>% <cum_pct>%"`, with
//! fixed column widths and all-zero rows elided.

use std::fmt::Write as _;

/// Formats `histogram` as one row per non-zero bucket, each with a
/// per-bucket percentage and a running cumulative percentage. Column widths
/// are computed so the index column is right-padded to the width of the
/// largest index and the count column to the width of the largest count.
pub fn format_histogram(prefix: &str, name: &str, histogram: &[u64]) -> String {
    let total: u64 = histogram.iter().sum();
    let max_index_width = histogram.len().saturating_sub(1).to_string().len().max(1);
    let max_count = histogram.iter().copied().max().unwrap_or(0);
    let count_width = max_count.to_string().len().max(1);

    let mut out = String::new();
    let mut cum = 0u64;
    for (i, &count) in histogram.iter().enumerate() {
        if count == 0 {
            continue;
        }
        cum += count;
        let pct = 100.0 * count as f64 / total.max(1) as f64;
        let cum_pct = 100.0 * cum as f64 / total.max(1) as f64;
        let _ = writeln!(
            out,
            "{prefix} {index:index_width$}: {count:count_width$} {name}, {pct:.2}% {cum_pct:.2}%",
            prefix = prefix,
            index = i,
            index_width = max_index_width,
            count = count,
            count_width = count_width,
            name = name,
            pct = pct,
            cum_pct = cum_pct,
        );
    }
    out
}
