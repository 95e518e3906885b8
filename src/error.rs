//! Error type for the monitor's unrecoverable-bug cases.
//!
//! A reported occasion is *not* an error: it is the monitor's normal output,
//! delivered through [`crate::reporter::ReportSink`]. The variants here are
//! for host contract violations the monitor cannot make sense of.

use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum MonitorError {
    /// The host's computed average segment order changed by an impossible
    /// delta (anything other than +1, -1, or <= -2 relative to the previous
    /// average).
    IllegalState(String),
    /// An internal sanity check failed, e.g. a cached `min_map_size_for_which_cache_valid`
    /// exceeded the map size that produced it.
    Assertion(String),
    /// `prior_segment_order` for a reported split exceeds `max_splittable_segment_order`
    /// for the current average, which can only happen if the host is serializing
    /// mutations incorrectly.
    ConcurrentModification(String),
}

impl Display for MonitorError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MonitorError::IllegalState(msg) => f.write_fmt(format_args!("illegal state: {}", msg)),
            MonitorError::Assertion(msg) => f.write_fmt(format_args!("assertion failed: {}", msg)),
            MonitorError::ConcurrentModification(msg) => {
                f.write_fmt(format_args!("concurrent modification: {}", msg))
            }
        }
    }
}

impl std::error::Error for MonitorError {}
