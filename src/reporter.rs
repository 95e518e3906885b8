//! Reporting occasions and the [`ReportSink`] trait.
//!
//! The reporter is the crate's only polymorphic boundary: everything else is
//! concrete. A [`ReportSink`] is handed the host map by borrow, per event,
//! rather than retained by the monitor — the monitor itself never stores a
//! map reference.

use indexmap::IndexMap;

use crate::host::Host;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccasionKind {
    TooLargeInflatedSegment,
    TooManySkewedSegmentSplits,
    /// Reserved: no occasion of this kind is ever emitted yet. Kept as an
    /// interface hole, not wired up.
    TooManyInflatedSegments,
}

/// A reporting occasion: a structured signal that the observed hash
/// distribution looks statistically implausible for a well-behaved hash
/// function. Not an error — delivered through [`ReportSink`], not `Result`.
pub struct Occasion<'a, H: Host + ?Sized> {
    pub kind: OccasionKind,
    pub message: String,
    debug: Box<dyn Fn() -> IndexMap<String, String> + 'a>,
    pub segment: Option<&'a H::InflatedSegment>,
    pub excluded_key: Option<&'a H::Key>,
}

impl<'a, H: Host + ?Sized> Occasion<'a, H> {
    pub fn new(
        kind: OccasionKind,
        message: String,
        debug: impl Fn() -> IndexMap<String, String> + 'a,
    ) -> Self {
        Self {
            kind,
            message,
            debug: Box::new(debug),
            segment: None,
            excluded_key: None,
        }
    }

    pub fn with_inflated(mut self, segment: &'a H::InflatedSegment, excluded_key: &'a H::Key) -> Self {
        self.segment = Some(segment);
        self.excluded_key = Some(excluded_key);
        self
    }

    /// Evaluates the lazy debug map. Intended to be called at most once per
    /// occasion — nothing prevents calling it more than once, but there is
    /// no reason for a sink to do so.
    pub fn debug_map(&self) -> IndexMap<String, String> {
        (self.debug)()
    }
}

/// The single polymorphic boundary between the monitor and its host: a sink
/// for reporting occasions. For `TooLargeInflatedSegment` occasions, the
/// return value is "did you remove the offending element"; for all other
/// kinds it is ignored.
pub trait ReportSink<H: Host> {
    fn report(&mut self, map: &H, occasion: &Occasion<'_, H>) -> bool;
}

impl<H: Host, F> ReportSink<H> for F
where
    F: FnMut(&H, &Occasion<'_, H>) -> bool,
{
    fn report(&mut self, map: &H, occasion: &Occasion<'_, H>) -> bool {
        self(map, occasion)
    }
}
