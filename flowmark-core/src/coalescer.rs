//! Tracks watermarks on a task's input edges and decides when a new combined
//! watermark should be forwarded downstream.
//!
//! The combined watermark is forwarded once it has been confirmed by every
//! active input edge. An edge can declare itself idle by sending
//! [`IDLE_SIGNAL`] instead of a real watermark; such an edge is excluded from
//! coalescing until it produces an event or a real watermark again. An edge
//! whose upstream has finished permanently is reported via
//! [`WatermarkCoalescer::queue_done`] and is excluded forever.
//!
//! Three variants share the operation set and are selected once at
//! construction based on the number of edges: zero edges (source tasks),
//! exactly one edge (plain forwarding, no minimum to take) and two or more
//! edges (true coalescing).

use crate::error::Result;

mod multi;
mod single;
mod zero;

use multi::MultiInput;
use single::SingleInput;
use zero::ZeroInput;

/// Watermark value, in epoch milliseconds.
pub type Watermark = i64;

/// Reserved watermark an edge sends to declare itself idle. Compares greater
/// than every legitimate watermark; it is never stored as edge progress and
/// never returned as a combined watermark.
pub const IDLE_SIGNAL: Watermark = Watermark::MAX;

/// Floor value meaning "no progress confirmed yet". Compares lower than every
/// legitimate watermark.
pub const UNSET_WATERMARK: Watermark = Watermark::MIN;

/// Combines the per-edge watermarks of one task into the single watermark it
/// forwards downstream.
///
/// The hosting task calls [`observe_event`](Self::observe_event) for every
/// data item, [`observe_wm`](Self::observe_wm) for every watermark frame
/// (including [`IDLE_SIGNAL`] frames) and [`queue_done`](Self::queue_done)
/// exactly once per edge when that edge's upstream completes. Any `Some`
/// result is the new combined watermark to forward; after each call the task
/// should also poll [`idle_message_pending`](Self::idle_message_pending) and
/// forward an idle notification if it returns true.
#[derive(Debug)]
pub struct WatermarkCoalescer {
    inner: Variant,
}

#[derive(Debug)]
enum Variant {
    Zero(ZeroInput),
    Single(SingleInput),
    Multi(MultiInput),
}

impl WatermarkCoalescer {
    /// Creates a coalescer for a task with `edge_count` inbound edges,
    /// selecting the variant that matches the edge count.
    pub fn new(edge_count: usize) -> Self {
        let inner = match edge_count {
            0 => Variant::Zero(ZeroInput),
            1 => Variant::Single(SingleInput::new()),
            n => Variant::Multi(MultiInput::new(n)),
        };
        WatermarkCoalescer { inner }
    }

    /// Number of inbound edges this coalescer was created for.
    pub fn edge_count(&self) -> usize {
        match &self.inner {
            Variant::Zero(_) => 0,
            Variant::Single(_) => 1,
            Variant::Multi(multi) => multi.edge_count(),
        }
    }

    /// Records that a data item (not a watermark) arrived on `edge_index`.
    /// An idle edge producing data is active again, so its idle exclusion is
    /// lifted; the stored watermark for the edge is unchanged and no combined
    /// watermark is computed, because an event carries no timestamp guarantee.
    pub fn observe_event(&mut self, edge_index: usize) -> Result<()> {
        match &mut self.inner {
            Variant::Zero(zero) => zero.observe_event(edge_index),
            Variant::Single(single) => single.observe_event(edge_index),
            Variant::Multi(multi) => multi.observe_event(edge_index),
        }
    }

    /// Records a watermark received on `edge_index` and returns the new
    /// combined watermark, if any.
    ///
    /// `wm` may be [`IDLE_SIGNAL`], in which case the edge is excluded from
    /// coalescing but its recorded progress is unchanged. Watermarks on one
    /// edge must be strictly increasing (the idle signal included);
    /// [`Error::NonMonotonicWatermark`](crate::Error::NonMonotonicWatermark)
    /// is returned otherwise. The result is never `Some(IDLE_SIGNAL)`.
    pub fn observe_wm(&mut self, edge_index: usize, wm: Watermark) -> Result<Option<Watermark>> {
        match &mut self.inner {
            Variant::Zero(zero) => zero.observe_wm(edge_index, wm),
            Variant::Single(single) => single.observe_wm(edge_index, wm),
            Variant::Multi(multi) => multi.observe_wm(edge_index, wm),
        }
    }

    /// Marks `edge_index` as permanently exhausted and returns the new
    /// combined watermark, if any. Completion is terminal: a second call for
    /// the same edge returns
    /// [`Error::DuplicateCompletion`](crate::Error::DuplicateCompletion).
    pub fn queue_done(&mut self, edge_index: usize) -> Result<Option<Watermark>> {
        match &mut self.inner {
            Variant::Zero(zero) => zero.queue_done(edge_index),
            Variant::Single(single) => single.queue_done(edge_index),
            Variant::Multi(multi) => multi.queue_done(edge_index),
        }
    }

    /// Returns true if an idle notification should be forwarded downstream,
    /// then resets the flag. Can return true at most once after a call that
    /// left every remaining edge idle; never otherwise.
    pub fn idle_message_pending(&mut self) -> bool {
        match &mut self.inner {
            Variant::Zero(zero) => zero.idle_message_pending(),
            Variant::Single(single) => single.idle_message_pending(),
            Variant::Multi(multi) => multi.idle_message_pending(),
        }
    }

    /// The last combined watermark forwarded downstream, or
    /// [`UNSET_WATERMARK`] if none was emitted yet.
    pub fn coalesced_wm(&self) -> Watermark {
        match &self.inner {
            Variant::Zero(zero) => zero.coalesced_wm(),
            Variant::Single(single) => single.coalesced_wm(),
            Variant::Multi(multi) => multi.coalesced_wm(),
        }
    }

    /// The highest real watermark received on any edge, regardless of that
    /// edge's later idle or done status.
    pub fn top_observed_wm(&self) -> Watermark {
        match &self.inner {
            Variant::Zero(zero) => zero.top_observed_wm(),
            Variant::Single(single) => single.top_observed_wm(),
            Variant::Multi(multi) => multi.top_observed_wm(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_selection_by_edge_count() {
        assert_eq!(WatermarkCoalescer::new(0).edge_count(), 0);
        assert_eq!(WatermarkCoalescer::new(1).edge_count(), 1);
        assert_eq!(WatermarkCoalescer::new(2).edge_count(), 2);
        assert_eq!(WatermarkCoalescer::new(16).edge_count(), 16);
    }

    #[test]
    fn test_fresh_coalescer_reports_floor() {
        for edge_count in [0, 1, 2, 5] {
            let mut wc = WatermarkCoalescer::new(edge_count);
            assert_eq!(wc.coalesced_wm(), UNSET_WATERMARK);
            assert_eq!(wc.top_observed_wm(), UNSET_WATERMARK);
            assert!(!wc.idle_message_pending());
        }
    }
}
