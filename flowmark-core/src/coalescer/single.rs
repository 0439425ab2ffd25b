//! Pass-through variant for tasks with exactly one input edge: there is
//! nothing to coalesce against, so every accepted watermark is forwarded
//! directly.

use tracing::error;

use crate::coalescer::{IDLE_SIGNAL, UNSET_WATERMARK, Watermark};
use crate::error::{Error, Result};

#[derive(Debug)]
pub(super) struct SingleInput {
    /// The single edge's watermark; pinned at `i64::MAX` once the edge is
    /// done, so the accessors keep reporting it as unbounded.
    edge_wm: Watermark,
    done: bool,
    idle_message_pending: bool,
}

impl SingleInput {
    pub(super) fn new() -> Self {
        SingleInput {
            edge_wm: UNSET_WATERMARK,
            done: false,
            idle_message_pending: false,
        }
    }

    pub(super) fn observe_event(&mut self, edge_index: usize) -> Result<()> {
        self.check_edge(edge_index)?;
        // no idle exclusion to lift with a single edge
        Ok(())
    }

    pub(super) fn observe_wm(
        &mut self,
        edge_index: usize,
        wm: Watermark,
    ) -> Result<Option<Watermark>> {
        self.check_edge(edge_index)?;
        if self.done {
            error!("watermark received on the exhausted edge");
            return Err(Error::DuplicateCompletion(
                "edge 0 is already done".to_string(),
            ));
        }
        if wm <= self.edge_wm {
            error!(
                last_wm = self.edge_wm,
                new_wm = wm,
                "watermarks not monotonically increasing on edge"
            );
            return Err(Error::NonMonotonicWatermark(format!(
                "edge 0: last={}, new={}",
                self.edge_wm, wm
            )));
        }
        if wm == IDLE_SIGNAL {
            self.idle_message_pending = true;
            Ok(None)
        } else {
            self.edge_wm = wm;
            Ok(Some(wm))
        }
    }

    pub(super) fn queue_done(&mut self, edge_index: usize) -> Result<Option<Watermark>> {
        self.check_edge(edge_index)?;
        if self.done {
            error!("queue_done called twice on the single edge");
            return Err(Error::DuplicateCompletion(
                "edge 0 is already done".to_string(),
            ));
        }
        self.done = true;
        self.edge_wm = Watermark::MAX;
        // the only source finishing means no more watermarks, ever
        Ok(None)
    }

    pub(super) fn idle_message_pending(&mut self) -> bool {
        std::mem::take(&mut self.idle_message_pending)
    }

    pub(super) fn coalesced_wm(&self) -> Watermark {
        self.edge_wm
    }

    pub(super) fn top_observed_wm(&self) -> Watermark {
        self.edge_wm
    }

    fn check_edge(&self, edge_index: usize) -> Result<()> {
        if edge_index != 0 {
            return Err(Error::InvalidEdge(format!(
                "edge index {edge_index} out of range for 1 edge"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watermarks_forwarded_directly() {
        let mut wc = SingleInput::new();
        assert_eq!(wc.observe_wm(0, 100).unwrap(), Some(100));
        assert_eq!(wc.observe_wm(0, 101).unwrap(), Some(101));
        assert_eq!(wc.coalesced_wm(), 101);
        assert_eq!(wc.top_observed_wm(), 101);
    }

    #[test]
    fn test_idle_signal_pends_notification_once() {
        let mut wc = SingleInput::new();
        assert_eq!(wc.observe_wm(0, 100).unwrap(), Some(100));
        assert_eq!(wc.observe_wm(0, IDLE_SIGNAL).unwrap(), None);
        assert!(wc.idle_message_pending());
        assert!(!wc.idle_message_pending(), "read-and-clear");
        // the stored watermark is untouched by the idle signal
        assert_eq!(wc.coalesced_wm(), 100);
    }

    #[test]
    fn test_idle_signal_does_not_advance_progress() {
        let mut wc = SingleInput::new();
        wc.observe_wm(0, 100).unwrap();
        wc.observe_wm(0, IDLE_SIGNAL).unwrap();
        // a real watermark still has to beat the last accepted value
        let err = wc.observe_wm(0, 100).unwrap_err();
        assert!(matches!(err, Error::NonMonotonicWatermark(_)));
        assert_eq!(wc.observe_wm(0, 101).unwrap(), Some(101));
    }

    #[test]
    fn test_non_monotonic_watermark_is_fatal() {
        let mut wc = SingleInput::new();
        wc.observe_wm(0, 5).unwrap();
        assert!(matches!(
            wc.observe_wm(0, 5).unwrap_err(),
            Error::NonMonotonicWatermark(_)
        ));
        assert!(matches!(
            wc.observe_wm(0, 4).unwrap_err(),
            Error::NonMonotonicWatermark(_)
        ));
    }

    #[test]
    fn test_queue_done_is_terminal() {
        let mut wc = SingleInput::new();
        wc.observe_wm(0, 5).unwrap();
        assert_eq!(wc.queue_done(0).unwrap(), None);
        // the finished edge reports unbounded progress
        assert_eq!(wc.coalesced_wm(), Watermark::MAX);
        assert_eq!(wc.top_observed_wm(), Watermark::MAX);
        assert!(matches!(
            wc.queue_done(0).unwrap_err(),
            Error::DuplicateCompletion(_)
        ));
        assert!(matches!(
            wc.observe_wm(0, 6).unwrap_err(),
            Error::DuplicateCompletion(_)
        ));
    }

    #[test]
    fn test_edge_index_out_of_range() {
        let mut wc = SingleInput::new();
        assert!(matches!(
            wc.observe_wm(1, 5).unwrap_err(),
            Error::InvalidEdge(_)
        ));
        assert!(matches!(
            wc.observe_event(1).unwrap_err(),
            Error::InvalidEdge(_)
        ));
        assert!(matches!(
            wc.queue_done(1).unwrap_err(),
            Error::InvalidEdge(_)
        ));
    }

    #[test]
    fn test_observe_event_is_a_no_op() {
        let mut wc = SingleInput::new();
        wc.observe_event(0).unwrap();
        assert_eq!(wc.coalesced_wm(), UNSET_WATERMARK);
    }
}
