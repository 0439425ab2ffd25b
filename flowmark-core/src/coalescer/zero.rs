//! Variant for source tasks: no inbound edges, so there is never anything to
//! coalesce. Queries return benign defaults ("no progress", "never idle")
//! while mutating calls fail loudly, since there is no edge they could refer
//! to.

use crate::coalescer::{UNSET_WATERMARK, Watermark};
use crate::error::{Error, Result};

#[derive(Debug)]
pub(super) struct ZeroInput;

// receivers kept for the uniform call surface across variants
#[allow(clippy::unused_self)]
impl ZeroInput {
    pub(super) fn observe_event(&mut self, edge_index: usize) -> Result<()> {
        Err(Self::no_edges(edge_index))
    }

    pub(super) fn observe_wm(
        &mut self,
        edge_index: usize,
        _wm: Watermark,
    ) -> Result<Option<Watermark>> {
        Err(Self::no_edges(edge_index))
    }

    pub(super) fn queue_done(&mut self, edge_index: usize) -> Result<Option<Watermark>> {
        Err(Self::no_edges(edge_index))
    }

    pub(super) fn idle_message_pending(&mut self) -> bool {
        false
    }

    pub(super) fn coalesced_wm(&self) -> Watermark {
        UNSET_WATERMARK
    }

    pub(super) fn top_observed_wm(&self) -> Watermark {
        UNSET_WATERMARK
    }

    fn no_edges(edge_index: usize) -> Error {
        Error::DuplicateCompletion(format!(
            "edge {edge_index} does not exist, the task has no input edges"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queries_return_benign_defaults() {
        let mut wc = ZeroInput;
        assert_eq!(wc.coalesced_wm(), UNSET_WATERMARK);
        assert_eq!(wc.top_observed_wm(), UNSET_WATERMARK);
        assert!(!wc.idle_message_pending());
        assert!(!wc.idle_message_pending());
    }

    #[test]
    fn test_mutations_fail_loudly() {
        let mut wc = ZeroInput;
        assert!(wc.observe_event(0).is_err());
        assert!(wc.observe_wm(0, 1).is_err());
        assert!(wc.queue_done(0).is_err());
    }
}
