//! Coalescing across two or more input edges.
//!
//! One slot is kept per edge with its last accepted watermark and its idle /
//! done status. After every mutation the combined watermark is recomputed as
//! the minimum over edges that are neither idle nor done, and forwarded only
//! when it advances past what was already emitted.
//!
//! When the last active edge goes idle the combined watermark is allowed to
//! jump to the highest value any edge has ever proven. Edges going idle in a
//! staggered fashion would otherwise pin the output at the lowest value an
//! edge happened to report before idling: with edge 0 at wm 1 and edge 1 at
//! wm 2, receiving edge 0's idle signal first forwards wm 2, but receiving
//! edge 1's first would leave the output at wm 1 forever.

use tracing::{debug, error};

use crate::coalescer::{IDLE_SIGNAL, UNSET_WATERMARK, Watermark};
use crate::error::{Error, Result};

/// State for one inbound edge.
#[derive(Debug, Clone, Copy)]
struct EdgeState {
    /// Most recently accepted real watermark; `UNSET_WATERMARK` until the
    /// edge first confirms progress. An idle signal does not change it.
    last_wm: Watermark,
    /// Set by an `IDLE_SIGNAL`, cleared by any event or real watermark.
    idle: bool,
    /// Terminal. A done edge is excluded from coalescing forever and rejects
    /// every further call.
    done: bool,
}

#[derive(Debug)]
pub(super) struct MultiInput {
    edges: Box<[EdgeState]>,
    last_emitted_wm: Watermark,
    top_observed_wm: Watermark,
    all_inputs_idle: bool,
    idle_message_pending: bool,
}

impl MultiInput {
    pub(super) fn new(edge_count: usize) -> Self {
        debug_assert!(edge_count >= 2, "multi-input requires at least 2 edges");
        let edges = vec![
            EdgeState {
                last_wm: UNSET_WATERMARK,
                idle: false,
                done: false,
            };
            edge_count
        ]
        .into_boxed_slice();
        MultiInput {
            edges,
            last_emitted_wm: UNSET_WATERMARK,
            top_observed_wm: UNSET_WATERMARK,
            all_inputs_idle: false,
            idle_message_pending: false,
        }
    }

    pub(super) fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub(super) fn observe_event(&mut self, edge_index: usize) -> Result<()> {
        let edge = self.edge_mut(edge_index)?;
        if edge.done {
            error!(edge_index, "event received on an exhausted edge");
            return Err(Error::DuplicateCompletion(format!(
                "edge {edge_index} is already done"
            )));
        }
        if edge.idle {
            edge.idle = false;
            self.all_inputs_idle = false;
        }
        Ok(())
    }

    pub(super) fn observe_wm(
        &mut self,
        edge_index: usize,
        wm: Watermark,
    ) -> Result<Option<Watermark>> {
        let edge = self.edge_mut(edge_index)?;
        if edge.done {
            error!(edge_index, "watermark received on an exhausted edge");
            return Err(Error::DuplicateCompletion(format!(
                "edge {edge_index} is already done"
            )));
        }
        if wm <= edge.last_wm {
            error!(
                edge_index,
                last_wm = edge.last_wm,
                new_wm = wm,
                "watermarks not monotonically increasing on edge"
            );
            return Err(Error::NonMonotonicWatermark(format!(
                "edge {edge_index}: last={}, new={}",
                edge.last_wm, wm
            )));
        }

        if wm == IDLE_SIGNAL {
            edge.idle = true;
        } else {
            edge.idle = false;
            edge.last_wm = wm;
            self.all_inputs_idle = false;
            if wm > self.top_observed_wm {
                self.top_observed_wm = wm;
            }
        }
        Ok(self.recompute())
    }

    pub(super) fn queue_done(&mut self, edge_index: usize) -> Result<Option<Watermark>> {
        let edge = self.edge_mut(edge_index)?;
        if edge.done {
            error!(edge_index, "queue_done called twice on edge");
            return Err(Error::DuplicateCompletion(format!(
                "edge {edge_index} is already done"
            )));
        }
        edge.done = true;
        Ok(self.recompute())
    }

    pub(super) fn idle_message_pending(&mut self) -> bool {
        std::mem::take(&mut self.idle_message_pending)
    }

    pub(super) fn coalesced_wm(&self) -> Watermark {
        self.last_emitted_wm
    }

    pub(super) fn top_observed_wm(&self) -> Watermark {
        self.top_observed_wm
    }

    /// Decides whether a new combined watermark can be forwarded. Runs after
    /// every mutating call.
    fn recompute(&mut self) -> Option<Watermark> {
        if self.all_inputs_idle {
            // Already surfaced; nothing changes until an edge becomes active.
            return None;
        }

        let mut min: Option<Watermark> = None;
        let mut not_done_count = 0usize;
        for edge in self.edges.iter() {
            if edge.done {
                continue;
            }
            not_done_count += 1;
            if edge.idle {
                continue;
            }
            if min.is_none_or(|m| edge.last_wm < m) {
                min = Some(edge.last_wm);
            }
        }

        let Some(min) = min else {
            // Every not-done edge is idle, or none remain. Progress withheld
            // only because of idleness can be released now: the highest
            // watermark any edge ever proved becomes the combined watermark.
            // The idle notification is suppressed when every edge is actually
            // finished rather than merely idle.
            self.all_inputs_idle = true;
            self.idle_message_pending = not_done_count != 0;
            debug!(
                top_observed_wm = self.top_observed_wm,
                not_done_count, "all input edges idle or done"
            );
            if self.top_observed_wm > self.last_emitted_wm {
                self.last_emitted_wm = self.top_observed_wm;
                return Some(self.last_emitted_wm);
            }
            return None;
        };

        if min > self.last_emitted_wm {
            self.last_emitted_wm = min;
            return Some(min);
        }
        None
    }

    fn edge_mut(&mut self, edge_index: usize) -> Result<&mut EdgeState> {
        let edge_count = self.edges.len();
        self.edges.get_mut(edge_index).ok_or_else(|| {
            Error::InvalidEdge(format!(
                "edge index {edge_index} out of range for {edge_count} edges"
            ))
        })
    }
}
