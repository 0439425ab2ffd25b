//! Watermark coalescing for multi-input stream-processing tasks.
//!
//! A task reading from several upstream edges receives watermarks on each of
//! them independently. [`WatermarkCoalescer`] combines those per-edge
//! watermarks into the single conservative watermark the task forwards
//! downstream: the minimum across all edges that are still active. Idle and
//! exhausted edges are excluded from the minimum so that a quiet input can
//! never stall event time for the whole pipeline.
//!
//! The coalescer is a pure, synchronous state machine. It is owned exclusively
//! by the task that drains the input edges and must not be shared; `&mut self`
//! on every mutating operation enforces this at compile time.

mod coalescer;
mod error;

pub use crate::coalescer::{IDLE_SIGNAL, UNSET_WATERMARK, Watermark, WatermarkCoalescer};
pub use crate::error::{Error, Result};
