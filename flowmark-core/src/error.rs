use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Contract violations surfaced by the coalescer. All of them indicate a bug
/// in the upstream caller, not a transient condition: none are retried, and
/// the owning task is expected to fail the job on any of them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Non-monotonic watermark - {0}")]
    NonMonotonicWatermark(String),

    #[error("Duplicate completion - {0}")]
    DuplicateCompletion(String),

    #[error("Invalid edge - {0}")]
    InvalidEdge(String),
}
