//! Crate-wide error type.

use thiserror::Error;

use crate::interval::TimeInterval;
use crate::model::Timestamp;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, SpaceError>;

/// Errors surfaced by the versioning core and its collaborators.
#[derive(Debug, Error)]
pub enum SpaceError {
    /// No version in the chain covers the requested instant (the instant
    /// predates the oldest version or falls inside a preserved gap).
    #[error("no version covers instant {0}")]
    NoVersionCovers(Timestamp),
    /// A metadata field could not be decoded against the classification
    /// schema.
    #[error("unsupported metadata for field `{field}`: {reason}")]
    UnsupportedMetadata {
        /// Field whose decoding failed.
        field: String,
        /// Why the stored value could not be produced as the declared type.
        reason: &'static str,
    },
    /// An interval was constructed with `start >= end`.
    #[error("invalid interval: start {start} must precede end {end}")]
    InvalidInterval {
        /// Requested inclusive start.
        start: Timestamp,
        /// Requested exclusive end.
        end: Timestamp,
    },
    /// A cut instant fell outside the interval being cut.
    #[error("cut instant {cut} outside {interval}")]
    CutOutOfRange {
        /// Requested cut instant.
        cut: Timestamp,
        /// Interval the cut was applied to.
        interval: TimeInterval,
    },
    /// A version chain violated the non-overlap invariant.
    #[error("corruption detected: {0}")]
    Corruption(String),
    /// A referenced object does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),
    /// Caller supplied an argument the operation rejects.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
