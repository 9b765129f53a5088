//! Half-open time intervals.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpaceError};
use crate::model::Timestamp;

/// Half-open validity range `[start, end)`.
///
/// `end == None` means the interval extends unbounded into the future.
/// Instances are immutable; every operation returns a new interval.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TimeInterval {
    start: Timestamp,
    end: Option<Timestamp>,
}

impl TimeInterval {
    /// Builds a bounded interval `[start, end)`.
    ///
    /// Fails fast with [`SpaceError::InvalidInterval`] when `start >= end`.
    pub fn new(start: Timestamp, end: Timestamp) -> Result<Self> {
        if start >= end {
            return Err(SpaceError::InvalidInterval { start, end });
        }
        Ok(Self {
            start,
            end: Some(end),
        })
    }

    /// Builds an interval valid from `start` onwards, without an end.
    pub fn starting_at(start: Timestamp) -> Self {
        Self { start, end: None }
    }

    /// Inclusive start of the interval.
    pub fn start(&self) -> Timestamp {
        self.start
    }

    /// Exclusive end, `None` when unbounded.
    pub fn end(&self) -> Option<Timestamp> {
        self.end
    }

    /// Whether `instant` falls inside the interval.
    pub fn contains_instant(&self, instant: Timestamp) -> bool {
        instant >= self.start && self.end.is_none_or(|end| instant < end)
    }

    /// Whether `other` lies entirely inside this interval.
    pub fn contains(&self, other: &TimeInterval) -> bool {
        if other.start < self.start {
            return false;
        }
        match (self.end, other.end) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(end), Some(other_end)) => other_end <= end,
        }
    }

    /// Whether the interval starts at or after `instant`.
    ///
    /// Used to detect that an instant falls in the gap preceding this
    /// interval while walking a chain from newest to oldest.
    pub fn is_after(&self, instant: Timestamp) -> bool {
        self.start >= instant
    }

    /// Whether this interval is entirely newer than `other`, with no
    /// overlap. Abutting intervals count as after.
    pub fn is_entirely_after(&self, other: &TimeInterval) -> bool {
        match other.end {
            Some(end) => self.start >= end,
            None => false,
        }
    }

    /// Whether the interval extends past `instant`.
    pub fn ends_after(&self, instant: Timestamp) -> bool {
        self.end.is_none_or(|end| end > instant)
    }

    /// Left remainder `[start, cut)`.
    ///
    /// Returns `None` when the remainder would be empty (`cut == start`).
    /// A cut outside `start <= cut <= end` is a contract violation and
    /// fails with [`SpaceError::CutOutOfRange`].
    pub fn keep_left(&self, cut: Timestamp) -> Result<Option<TimeInterval>> {
        self.check_cut(cut)?;
        if cut == self.start {
            return Ok(None);
        }
        Ok(Some(Self {
            start: self.start,
            end: Some(cut),
        }))
    }

    /// Right remainder `[cut, end)`.
    ///
    /// Returns `None` when the remainder would be empty (`cut == end`).
    /// A cut outside `start <= cut <= end` is a contract violation and
    /// fails with [`SpaceError::CutOutOfRange`].
    pub fn keep_right(&self, cut: Timestamp) -> Result<Option<TimeInterval>> {
        self.check_cut(cut)?;
        if self.end == Some(cut) {
            return Ok(None);
        }
        Ok(Some(Self {
            start: cut,
            end: self.end,
        }))
    }

    fn check_cut(&self, cut: Timestamp) -> Result<()> {
        if cut < self.start || self.end.is_some_and(|end| cut > end) {
            return Err(SpaceError::CutOutOfRange {
                cut,
                interval: *self,
            });
        }
        Ok(())
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "[{}, {})", self.start, end),
            None => write!(f, "[{}, +inf)", self.start),
        }
    }
}
