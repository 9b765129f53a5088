//! Immutable version records.

use std::sync::Arc;

use crate::error::Result;
use crate::interval::TimeInterval;
use crate::model::{AttributeSet, Timestamp};

/// One immutable attribute snapshot, valid over an explicit interval.
///
/// Versions link backwards in time through `older`, forming a
/// reverse-chronological chain. A version is never mutated after
/// construction; truncation produces a new record sharing the same
/// attribute payload with a narrowed interval.
#[derive(Clone, Debug)]
pub struct SpaceVersion {
    attributes: Arc<AttributeSet>,
    interval: TimeInterval,
    older: Option<Arc<SpaceVersion>>,
}

impl SpaceVersion {
    /// Builds an unlinked version from owned attributes.
    pub fn new(attributes: AttributeSet, interval: TimeInterval) -> Self {
        Self {
            attributes: Arc::new(attributes),
            interval,
            older: None,
        }
    }

    pub(crate) fn from_parts(
        attributes: Arc<AttributeSet>,
        interval: TimeInterval,
        older: Option<Arc<SpaceVersion>>,
    ) -> Self {
        Self {
            attributes,
            interval,
            older,
        }
    }

    /// Attribute payload of this version.
    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    pub(crate) fn shared_attributes(&self) -> Arc<AttributeSet> {
        Arc::clone(&self.attributes)
    }

    /// Validity interval of this version.
    pub fn interval(&self) -> TimeInterval {
        self.interval
    }

    /// Next-older version in the chain, if any.
    pub fn older(&self) -> Option<&Arc<SpaceVersion>> {
        self.older.as_ref()
    }

    /// Whether this version covers `instant`.
    pub fn covers(&self, instant: Timestamp) -> bool {
        self.interval.contains_instant(instant)
    }

    /// Left remainder `[start, cut)` with the same payload and the same
    /// `older` link; `None` when the remainder would be empty.
    pub fn keep_left(&self, cut: Timestamp) -> Result<Option<SpaceVersion>> {
        Ok(self.interval.keep_left(cut)?.map(|interval| Self {
            attributes: Arc::clone(&self.attributes),
            interval,
            older: self.older.clone(),
        }))
    }

    /// Right remainder `[cut, end)` with the same payload and no `older`
    /// link; the caller links it into the chain it is building. `None`
    /// when the remainder would be empty.
    pub fn keep_right(&self, cut: Timestamp) -> Result<Option<SpaceVersion>> {
        Ok(self.interval.keep_right(cut)?.map(|interval| Self {
            attributes: Arc::clone(&self.attributes),
            interval,
            older: None,
        }))
    }

    /// Duplicate with the same payload and interval but no `older` link.
    pub fn detached(&self) -> SpaceVersion {
        Self {
            attributes: Arc::clone(&self.attributes),
            interval: self.interval,
            older: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Classification;

    fn version(start: Timestamp, end: Timestamp) -> SpaceVersion {
        let classification = Arc::new(Classification::new("room"));
        SpaceVersion::new(
            AttributeSet::new("A", classification),
            TimeInterval::new(start, end).unwrap(),
        )
    }

    #[test]
    fn truncation_shares_the_payload() {
        let v = version(0, 100);
        let left = v.keep_left(40).unwrap().unwrap();
        assert!(Arc::ptr_eq(&v.attributes, &left.attributes));
        assert_eq!(left.interval(), TimeInterval::new(0, 40).unwrap());
    }

    #[test]
    fn keep_right_drops_the_older_link() {
        let older = Arc::new(version(0, 10));
        let v = SpaceVersion::from_parts(
            older.attributes.clone(),
            TimeInterval::new(10, 50).unwrap(),
            Some(older),
        );
        let right = v.keep_right(20).unwrap().unwrap();
        assert!(right.older().is_none());
        let left = v.keep_left(20).unwrap().unwrap();
        assert!(left.older().is_some());
    }

    #[test]
    fn empty_remainders_are_none() {
        let v = version(10, 20);
        assert!(v.keep_left(10).unwrap().is_none());
        assert!(v.keep_right(20).unwrap().is_none());
    }

    #[test]
    fn detached_copy_is_unlinked() {
        let older = Arc::new(version(0, 10));
        let v = SpaceVersion::from_parts(
            older.attributes.clone(),
            TimeInterval::new(10, 50).unwrap(),
            Some(older),
        );
        let copy = v.detached();
        assert!(copy.older().is_none());
        assert_eq!(copy.interval(), v.interval());
    }
}
