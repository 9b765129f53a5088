//! Insertion of a version into a reverse-chronological chain.
//!
//! The chain is a singly linked list of immutable [`SpaceVersion`] nodes,
//! newest first. Inserting a record with an arbitrary validity interval
//! rebuilds the affected region in a single descending walk: records
//! entirely newer or older than the new interval are copied unchanged,
//! records straddling one of its edges are truncated, and records fully
//! covered by it are dropped. No node of the old chain is ever mutated,
//! so heads archived before the insert keep describing exactly the
//! timeline that existed then.

use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, SpaceError};
use crate::interval::TimeInterval;
use crate::model::{AttributeSet, Timestamp};
use crate::version::SpaceVersion;

type Fragment = (Arc<AttributeSet>, TimeInterval);

/// Inserts `version` into the chain rooted at `head`, returning the new
/// head of a non-overlapping chain.
///
/// Where the new interval collides with existing records, the new record
/// wins: overlapped records are truncated to the part outside the new
/// interval, and records it fully covers disappear from the live chain
/// (they remain reachable from any previously archived head). Gaps in
/// the old chain are preserved verbatim; no coverage is invented.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use vigencia::{AttributeSet, Classification, SpaceVersion, TimeInterval};
/// use vigencia::chain;
///
/// # fn main() -> vigencia::Result<()> {
/// let class = Arc::new(Classification::new("room"));
/// let v1 = SpaceVersion::new(
///     AttributeSet::new("old", class.clone()),
///     TimeInterval::new(0, 30)?,
/// );
/// let head = chain::insert(None, v1)?;
/// let v2 = SpaceVersion::new(
///     AttributeSet::new("new", class),
///     TimeInterval::new(10, 20)?,
/// );
/// let head = chain::insert(Some(head), v2)?;
/// assert_eq!(chain::intervals(&head).len(), 3);
/// assert_eq!(chain::find_at(&head, 15)?.attributes().name, "new");
/// assert_eq!(chain::find_at(&head, 25)?.attributes().name, "old");
/// # Ok(())
/// # }
/// ```
pub fn insert(head: Option<Arc<SpaceVersion>>, version: SpaceVersion) -> Result<Arc<SpaceVersion>> {
    let target = version.interval();

    let Some(head) = head else {
        debug!(interval = %target, "chain.insert.first");
        return Ok(Arc::new(version.detached()));
    };

    // Entirely newer than the current head: the whole old chain survives
    // unchanged below the new record.
    if target.is_entirely_after(&head.interval()) {
        debug!(interval = %target, "chain.insert.newest");
        let new_head =
            SpaceVersion::from_parts(version.shared_attributes(), target, Some(head));
        return Ok(Arc::new(new_head));
    }

    let start = target.start();
    let end = target.end();

    // Fragments of the new chain, newest first; linked together once the
    // walk is done so old-chain and new-chain nodes never alias.
    let mut fragments: Vec<Fragment> = Vec::new();
    let mut found_end = false;
    let mut found_start = false;

    let mut cursor = Some(&head);
    while let Some(current) = cursor {
        let ci = current.interval();

        if !found_end {
            if end.is_some_and(|e| ci.is_after(e)) {
                // Entirely newer than the new record; unaffected.
                fragments.push((current.shared_attributes(), ci));
                cursor = current.older();
                continue;
            }
            // The right edge resolves at this record: keep whatever part
            // of it extends past the new interval, then splice the new
            // record in. When the edge lands on a boundary or in a gap
            // there is nothing to keep.
            if let Some(e) = end {
                if ci.ends_after(e) {
                    if let Some(right) = current.keep_right(e)? {
                        fragments.push((right.shared_attributes(), right.interval()));
                    }
                }
            }
            fragments.push((version.shared_attributes(), target));
            found_end = true;
        }

        if !found_start {
            if ci.is_after(start) {
                // Fully covered by the new record; dropped.
                cursor = current.older();
                continue;
            }
            if ci.ends_after(start) {
                if let Some(left) = current.keep_left(start)? {
                    fragments.push((left.shared_attributes(), left.interval()));
                }
            } else {
                // Gap between this record and the new one; kept verbatim.
                fragments.push((current.shared_attributes(), ci));
            }
            found_start = true;
            cursor = current.older();
            continue;
        }

        // Entirely older than the new record; unaffected.
        fragments.push((current.shared_attributes(), ci));
        cursor = current.older();
    }

    if !found_end {
        // Every existing record was newer: the new record becomes the
        // oldest version in the chain.
        fragments.push((version.shared_attributes(), target));
    }

    debug!(interval = %target, emitted = fragments.len(), "chain.insert.rebuild");

    let mut older: Option<Arc<SpaceVersion>> = None;
    for (attributes, interval) in fragments.into_iter().rev() {
        older = Some(Arc::new(SpaceVersion::from_parts(
            attributes, interval, older,
        )));
    }
    let new_head = older.ok_or_else(|| {
        SpaceError::Corruption("insert emitted no fragments".into())
    })?;
    debug_assert!(validate(&new_head).is_ok());
    Ok(new_head)
}

/// Walks the chain from `head` and returns the version covering `instant`.
///
/// Fails with [`SpaceError::NoVersionCovers`] when the instant predates
/// the oldest version or falls inside a gap.
pub fn find_at(head: &Arc<SpaceVersion>, instant: Timestamp) -> Result<Arc<SpaceVersion>> {
    let mut cursor = Some(head);
    while let Some(current) = cursor {
        if current.covers(instant) {
            return Ok(Arc::clone(current));
        }
        cursor = current.older();
    }
    Err(SpaceError::NoVersionCovers(instant))
}

/// Checks the chain invariant: walking from `head` via `older` yields
/// pairwise disjoint intervals in strictly descending order.
pub fn validate(head: &Arc<SpaceVersion>) -> Result<()> {
    let mut cursor = head;
    while let Some(older) = cursor.older() {
        let newer = cursor.interval();
        let older_iv = older.interval();
        let disjoint = older_iv
            .end()
            .is_some_and(|end| end <= newer.start());
        if !disjoint {
            return Err(SpaceError::Corruption(format!(
                "version {older_iv} overlaps or follows {newer}"
            )));
        }
        cursor = older;
    }
    Ok(())
}

/// Intervals of the chain, newest first. Mostly useful for diagnostics
/// and tests.
pub fn intervals(head: &Arc<SpaceVersion>) -> Vec<TimeInterval> {
    let mut out = Vec::new();
    let mut cursor = Some(head);
    while let Some(current) = cursor {
        out.push(current.interval());
        cursor = current.older();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Classification;

    fn attrs(name: &str) -> AttributeSet {
        AttributeSet::new(name, Arc::new(Classification::new("room")))
    }

    fn record(name: &str, start: Timestamp, end: Timestamp) -> SpaceVersion {
        SpaceVersion::new(attrs(name), TimeInterval::new(start, end).unwrap())
    }

    fn open_record(name: &str, start: Timestamp) -> SpaceVersion {
        SpaceVersion::new(attrs(name), TimeInterval::starting_at(start))
    }

    fn build(records: Vec<SpaceVersion>) -> Arc<SpaceVersion> {
        let mut head = None;
        for r in records {
            head = Some(insert(head, r).unwrap());
        }
        head.unwrap()
    }

    fn names(head: &Arc<SpaceVersion>) -> Vec<String> {
        let mut out = Vec::new();
        let mut cursor = Some(head);
        while let Some(current) = cursor {
            out.push(current.attributes().name.clone());
            cursor = current.older();
        }
        out
    }

    fn iv(start: Timestamp, end: Timestamp) -> TimeInterval {
        TimeInterval::new(start, end).unwrap()
    }

    #[test]
    fn first_insert_starts_the_chain() {
        let head = insert(None, record("a", 0, 10)).unwrap();
        assert_eq!(intervals(&head), vec![iv(0, 10)]);
        assert!(head.older().is_none());
    }

    #[test]
    fn abutting_newer_record_extends_the_head() {
        let head = build(vec![record("a", 50, 100), record("b", 100, 150)]);
        assert_eq!(intervals(&head), vec![iv(100, 150), iv(50, 100)]);
        assert_eq!(find_at(&head, 75).unwrap().attributes().name, "a");
        assert_eq!(find_at(&head, 100).unwrap().attributes().name, "b");
    }

    #[test]
    fn newer_record_with_gap_preserves_the_gap() {
        let head = build(vec![record("a", 0, 10), record("b", 20, 30)]);
        assert_eq!(intervals(&head), vec![iv(20, 30), iv(0, 10)]);
        assert!(matches!(
            find_at(&head, 15),
            Err(SpaceError::NoVersionCovers(15))
        ));
    }

    #[test]
    fn exact_replacement_swaps_the_payload() {
        let head = build(vec![record("a", 10, 20), record("b", 10, 20)]);
        assert_eq!(intervals(&head), vec![iv(10, 20)]);
        assert_eq!(names(&head), vec!["b"]);
    }

    #[test]
    fn contained_insert_splits_three_ways() {
        let head = build(vec![record("a", 0, 30), record("b", 10, 20)]);
        assert_eq!(intervals(&head), vec![iv(20, 30), iv(10, 20), iv(0, 10)]);
        assert_eq!(names(&head), vec!["a", "b", "a"]);
        // The oldest record terminates the chain.
        let oldest = head.older().unwrap().older().unwrap();
        assert!(oldest.older().is_none());
    }

    #[test]
    fn insert_aligned_with_the_left_edge() {
        let head = build(vec![record("a", 10, 30), record("b", 10, 20)]);
        assert_eq!(intervals(&head), vec![iv(20, 30), iv(10, 20)]);
        assert_eq!(names(&head), vec!["a", "b"]);
    }

    #[test]
    fn insert_aligned_with_the_right_edge() {
        // The new end lands exactly on the old end; the new record wins
        // and no zero-length fragment appears.
        let head = build(vec![record("a", 10, 20), record("b", 5, 20)]);
        assert_eq!(intervals(&head), vec![iv(5, 20)]);
        assert_eq!(names(&head), vec!["b"]);
    }

    #[test]
    fn gap_is_never_filled_by_a_split() {
        let head = build(vec![
            record("a", 0, 10),
            record("b", 20, 50),
            record("c", 30, 40),
        ]);
        assert_eq!(
            intervals(&head),
            vec![iv(40, 50), iv(30, 40), iv(20, 30), iv(0, 10)]
        );
        assert_eq!(names(&head), vec!["b", "c", "b", "a"]);
        assert!(find_at(&head, 15).is_err());
    }

    #[test]
    fn insert_entirely_inside_a_gap() {
        let head = build(vec![
            record("a", 0, 10),
            record("b", 20, 50),
            record("c", 12, 18),
        ]);
        assert_eq!(
            intervals(&head),
            vec![iv(20, 50), iv(12, 18), iv(0, 10)]
        );
        assert_eq!(names(&head), vec!["b", "c", "a"]);
    }

    #[test]
    fn spanning_insert_deletes_covered_records() {
        let head = build(vec![
            record("a", 0, 10),
            record("b", 20, 30),
            record("c", 40, 50),
            record("d", 5, 45),
        ]);
        assert_eq!(intervals(&head), vec![iv(45, 50), iv(5, 45), iv(0, 5)]);
        assert_eq!(names(&head), vec!["c", "d", "a"]);
    }

    #[test]
    fn insert_older_than_every_record() {
        let head = build(vec![record("a", 50, 100), record("b", 0, 10)]);
        assert_eq!(intervals(&head), vec![iv(50, 100), iv(0, 10)]);
        assert_eq!(names(&head), vec!["a", "b"]);
        assert_eq!(find_at(&head, 60).unwrap().attributes().name, "a");
    }

    #[test]
    fn overlap_straddling_the_head_start() {
        let head = build(vec![record("a", 50, 100), record("b", 90, 150)]);
        assert_eq!(intervals(&head), vec![iv(90, 150), iv(50, 90)]);
        assert_eq!(names(&head), vec!["b", "a"]);
    }

    #[test]
    fn unbounded_insert_truncates_everything_from_its_start() {
        let head = build(vec![
            record("a", 0, 10),
            record("b", 20, 30),
            open_record("c", 25),
        ]);
        assert_eq!(
            intervals(&head),
            vec![TimeInterval::starting_at(25), iv(20, 25), iv(0, 10)]
        );
        assert_eq!(names(&head), vec!["c", "b", "a"]);
    }

    #[test]
    fn bounded_insert_into_an_unbounded_head() {
        let head = build(vec![open_record("a", 50), record("b", 60, 70)]);
        assert_eq!(
            intervals(&head),
            vec![TimeInterval::starting_at(70), iv(60, 70), iv(50, 60)]
        );
        assert_eq!(names(&head), vec!["a", "b", "a"]);
    }

    #[test]
    fn unbounded_insert_replacing_an_unbounded_head() {
        let head = build(vec![open_record("a", 50), open_record("b", 100)]);
        assert_eq!(
            intervals(&head),
            vec![TimeInterval::starting_at(100), iv(50, 100)]
        );
        assert_eq!(names(&head), vec!["b", "a"]);
    }

    #[test]
    fn every_insert_keeps_the_chain_valid() {
        let head = build(vec![
            record("a", 0, 100),
            record("b", 10, 20),
            record("c", 15, 60),
            record("d", 0, 5),
            record("e", 99, 200),
            open_record("f", 150),
        ]);
        validate(&head).unwrap();
        for t in [0, 4, 5, 9, 14, 40, 60, 98, 99, 149, 150, 1000] {
            // Every instant in [0, +inf) stays covered after these inserts.
            find_at(&head, t).unwrap();
        }
        assert!(find_at(&head, -1).is_err());
    }

    #[test]
    fn validate_flags_overlapping_chains() {
        // Hand-assembled broken chain; insert can never produce this.
        let older = Arc::new(record("a", 0, 20));
        let head = Arc::new(SpaceVersion::from_parts(
            Arc::new(attrs("b")),
            iv(10, 30),
            Some(older),
        ));
        assert!(matches!(validate(&head), Err(SpaceError::Corruption(_))));
    }
}
