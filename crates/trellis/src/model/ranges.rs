//! Index interval bookkeeping for selection.
//!
//! A [`RangeCollection`] stores closed index intervals in insertion order.
//! It deliberately does not normalize: overlapping intervals coexist, and
//! only an interval fully contained by an existing one is rejected as a
//! duplicate. Removal understands exact matches and carving a hole out of
//! a single containing interval; partial overlaps are left alone. The
//! collection tracks which spans were *asserted*, not a minimal cover.

use std::fmt;

/// A closed interval of item indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    start: usize,
    end: usize,
}

impl Interval {
    /// Build an interval covering both endpoints, in either order.
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    /// Number of indices covered. A closed interval covers at least one.
    pub fn count(&self) -> usize {
        self.end - self.start + 1
    }

    pub fn contains_index(&self, index: usize) -> bool {
        self.start <= index && index <= self.end
    }

    /// Whether `other` lies entirely within this interval.
    pub fn contains(&self, other: &Interval) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// An ordered collection of asserted index intervals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeCollection {
    intervals: Vec<Interval>,
}

impl RangeCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assert the interval `[start, end]` (endpoints in either order).
    ///
    /// Returns `false` if an existing interval already fully contains it.
    /// Overlapping but not containing intervals are stored alongside each
    /// other unchanged.
    pub fn add_range(&mut self, start: usize, end: usize) -> bool {
        let interval = Interval::new(start, end);
        if self.intervals.iter().any(|stored| stored.contains(&interval)) {
            return false;
        }
        self.intervals.push(interval);
        true
    }

    /// Retract the interval `[start, end]`.
    ///
    /// An exact match is removed outright. A target strictly inside one
    /// stored interval carves a hole: the interval is replaced, in place,
    /// by the sub-intervals left on either side. Anything else (partial
    /// overlap, no overlap) returns `false` without changes.
    pub fn remove_range(&mut self, start: usize, end: usize) -> bool {
        let target = Interval::new(start, end);
        if let Some(position) = self.intervals.iter().position(|stored| *stored == target) {
            self.intervals.remove(position);
            return true;
        }
        let Some(position) = self
            .intervals
            .iter()
            .position(|stored| stored.contains(&target))
        else {
            return false;
        };
        let stored = self.intervals[position];
        let mut remainders = Vec::with_capacity(2);
        if stored.start < target.start {
            remainders.push(Interval::new(stored.start, target.start - 1));
        }
        if target.end < stored.end {
            remainders.push(Interval::new(target.end + 1, stored.end));
        }
        self.intervals.splice(position..=position, remainders);
        true
    }

    /// Whether `[start, end]` lies entirely within a single stored interval.
    pub fn contains_range(&self, start: usize, end: usize) -> bool {
        let target = Interval::new(start, end);
        self.intervals.iter().any(|stored| stored.contains(&target))
    }

    pub fn contains_index(&self, index: usize) -> bool {
        self.intervals
            .iter()
            .any(|stored| stored.contains_index(index))
    }

    /// The most recently asserted interval.
    pub fn last(&self) -> Option<&Interval> {
        self.intervals.last()
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn clear(&mut self) {
        self.intervals.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Interval> {
        self.intervals.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spans(collection: &RangeCollection) -> Vec<(usize, usize)> {
        collection
            .iter()
            .map(|interval| (interval.start(), interval.end()))
            .collect()
    }

    #[test]
    fn add_normalizes_endpoint_order() {
        let mut ranges = RangeCollection::new();
        assert!(ranges.add_range(5, 2));
        assert_eq!(spans(&ranges), vec![(2, 5)]);
        assert_eq!(ranges.last().unwrap().count(), 4);
    }

    #[test]
    fn add_rejects_fully_contained_ranges() {
        let mut ranges = RangeCollection::new();
        assert!(ranges.add_range(0, 9));
        assert!(!ranges.add_range(3, 5));
        assert!(!ranges.add_range(0, 9));
        assert_eq!(ranges.len(), 1);
    }

    #[test]
    fn overlapping_ranges_are_stored_separately() {
        let mut ranges = RangeCollection::new();
        assert!(ranges.add_range(0, 5));
        assert!(ranges.add_range(3, 8));
        // A superset of an existing range is also a distinct assertion.
        assert!(ranges.add_range(0, 8));
        assert_eq!(spans(&ranges), vec![(0, 5), (3, 8), (0, 8)]);
    }

    #[test]
    fn remove_exact_range() {
        let mut ranges = RangeCollection::new();
        ranges.add_range(0, 4);
        ranges.add_range(6, 9);
        assert!(ranges.remove_range(6, 9));
        assert_eq!(spans(&ranges), vec![(0, 4)]);
    }

    #[test]
    fn remove_carves_a_hole() {
        let mut ranges = RangeCollection::new();
        ranges.add_range(0, 4);
        assert!(ranges.remove_range(1, 2));
        assert_eq!(spans(&ranges), vec![(0, 0), (3, 4)]);
    }

    #[test]
    fn remove_at_interval_edges_leaves_one_remainder() {
        let mut ranges = RangeCollection::new();
        ranges.add_range(0, 4);
        assert!(ranges.remove_range(0, 1));
        assert_eq!(spans(&ranges), vec![(2, 4)]);

        assert!(ranges.remove_range(4, 4));
        assert_eq!(spans(&ranges), vec![(2, 3)]);
    }

    #[test]
    fn remove_partial_overlap_is_a_no_op() {
        let mut ranges = RangeCollection::new();
        ranges.add_range(2, 5);
        assert!(!ranges.remove_range(4, 8));
        assert!(!ranges.remove_range(7, 9));
        assert_eq!(spans(&ranges), vec![(2, 5)]);
    }

    #[test]
    fn contains_checks_single_intervals_only() {
        let mut ranges = RangeCollection::new();
        ranges.add_range(0, 3);
        ranges.add_range(4, 7);
        assert!(ranges.contains_range(1, 3));
        assert!(ranges.contains_range(3, 1));
        // Covered by the union, but not by any single interval.
        assert!(!ranges.contains_range(2, 6));
        assert!(ranges.contains_index(5));
        assert!(!ranges.contains_index(8));
    }

    #[test]
    fn last_reports_most_recent_assertion() {
        let mut ranges = RangeCollection::new();
        assert!(ranges.last().is_none());
        ranges.add_range(0, 2);
        ranges.add_range(5, 9);
        assert_eq!(ranges.last(), Some(&Interval::new(5, 9)));
    }
}
