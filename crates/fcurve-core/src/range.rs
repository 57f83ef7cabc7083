//! Inclusive index intervals over point arrays
//!
//! [`IndexRange`] is the `[min, max]` interval used to bound contact-point
//! searches and to mask out neighborhoods already claimed as candidate jump
//! events. Overlapping or touching ranges merge under
//! [`IndexRange::simplify`].

/// An inclusive `[min, max]` interval of point indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IndexRange {
    min: usize,
    max: usize,
}

impl IndexRange {
    /// Create a range; `min` and `max` are swapped when given out of order.
    pub fn new(min: usize, max: usize) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            Self { min: max, max: min }
        }
    }

    pub fn min(&self) -> usize {
        self.min
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// Number of indices covered (inclusive interval, never zero).
    pub fn len(&self) -> usize {
        self.max - self.min + 1
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.min && index <= self.max
    }

    /// Whether two ranges overlap or touch (share an endpoint or are adjacent).
    pub fn touches(&self, other: &IndexRange) -> bool {
        self.min <= other.max.saturating_add(1) && other.min <= self.max.saturating_add(1)
    }

    /// Smallest range covering both operands.
    pub fn merge(&self, other: &IndexRange) -> IndexRange {
        IndexRange {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Intersection, if any.
    pub fn intersect(&self, other: &IndexRange) -> Option<IndexRange> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        if min <= max {
            Some(IndexRange { min, max })
        } else {
            None
        }
    }

    /// Range clamped into `[0, bound)`; `None` when nothing survives.
    pub fn clamp_to_len(&self, bound: usize) -> Option<IndexRange> {
        if bound == 0 || self.min >= bound {
            return None;
        }
        Some(IndexRange {
            min: self.min,
            max: self.max.min(bound - 1),
        })
    }

    /// Merge overlapping and adjacent ranges into a minimal sorted list.
    pub fn simplify(mut ranges: Vec<IndexRange>) -> Vec<IndexRange> {
        if ranges.len() < 2 {
            return ranges;
        }
        ranges.sort_by_key(|r| r.min);
        let mut simplified: Vec<IndexRange> = Vec::with_capacity(ranges.len());
        for range in ranges {
            match simplified.last_mut() {
                Some(last) if last.touches(&range) => *last = last.merge(&range),
                _ => simplified.push(range),
            }
        }
        simplified
    }
}
