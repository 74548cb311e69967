//! Interval bounds for nodes and scopes.
//!
//! A node's position in a tree is encoded as a closed interval `[left, right]`
//! on the scope's number line. Ancestry is interval containment.

use std::fmt;

use serde::Serialize;

/// A validated `(left, right)` pair.
///
/// # Invariants
///
/// - `left < right`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Bounds {
    left: i64,
    right: i64,
}

impl Bounds {
    /// Create bounds from raw values.
    ///
    /// Returns `None` if `left >= right`.
    #[must_use]
    pub const fn new(left: i64, right: i64) -> Option<Self> {
        if left < right {
            Some(Self { left, right })
        } else {
            None
        }
    }

    /// Bounds of a freshly inserted leaf starting at `left`.
    #[must_use]
    pub const fn leaf(left: i64) -> Self {
        Self {
            left,
            right: left + 1,
        }
    }

    /// The left bound.
    #[must_use]
    pub const fn left(&self) -> i64 {
        self.left
    }

    /// The right bound.
    #[must_use]
    pub const fn right(&self) -> i64 {
        self.right
    }

    /// Number of bound slots occupied by the closed interval.
    ///
    /// Under the +2-per-node convention this is twice the closed subtree size.
    #[must_use]
    pub const fn span(&self) -> i64 {
        self.right - self.left + 1
    }

    /// Descendant count implied by the span.
    ///
    /// Only exact for subtrees without holes (nothing removed or relocated
    /// out of them since they were built).
    #[must_use]
    pub const fn implied_descendants(&self) -> i64 {
        (self.right - self.left - 1) / 2
    }

    /// Whether `other` lies strictly inside `self`.
    #[must_use]
    pub const fn contains(&self, other: &Self) -> bool {
        self.left < other.left && other.right < self.right
    }

    /// Whether `other` lies inside `self` or is equal to it.
    #[must_use]
    pub const fn encloses(&self, other: &Self) -> bool {
        self.left <= other.left && other.right <= self.right
    }

    /// Whether the two intervals share no point.
    #[must_use]
    pub const fn is_disjoint(&self, other: &Self) -> bool {
        self.right < other.left || other.right < self.left
    }

    /// Whether the intervals cross each other without nesting.
    ///
    /// A properly nested scope never contains an overlapping pair.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        !self.is_disjoint(other) && !self.encloses(other) && !other.encloses(self)
    }

    /// Both bounds moved by `delta`.
    #[must_use]
    pub const fn shifted(self, delta: i64) -> Self {
        Self {
            left: self.left + delta,
            right: self.right + delta,
        }
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.left, self.right)
    }
}

/// The occupied range of a scope: smallest left bound and largest right bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Extent {
    /// Smallest left bound in the scope.
    pub min_left: i64,
    /// Largest right bound in the scope.
    pub max_right: i64,
}

impl Extent {
    /// The left bound the next appended root receives.
    #[must_use]
    pub const fn next_free(&self) -> i64 {
        self.max_right + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b(left: i64, right: i64) -> Bounds {
        Bounds::new(left, right).expect("valid bounds")
    }

    #[test]
    fn test_new_rejects_degenerate() {
        assert!(Bounds::new(3, 3).is_none());
        assert!(Bounds::new(4, 3).is_none());
        assert_eq!(Bounds::new(0, 1), Some(Bounds::leaf(0)));
    }

    #[test]
    fn test_containment_is_strict() {
        let outer = b(0, 5);
        assert!(outer.contains(&b(1, 2)));
        assert!(!outer.contains(&outer));
        assert!(outer.encloses(&outer));
        assert!(!b(1, 2).contains(&outer));
    }

    #[test]
    fn test_overlap_detection() {
        assert!(b(0, 4).overlaps(&b(3, 6)));
        assert!(!b(0, 5).overlaps(&b(1, 2)));
        assert!(!b(0, 1).overlaps(&b(2, 3)));
    }

    #[test]
    fn test_span_and_descendants() {
        let root = b(0, 5);
        assert_eq!(root.span(), 6);
        assert_eq!(root.implied_descendants(), 2);
        assert_eq!(Bounds::leaf(7).implied_descendants(), 0);
    }

    #[test]
    fn test_shifted_and_display() {
        assert_eq!(b(1, 2).shifted(10), b(11, 12));
        assert_eq!(b(3, 4).shifted(-2).to_string(), "[1, 2]");
        let extent = Extent {
            min_left: 0,
            max_right: 9,
        };
        assert_eq!(extent.next_free(), 10);
    }
}
