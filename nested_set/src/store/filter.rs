//! Filter and update descriptions passed to a [`RecordStore`](super::RecordStore).
//!
//! A [`Filter`] is a conjunction of bound comparisons plus an optional
//! identity restriction. Stores translate it into their own query language;
//! [`Filter::matches`] is the reference semantics.

use crate::types::Bounds;

/// One of the two bound columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundField {
    /// The left bound.
    Left,
    /// The right bound.
    Right,
}

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cmp {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `==`
    Eq,
}

impl Cmp {
    /// Apply the operator to `lhs` and `rhs`.
    #[must_use]
    pub const fn holds(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Self::Lt => lhs < rhs,
            Self::Le => lhs <= rhs,
            Self::Gt => lhs > rhs,
            Self::Ge => lhs >= rhs,
            Self::Eq => lhs == rhs,
        }
    }
}

/// `field cmp value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Condition {
    /// Column compared.
    pub field: BoundField,
    /// Operator.
    pub cmp: Cmp,
    /// Right-hand side.
    pub value: i64,
}

impl Condition {
    /// Whether a row with these bounds satisfies the condition.
    #[must_use]
    pub const fn matches(&self, left: i64, right: i64) -> bool {
        let lhs = match self.field {
            BoundField::Left => left,
            BoundField::Right => right,
        };
        self.cmp.holds(lhs, self.value)
    }
}

/// Identity restriction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum IdFilter<Id> {
    /// No restriction.
    #[default]
    Any,
    /// Only these ids.
    In(Vec<Id>),
    /// Every id except these.
    NotIn(Vec<Id>),
}

impl<Id: PartialEq> IdFilter<Id> {
    /// Whether `id` passes the restriction.
    #[must_use]
    pub fn allows(&self, id: &Id) -> bool {
        match self {
            Self::Any => true,
            Self::In(ids) => ids.contains(id),
            Self::NotIn(ids) => !ids.contains(id),
        }
    }
}

/// Conjunction of conditions and an identity restriction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter<Id> {
    conditions: Vec<Condition>,
    ids: IdFilter<Id>,
}

impl<Id> Default for Filter<Id> {
    fn default() -> Self {
        Self {
            conditions: Vec::new(),
            ids: IdFilter::Any,
        }
    }
}

impl<Id> Filter<Id> {
    /// Match every row in the scope.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Add `field cmp value`.
    #[must_use]
    pub fn and(mut self, field: BoundField, cmp: Cmp, value: i64) -> Self {
        self.conditions.push(Condition { field, cmp, value });
        self
    }

    /// `left > value`
    #[must_use]
    pub fn left_gt(self, value: i64) -> Self {
        self.and(BoundField::Left, Cmp::Gt, value)
    }

    /// `left >= value`
    #[must_use]
    pub fn left_ge(self, value: i64) -> Self {
        self.and(BoundField::Left, Cmp::Ge, value)
    }

    /// `left < value`
    #[must_use]
    pub fn left_lt(self, value: i64) -> Self {
        self.and(BoundField::Left, Cmp::Lt, value)
    }

    /// `right > value`
    #[must_use]
    pub fn right_gt(self, value: i64) -> Self {
        self.and(BoundField::Right, Cmp::Gt, value)
    }

    /// `right >= value`
    #[must_use]
    pub fn right_ge(self, value: i64) -> Self {
        self.and(BoundField::Right, Cmp::Ge, value)
    }

    /// `right < value`
    #[must_use]
    pub fn right_lt(self, value: i64) -> Self {
        self.and(BoundField::Right, Cmp::Lt, value)
    }

    /// `right <= value`
    #[must_use]
    pub fn right_le(self, value: i64) -> Self {
        self.and(BoundField::Right, Cmp::Le, value)
    }

    /// Restrict to exactly these ids.
    #[must_use]
    pub fn only(mut self, ids: Vec<Id>) -> Self {
        self.ids = IdFilter::In(ids);
        self
    }

    /// Exclude these ids.
    #[must_use]
    pub fn excluding(mut self, ids: Vec<Id>) -> Self {
        self.ids = IdFilter::NotIn(ids);
        self
    }

    /// The node and everything inside it: `left >= L and right <= R`.
    #[must_use]
    pub fn closed_subtree(bounds: &Bounds) -> Self {
        Self::all().left_ge(bounds.left()).right_le(bounds.right())
    }

    /// Everything strictly inside the node: `left > L and right < R`.
    #[must_use]
    pub fn descendants_of(bounds: &Bounds) -> Self {
        Self::all().left_gt(bounds.left()).right_lt(bounds.right())
    }

    /// Everything strictly containing the node: `left < L and right > R`.
    #[must_use]
    pub fn ancestors_of(bounds: &Bounds) -> Self {
        Self::all().left_lt(bounds.left()).right_gt(bounds.right())
    }

    /// The bound conditions.
    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// The identity restriction.
    #[must_use]
    pub const fn ids(&self) -> &IdFilter<Id> {
        &self.ids
    }
}

impl<Id: PartialEq> Filter<Id> {
    /// Reference semantics: whether a row passes every condition.
    #[must_use]
    pub fn matches(&self, id: &Id, left: i64, right: i64) -> bool {
        self.ids.allows(id) && self.conditions.iter().all(|c| c.matches(left, right))
    }
}

/// Sort order of a select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// Ascending left bound.
    #[default]
    LeftAsc,
    /// Descending left bound.
    LeftDesc,
}

/// Deltas added to each bound column by a batch update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shift {
    /// Added to the left bound.
    pub left: i64,
    /// Added to the right bound.
    pub right: i64,
}

impl Shift {
    /// Shift only the left bound.
    #[must_use]
    pub const fn left(delta: i64) -> Self {
        Self {
            left: delta,
            right: 0,
        }
    }

    /// Shift only the right bound.
    #[must_use]
    pub const fn right(delta: i64) -> Self {
        Self {
            left: 0,
            right: delta,
        }
    }

    /// Shift both bounds by the same amount.
    #[must_use]
    pub const fn both(delta: i64) -> Self {
        Self {
            left: delta,
            right: delta,
        }
    }

    /// Whether applying this shift changes nothing.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        self.left == 0 && self.right == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_conjunction() {
        let filter: Filter<u64> = Filter::all().left_gt(3).right_ge(3);
        assert!(filter.matches(&1, 4, 5));
        assert!(!filter.matches(&1, 3, 5));
        assert!(!filter.matches(&1, 4, 2));
    }

    #[test]
    fn test_subtree_filters() {
        let bounds = Bounds::new(2, 7).expect("valid bounds");
        let closed: Filter<u64> = Filter::closed_subtree(&bounds);
        let open: Filter<u64> = Filter::descendants_of(&bounds);
        let up: Filter<u64> = Filter::ancestors_of(&bounds);

        assert!(closed.matches(&1, 2, 7));
        assert!(!open.matches(&1, 2, 7));
        assert!(open.matches(&1, 3, 4));
        assert!(up.matches(&1, 0, 9));
        assert!(!up.matches(&1, 2, 9));
    }

    #[test]
    fn test_id_restrictions() {
        let only: Filter<u64> = Filter::all().only(vec![1, 2]);
        let except: Filter<u64> = Filter::all().left_ge(0).excluding(vec![1]);
        assert!(only.matches(&2, 0, 1));
        assert!(!only.matches(&3, 0, 1));
        assert!(!except.matches(&1, 0, 1));
        assert!(except.matches(&3, 0, 1));
    }

    #[test]
    fn test_shift_constructors() {
        assert_eq!(Shift::left(2), Shift { left: 2, right: 0 });
        assert_eq!(Shift::right(-1), Shift { left: 0, right: -1 });
        assert!(Shift::both(0).is_noop());
        assert!(!Shift::both(4).is_noop());
    }
}
