//! Record store abstraction.
//!
//! The tree core never owns records. It talks to whatever persists them
//! through two capability traits:
//!
//! - [`RecordStore`]: scoped range selects, counts, min/max aggregates,
//!   batch bound shifts, bound assignment and batch deletes.
//! - [`TransactionScope`]: `begin`/`commit`/`rollback` around a batch.
//!
//! Every call carries the scope predicate, which the store ANDs with the
//! filter it is given. Records outside the scope are invisible.
//!
//! # Affected-row counts
//!
//! `shift` and `delete` must return the number of rows the filter *matched*,
//! not the number whose stored value changed. The mutator compares these
//! counts against its plan and rolls back on mismatch.

mod filter;
mod locks;
pub mod memory;
mod transaction;

use std::fmt::Debug;
use std::hash::Hash;

pub use filter::{BoundField, Cmp, Condition, Filter, IdFilter, Order, Shift};
pub use locks::ScopeLocks;
pub use memory::MemoryStore;
pub use transaction::Transaction;

/// Errors reported by a record store or its transaction boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Backend-specific failure.
    Backend(String),
    /// Injected fault for simulation.
    InjectedFault(String),
    /// `begin` called while a transaction is already open.
    TransactionActive,
    /// `commit` or `rollback` called with no open transaction.
    NoActiveTransaction,
    /// A lock guarding store state was poisoned.
    LockPoisoned,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Backend(msg) => write!(f, "store backend error: {msg}"),
            Self::InjectedFault(msg) => write!(f, "injected fault: {msg}"),
            Self::TransactionActive => write!(f, "a transaction is already active"),
            Self::NoActiveTransaction => write!(f, "no active transaction"),
            Self::LockPoisoned => write!(f, "lock poisoned"),
        }
    }
}

impl std::error::Error for StoreError {}

/// A row as the store holds it, before any validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row<Id> {
    /// Record identity.
    pub id: Id,
    /// Stored left bound.
    pub left: i64,
    /// Stored right bound.
    pub right: i64,
}

/// The bound columns of a single record, which may be unset.
///
/// A record saved without bounds has both sides `None`. A record with only
/// one side set is corrupt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawBounds {
    /// Stored left bound, if any.
    pub left: Option<i64>,
    /// Stored right bound, if any.
    pub right: Option<i64>,
}

impl RawBounds {
    /// Both sides set.
    #[must_use]
    pub const fn assigned(left: i64, right: i64) -> Self {
        Self {
            left: Some(left),
            right: Some(right),
        }
    }

    /// Neither side set.
    #[must_use]
    pub const fn unassigned() -> Self {
        Self {
            left: None,
            right: None,
        }
    }

    /// Whether neither side is set.
    #[must_use]
    pub const fn is_unassigned(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Aggregate function over a bound column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    /// Smallest value.
    Min,
    /// Largest value.
    Max,
}

/// Scoped access to the records that carry tree bounds.
///
/// Rows whose bounds are unset never match a filter, mirroring SQL `NULL`
/// comparison semantics.
pub trait RecordStore {
    /// Stable, comparable record identity.
    type Id: Clone + Eq + Ord + Hash + Debug;
    /// Predicate selecting one independent bound space.
    type Scope: Debug;

    /// Read the bound columns of one record.
    ///
    /// Returns `None` if no record with this id exists in the scope.
    fn fetch_bounds(
        &self,
        scope: &Self::Scope,
        id: &Self::Id,
    ) -> Result<Option<RawBounds>, StoreError>;

    /// Select rows matching `filter`, sorted by `order`, at most `limit` rows.
    fn select(
        &self,
        scope: &Self::Scope,
        filter: &Filter<Self::Id>,
        order: Order,
        limit: Option<usize>,
    ) -> Result<Vec<Row<Self::Id>>, StoreError>;

    /// Count rows matching `filter`.
    fn count(&self, scope: &Self::Scope, filter: &Filter<Self::Id>) -> Result<usize, StoreError>;

    /// Min or max of a bound column over the scope. `None` for an empty scope.
    fn aggregate(
        &self,
        scope: &Self::Scope,
        field: BoundField,
        aggregate: Aggregate,
    ) -> Result<Option<i64>, StoreError>;

    /// Add `shift` to the bounds of every matching row.
    ///
    /// Returns the number of matched rows.
    fn shift(
        &mut self,
        scope: &Self::Scope,
        filter: &Filter<Self::Id>,
        shift: Shift,
    ) -> Result<usize, StoreError>;

    /// Set both bounds of one record, creating the record if needed.
    fn assign(
        &mut self,
        scope: &Self::Scope,
        id: &Self::Id,
        left: i64,
        right: i64,
    ) -> Result<(), StoreError>;

    /// Delete the given records. Returns the number deleted.
    fn delete(&mut self, scope: &Self::Scope, ids: &[Self::Id]) -> Result<usize, StoreError>;
}

/// An atomic batch boundary.
///
/// After `rollback`, every write issued since `begin` must be undone.
pub trait TransactionScope {
    /// Open a transaction.
    fn begin(&mut self) -> Result<(), StoreError>;
    /// Make every write since `begin` durable.
    fn commit(&mut self) -> Result<(), StoreError>;
    /// Discard every write since `begin`.
    fn rollback(&mut self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_bounds_states() {
        assert!(RawBounds::unassigned().is_unassigned());
        assert!(RawBounds::default().is_unassigned());
        assert!(!RawBounds::assigned(0, 1).is_unassigned());
        let half = RawBounds {
            left: Some(3),
            right: None,
        };
        assert!(!half.is_unassigned());
    }

    #[test]
    fn test_store_error_display() {
        assert_eq!(
            StoreError::InjectedFault("simulated write error".to_string()).to_string(),
            "injected fault: simulated write error"
        );
        assert_eq!(
            StoreError::NoActiveTransaction.to_string(),
            "no active transaction"
        );
    }
}
