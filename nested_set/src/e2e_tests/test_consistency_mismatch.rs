//! Test that a store misreporting affected rows aborts the mutation.

use crate::error::TreeError;
use crate::store::memory::{CountMode, RecordId};
use crate::store::{
    Aggregate, BoundField, Filter, MemoryStore, Order, RawBounds, RecordStore, Row, Shift,
    StoreError, TransactionScope,
};
use crate::testing::new_test_store;
use crate::tree::TreeScope;

/// Delegates to a [`MemoryStore`] but over-reports every shift by one row,
/// as a store racing a concurrent writer might.
struct MiscountingStore {
    inner: MemoryStore,
}

impl RecordStore for MiscountingStore {
    type Id = RecordId;
    type Scope = String;

    fn fetch_bounds(
        &self,
        scope: &String,
        id: &RecordId,
    ) -> Result<Option<RawBounds>, StoreError> {
        self.inner.fetch_bounds(scope, id)
    }

    fn select(
        &self,
        scope: &String,
        filter: &Filter<RecordId>,
        order: Order,
        limit: Option<usize>,
    ) -> Result<Vec<Row<RecordId>>, StoreError> {
        self.inner.select(scope, filter, order, limit)
    }

    fn count(&self, scope: &String, filter: &Filter<RecordId>) -> Result<usize, StoreError> {
        self.inner.count(scope, filter)
    }

    fn aggregate(
        &self,
        scope: &String,
        field: BoundField,
        aggregate: Aggregate,
    ) -> Result<Option<i64>, StoreError> {
        self.inner.aggregate(scope, field, aggregate)
    }

    fn shift(
        &mut self,
        scope: &String,
        filter: &Filter<RecordId>,
        shift: Shift,
    ) -> Result<usize, StoreError> {
        Ok(self.inner.shift(scope, filter, shift)? + 1)
    }

    fn assign(
        &mut self,
        scope: &String,
        id: &RecordId,
        left: i64,
        right: i64,
    ) -> Result<(), StoreError> {
        self.inner.assign(scope, id, left, right)
    }

    fn delete(&mut self, scope: &String, ids: &[RecordId]) -> Result<usize, StoreError> {
        self.inner.delete(scope, ids)
    }
}

impl TransactionScope for MiscountingStore {
    fn begin(&mut self) -> Result<(), StoreError> {
        self.inner.begin()
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        self.inner.commit()
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        self.inner.rollback()
    }
}

fn fixture() -> (MiscountingStore, TreeScope<String>) {
    let mut inner = new_test_store();
    inner.insert_raw("s", 1, RawBounds::assigned(0, 5));
    inner.insert_raw("s", 2, RawBounds::assigned(1, 2));
    inner.insert_raw("s", 3, RawBounds::assigned(3, 4));
    inner.insert_raw("s", 4, RawBounds::assigned(6, 7));
    inner.insert_unassigned("s", 5);
    (MiscountingStore { inner }, TreeScope::new("s".to_string()))
}

#[test]
fn test_add_child_mismatch_rolls_back() {
    let (mut store, scope) = fixture();
    let before = store.inner.snapshot("s");

    let result = scope.mutator(&mut store).add_child(&2, &5);
    // Two lefts lie past 2's right bound (3 and 4); the store claims three.
    assert_eq!(
        result,
        Err(TreeError::ConsistencyMismatch {
            step: "add_child left shift",
            expected: 2,
            actual: 3,
        })
    );
    assert!(result.is_err_and(|e| e.is_retryable()));
    assert_eq!(store.inner.snapshot("s"), before);
    assert_eq!(store.inner.stats().rollbacks, 1);
}

#[test]
fn test_move_node_mismatch_rolls_back() {
    let (mut store, scope) = fixture();
    let before = store.inner.snapshot("s");

    let result = scope.mutator(&mut store).move_node(&2, &4);
    assert!(matches!(
        result,
        Err(TreeError::ConsistencyMismatch { .. })
    ));
    assert_eq!(store.inner.snapshot("s"), before);
}

#[test]
fn test_removals_are_unaffected() {
    let (mut store, scope) = fixture();
    assert_eq!(scope.mutator(&mut store).remove(&2).expect("remove"), 1);
    assert_eq!(store.inner.snapshot("s").len(), 4);
}

#[test]
fn test_changed_row_counting_store_passes_checks() {
    let mut store = new_test_store().with_count_mode(CountMode::Changed);
    let scope = TreeScope::new("s".to_string());
    for id in 1..=6 {
        store.insert_unassigned("s", id);
    }

    let mut mutator = scope.mutator(&mut store);
    mutator.set_as_root(&1).expect("set_as_root");
    mutator.add_child(&1, &2).expect("add_child");
    mutator.add_child(&1, &3).expect("add_child");
    mutator.add_child(&2, &4).expect("add_child");
    mutator.set_as_root(&5).expect("set_as_root");
    mutator.add_child(&5, &6).expect("add_child");
    mutator.move_node(&2, &5).expect("move_node");
    mutator.move_up(&2).expect("move_up");
    mutator.set_as_root(&2).expect("set_as_root");

    let query = scope.query(&store);
    assert!(query.is_root(&2).expect("is_root"));
    assert!(query.is_direct_parent_of(&2, &4).expect("is_direct_parent_of"));
    assert!(query.is_direct_parent_of(&5, &6).expect("is_direct_parent_of"));
}
