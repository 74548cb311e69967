//! In-memory record store for tests and simulation.
//!
//! Records live in a `BTreeMap` keyed by id, each tagged with the scope it
//! belongs to. Transactions snapshot the whole map on `begin` and restore it
//! on `rollback`, which gives all-or-nothing batches without a log.
//!
//! Faults can be injected into writes, either probabilistically through a
//! seeded RNG or deterministically on the Nth write, so tests can check that
//! a failure half-way through a multi-write mutation leaves nothing behind.

// Simulation code legitimately needs cloning for snapshots
#![allow(clippy::disallowed_methods)]

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{
    Aggregate, BoundField, Filter, Order, RawBounds, RecordStore, Row, Shift, StoreError,
    TransactionScope,
};

/// Identity used by the in-memory store.
pub type RecordId = u64;

/// How `shift` reports affected rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountMode {
    /// Every matched row counts.
    #[default]
    Matched,
    /// Only rows whose stored value changed count, like some SQL engines
    /// report for `UPDATE`.
    Changed,
}

/// Configuration for fault injection.
#[derive(Debug, Clone, Default)]
pub struct FaultConfig {
    /// Probability that any single write fails (0.0 - 1.0).
    pub write_error_rate: f64,
    /// Fail the write with this 1-based sequence number, counted from the
    /// last call to [`MemoryStore::set_fault_config`].
    pub fail_on_write: Option<u64>,
}

impl FaultConfig {
    /// Create a fault config with no faults.
    #[must_use]
    pub fn no_faults() -> Self {
        Self::default()
    }

    /// Fail writes with the given probability.
    #[must_use]
    pub const fn with_write_error_rate(mut self, rate: f64) -> Self {
        self.write_error_rate = rate;
        self
    }

    /// Fail exactly the `n`th write.
    #[must_use]
    pub const fn failing_write(mut self, n: u64) -> Self {
        self.fail_on_write = Some(n);
        self
    }
}

/// Statistics about store operations.
#[derive(Debug, Default, Clone)]
pub struct MemoryStoreStats {
    /// Number of write calls (`shift`, `assign`, `delete`).
    pub writes: u64,
    /// Number of injected write errors.
    pub injected_write_errors: u64,
    /// Number of committed transactions.
    pub commits: u64,
    /// Number of rolled back transactions.
    pub rollbacks: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Record {
    scope: String,
    left: Option<i64>,
    right: Option<i64>,
}

impl Record {
    const fn assigned(&self) -> Option<(i64, i64)> {
        match (self.left, self.right) {
            (Some(left), Some(right)) => Some((left, right)),
            _ => None,
        }
    }
}

/// In-memory implementation of [`RecordStore`] and [`TransactionScope`].
///
/// Scopes are plain strings. Not thread-safe; wrap it in a lock to share.
#[derive(Debug)]
pub struct MemoryStore {
    records: BTreeMap<RecordId, Record>,
    /// Copy of `records` taken at `begin`.
    snapshot: Option<BTreeMap<RecordId, Record>>,
    count_mode: CountMode,
    fault_config: FaultConfig,
    writes_since_config: u64,
    rng: StdRng,
    stats: MemoryStoreStats,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(0)
    }
}

impl MemoryStore {
    /// Create an empty store. The seed drives fault injection.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, FaultConfig::default())
    }

    /// Create an empty store with fault injection.
    #[must_use]
    pub fn with_config(seed: u64, fault_config: FaultConfig) -> Self {
        Self {
            records: BTreeMap::new(),
            snapshot: None,
            count_mode: CountMode::default(),
            fault_config,
            writes_since_config: 0,
            rng: StdRng::seed_from_u64(seed),
            stats: MemoryStoreStats::default(),
        }
    }

    /// Set how affected rows are counted.
    #[must_use]
    pub const fn with_count_mode(mut self, mode: CountMode) -> Self {
        self.count_mode = mode;
        self
    }

    /// Replace the fault configuration and restart the write counter.
    pub fn set_fault_config(&mut self, config: FaultConfig) {
        self.fault_config = config;
        self.writes_since_config = 0;
    }

    /// Get the current statistics.
    #[must_use]
    pub const fn stats(&self) -> &MemoryStoreStats {
        &self.stats
    }

    /// Whether a transaction is open.
    #[must_use]
    pub const fn in_transaction(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Save a record with no bounds, as an application would before placing
    /// it in a tree.
    pub fn insert_unassigned(&mut self, scope: &str, id: RecordId) {
        self.insert_raw(scope, id, RawBounds::unassigned());
    }

    /// Save a record with arbitrary bound columns, bypassing all checks.
    pub fn insert_raw(&mut self, scope: &str, id: RecordId, bounds: RawBounds) {
        self.records.insert(
            id,
            Record {
                scope: scope.to_string(),
                left: bounds.left,
                right: bounds.right,
            },
        );
    }

    /// Bound columns of every record in a scope, keyed by id.
    #[must_use]
    pub fn snapshot(&self, scope: &str) -> BTreeMap<RecordId, RawBounds> {
        self.records
            .iter()
            .filter(|(_, record)| record.scope == scope)
            .map(|(id, record)| {
                (
                    *id,
                    RawBounds {
                        left: record.left,
                        right: record.right,
                    },
                )
            })
            .collect()
    }

    /// Number of records across all scopes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Count a write and decide whether to fail it.
    fn check_write_fault(&mut self, operation: &str) -> Result<(), StoreError> {
        self.stats.writes += 1;
        self.writes_since_config += 1;

        let scheduled = self.fault_config.fail_on_write == Some(self.writes_since_config);
        let random = self.fault_config.write_error_rate > 0.0
            && self.rng.random::<f64>() < self.fault_config.write_error_rate;

        if scheduled || random {
            self.stats.injected_write_errors += 1;
            return Err(StoreError::InjectedFault(format!(
                "simulated {operation} error"
            )));
        }
        Ok(())
    }

    fn matching<'a>(
        &'a self,
        scope: &'a str,
        filter: &'a Filter<RecordId>,
    ) -> impl Iterator<Item = (RecordId, i64, i64)> + 'a {
        self.records.iter().filter_map(move |(id, record)| {
            if record.scope != scope {
                return None;
            }
            let (left, right) = record.assigned()?;
            filter
                .matches(id, left, right)
                .then_some((*id, left, right))
        })
    }
}

impl RecordStore for MemoryStore {
    type Id = RecordId;
    type Scope = String;

    fn fetch_bounds(
        &self,
        scope: &String,
        id: &RecordId,
    ) -> Result<Option<RawBounds>, StoreError> {
        Ok(self
            .records
            .get(id)
            .filter(|record| &record.scope == scope)
            .map(|record| RawBounds {
                left: record.left,
                right: record.right,
            }))
    }

    fn select(
        &self,
        scope: &String,
        filter: &Filter<RecordId>,
        order: Order,
        limit: Option<usize>,
    ) -> Result<Vec<Row<RecordId>>, StoreError> {
        let mut rows: Vec<Row<RecordId>> = self
            .matching(scope, filter)
            .map(|(id, left, right)| Row { id, left, right })
            .collect();

        match order {
            Order::LeftAsc => rows.sort_by_key(|row| (row.left, row.id)),
            Order::LeftDesc => rows.sort_by(|a, b| (b.left, b.id).cmp(&(a.left, a.id))),
        }
        if let Some(limit) = limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    fn count(&self, scope: &String, filter: &Filter<RecordId>) -> Result<usize, StoreError> {
        Ok(self.matching(scope, filter).count())
    }

    fn aggregate(
        &self,
        scope: &String,
        field: BoundField,
        aggregate: Aggregate,
    ) -> Result<Option<i64>, StoreError> {
        let values = self
            .records
            .values()
            .filter(|record| &record.scope == scope)
            .filter_map(Record::assigned)
            .map(|(left, right)| match field {
                BoundField::Left => left,
                BoundField::Right => right,
            });
        Ok(match aggregate {
            Aggregate::Min => values.min(),
            Aggregate::Max => values.max(),
        })
    }

    fn shift(
        &mut self,
        scope: &String,
        filter: &Filter<RecordId>,
        shift: Shift,
    ) -> Result<usize, StoreError> {
        self.check_write_fault("shift")?;

        let targets: Vec<RecordId> = self.matching(scope, filter).map(|(id, _, _)| id).collect();
        let mut affected = 0;
        for id in targets {
            if let Some(record) = self.records.get_mut(&id) {
                record.left = record.left.map(|left| left + shift.left);
                record.right = record.right.map(|right| right + shift.right);
                if self.count_mode == CountMode::Matched || !shift.is_noop() {
                    affected += 1;
                }
            }
        }
        Ok(affected)
    }

    fn assign(
        &mut self,
        scope: &String,
        id: &RecordId,
        left: i64,
        right: i64,
    ) -> Result<(), StoreError> {
        self.check_write_fault("assign")?;

        let record = self.records.entry(*id).or_insert_with(|| Record {
            scope: scope.clone(),
            left: None,
            right: None,
        });
        if &record.scope != scope {
            return Err(StoreError::Backend(format!(
                "record {id} belongs to scope {:?}",
                record.scope
            )));
        }
        record.left = Some(left);
        record.right = Some(right);
        Ok(())
    }

    fn delete(&mut self, scope: &String, ids: &[RecordId]) -> Result<usize, StoreError> {
        self.check_write_fault("delete")?;

        let mut deleted = 0;
        for id in ids {
            if self
                .records
                .get(id)
                .is_some_and(|record| &record.scope == scope)
            {
                self.records.remove(id);
                deleted += 1;
            }
        }
        Ok(deleted)
    }
}

impl TransactionScope for MemoryStore {
    fn begin(&mut self) -> Result<(), StoreError> {
        if self.snapshot.is_some() {
            return Err(StoreError::TransactionActive);
        }
        self.snapshot = Some(self.records.clone());
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        if self.snapshot.take().is_none() {
            return Err(StoreError::NoActiveTransaction);
        }
        self.stats.commits += 1;
        Ok(())
    }

    fn rollback(&mut self) -> Result<(), StoreError> {
        let snapshot = self.snapshot.take().ok_or(StoreError::NoActiveTransaction)?;
        self.records = snapshot;
        self.stats.rollbacks += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope() -> String {
        "s".to_string()
    }

    fn seeded() -> MemoryStore {
        let mut store = MemoryStore::new(1);
        store.insert_raw("s", 1, RawBounds::assigned(0, 5));
        store.insert_raw("s", 2, RawBounds::assigned(1, 2));
        store.insert_raw("s", 3, RawBounds::assigned(3, 4));
        store.insert_raw("other", 4, RawBounds::assigned(0, 1));
        store.insert_unassigned("s", 5);
        store
    }

    #[test]
    fn test_select_is_scoped_and_ordered() {
        let store = seeded();
        let rows = store
            .select(&scope(), &Filter::all(), Order::LeftAsc, None)
            .expect("select");
        let ids: Vec<RecordId> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let rows = store
            .select(&scope(), &Filter::all(), Order::LeftDesc, Some(1))
            .expect("select");
        assert_eq!(rows[0].id, 3);
    }

    #[test]
    fn test_aggregates_ignore_other_scopes() {
        let store = seeded();
        let min = store
            .aggregate(&scope(), BoundField::Left, Aggregate::Min)
            .expect("min");
        let max = store
            .aggregate(&scope(), BoundField::Right, Aggregate::Max)
            .expect("max");
        assert_eq!((min, max), (Some(0), Some(5)));

        let empty = store
            .aggregate(&"nothing".to_string(), BoundField::Right, Aggregate::Max)
            .expect("max");
        assert_eq!(empty, None);
    }

    #[test]
    fn test_aggregate_skips_half_set_rows() {
        let mut store = seeded();
        store.insert_raw(
            "s",
            7,
            RawBounds {
                left: Some(-5),
                right: None,
            },
        );
        store.insert_raw(
            "s",
            8,
            RawBounds {
                left: None,
                right: Some(99),
            },
        );

        let min = store
            .aggregate(&scope(), BoundField::Left, Aggregate::Min)
            .expect("min");
        let max = store
            .aggregate(&scope(), BoundField::Right, Aggregate::Max)
            .expect("max");
        assert_eq!((min, max), (Some(0), Some(5)));
    }

    #[test]
    fn test_fetch_bounds() {
        let store = seeded();
        assert_eq!(
            store.fetch_bounds(&scope(), &2).expect("fetch"),
            Some(RawBounds::assigned(1, 2))
        );
        assert_eq!(
            store.fetch_bounds(&scope(), &5).expect("fetch"),
            Some(RawBounds::unassigned())
        );
        assert_eq!(store.fetch_bounds(&scope(), &4).expect("fetch"), None);
    }

    #[test]
    fn test_rollback_restores_records() {
        let mut store = seeded();
        let before = store.snapshot("s");

        store.begin().expect("begin");
        store
            .shift(&scope(), &Filter::all(), Shift::both(10))
            .expect("shift");
        store.delete(&scope(), &[2]).expect("delete");
        store.rollback().expect("rollback");

        assert_eq!(store.snapshot("s"), before);
        assert_eq!(store.stats().rollbacks, 1);
        assert!(!store.in_transaction());
    }

    #[test]
    fn test_commit_keeps_writes() {
        let mut store = seeded();
        store.begin().expect("begin");
        let moved = store
            .shift(&scope(), &Filter::all().left_gt(0), Shift::left(2))
            .expect("shift");
        store.commit().expect("commit");

        assert_eq!(moved, 2);
        assert_eq!(
            store.fetch_bounds(&scope(), &3).expect("fetch"),
            Some(RawBounds::assigned(5, 4))
        );
    }

    #[test]
    fn test_transaction_state_errors() {
        let mut store = MemoryStore::new(0);
        assert_eq!(store.commit(), Err(StoreError::NoActiveTransaction));
        store.begin().expect("begin");
        assert_eq!(store.begin(), Err(StoreError::TransactionActive));
    }

    #[test]
    fn test_scheduled_fault() {
        let mut store = MemoryStore::with_config(0, FaultConfig::no_faults().failing_write(2));
        store.assign(&scope(), &1, 0, 1).expect("first write");
        let second = store.assign(&scope(), &2, 2, 3);
        assert!(matches!(second, Err(StoreError::InjectedFault(_))));
        store.assign(&scope(), &3, 4, 5).expect("third write");
        assert_eq!(store.stats().injected_write_errors, 1);
    }

    #[test]
    fn test_changed_count_mode_skips_noop_shift() {
        let mut store = seeded().with_count_mode(CountMode::Changed);
        let noop = store
            .shift(&scope(), &Filter::all(), Shift::both(0))
            .expect("shift");
        let real = store
            .shift(&scope(), &Filter::all(), Shift::both(1))
            .expect("shift");
        assert_eq!((noop, real), (0, 3));
    }

    #[test]
    fn test_delete_is_scoped() {
        let mut store = seeded();
        let deleted = store.delete(&scope(), &[2, 4, 99]).expect("delete");
        assert_eq!(deleted, 1);
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_assign_rejects_foreign_scope() {
        let mut store = seeded();
        let result = store.assign(&scope(), &4, 10, 11);
        assert!(matches!(result, Err(StoreError::Backend(_))));
    }
}
