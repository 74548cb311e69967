//! Invariant checking for nested-set scopes.
//!
//! The checker reads raw rows straight from the store (bypassing validation)
//! so that it can report every broken invariant instead of stopping at the
//! first corrupt row.

// Simulation code legitimately needs cloning for test data
#![allow(clippy::disallowed_methods)]

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;

use crate::error::TreeError;
use crate::store::{Filter, Order, RecordStore, Row};
use crate::tree::TreeScope;

/// An invariant violation detected in a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violation.
    pub description: String,
    /// Operation index where it was detected.
    pub operation_index: usize,
    /// Additional context.
    pub context: String,
}

/// Checker for nested-set invariants.
#[derive(Debug, Default)]
pub struct InvariantChecker {
    /// Detected violations.
    violations: Vec<InvariantViolation>,
}

impl InvariantChecker {
    /// Create a new invariant checker.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            violations: Vec::new(),
        }
    }

    /// Get all violations.
    #[must_use]
    pub fn violations(&self) -> &[InvariantViolation] {
        &self.violations
    }

    /// Check if any violations were detected.
    #[must_use]
    pub const fn has_violations(&self) -> bool {
        !self.violations.is_empty()
    }

    /// Clear all recorded violations.
    pub fn clear(&mut self) {
        self.violations.clear();
    }

    /// Add a violation.
    pub fn add_violation(&mut self, violation: InvariantViolation) {
        self.violations.push(violation);
    }

    fn violation(&mut self, description: &str, operation_index: usize, context: String) {
        self.violations.push(InvariantViolation {
            description: description.to_string(),
            operation_index,
            context,
        });
    }

    /// Check the structural invariants of a scope.
    ///
    /// - every node has `left < right`
    /// - no bound value is used twice
    /// - any two intervals are disjoint or strictly nested
    ///
    /// Returns the number of violations found by this call.
    pub fn check_scope<S: RecordStore>(
        &mut self,
        store: &S,
        scope: &TreeScope<S::Scope>,
        operation_index: usize,
    ) -> Result<usize, TreeError> {
        let before = self.violations.len();
        let rows = all_rows(store, scope)?;

        let mut seen: BTreeMap<i64, &S::Id> = BTreeMap::new();
        for row in &rows {
            if row.left >= row.right {
                self.violation(
                    "left bound not below right bound",
                    operation_index,
                    format!("node {:?} has [{}, {}]", row.id, row.left, row.right),
                );
            }
            for value in [row.left, row.right] {
                if let Some(other) = seen.insert(value, &row.id) {
                    self.violation(
                        "bound value used twice",
                        operation_index,
                        format!("nodes {other:?} and {:?} both use {value}", row.id),
                    );
                }
            }
        }

        let mut open: Vec<&Row<S::Id>> = Vec::new();
        for row in rows.iter().filter(|row| row.left < row.right) {
            while open.last().is_some_and(|top| top.right < row.left) {
                open.pop();
            }
            if let Some(top) = open.last() {
                if row.right >= top.right {
                    self.violation(
                        "intervals overlap without nesting",
                        operation_index,
                        format!(
                            "node {:?} [{}, {}] crosses node {:?} [{}, {}]",
                            top.id, top.left, top.right, row.id, row.left, row.right
                        ),
                    );
                    continue;
                }
            }
            open.push(row);
        }

        Ok(self.violations.len() - before)
    }

    /// Check that the scope holds exactly the expected nodes with the
    /// expected direct parents.
    ///
    /// Returns the number of violations found by this call.
    pub fn check_parents<S: RecordStore>(
        &mut self,
        store: &S,
        scope: &TreeScope<S::Scope>,
        expected: &BTreeMap<S::Id, Option<S::Id>>,
        operation_index: usize,
    ) -> Result<usize, TreeError> {
        let before = self.violations.len();
        let actual = direct_parents(&all_rows(store, scope)?);

        let actual_ids: BTreeSet<&S::Id> = actual.keys().collect();
        let expected_ids: BTreeSet<&S::Id> = expected.keys().collect();
        if actual_ids != expected_ids {
            self.violation(
                "node membership differs from model",
                operation_index,
                format!("store has {actual_ids:?}, model has {expected_ids:?}"),
            );
        }

        for (id, parent) in expected {
            if let Some(found) = actual.get(id) {
                if found.as_ref() != parent.as_ref() {
                    self.violation(
                        "direct parent differs from model",
                        operation_index,
                        format!("node {id:?}: store says {found:?}, model says {parent:?}"),
                    );
                }
            }
        }

        Ok(self.violations.len() - before)
    }

    /// Check that each parent's children (and the roots, under `None`) come
    /// back from the query layer in the expected order.
    ///
    /// Returns the number of violations found by this call.
    pub fn check_child_order<S: RecordStore>(
        &mut self,
        store: &S,
        scope: &TreeScope<S::Scope>,
        expected: &BTreeMap<Option<S::Id>, Vec<S::Id>>,
        operation_index: usize,
    ) -> Result<usize, TreeError> {
        let before = self.violations.len();
        let query = scope.query(store);

        for (parent, children) in expected {
            let nodes = match parent {
                Some(parent) => query.direct_children(parent)?,
                None => query.top_nodes()?,
            };
            let actual: Vec<&S::Id> = nodes.iter().map(|node| &node.id).collect();
            if !actual.iter().copied().eq(children.iter()) {
                self.violation(
                    "sibling order differs from model",
                    operation_index,
                    format!("under {parent:?}: store has {actual:?}, model has {children:?}"),
                );
            }
        }

        Ok(self.violations.len() - before)
    }

    /// Check that every node's span matches its descendant count.
    ///
    /// Only holds for scopes built by appending (no removals or moves).
    pub fn check_size_law<S: RecordStore>(
        &mut self,
        store: &S,
        scope: &TreeScope<S::Scope>,
        operation_index: usize,
    ) -> Result<usize, TreeError> {
        let before = self.violations.len();
        let rows = all_rows(store, scope)?;

        for row in &rows {
            let inside = rows
                .iter()
                .filter(|other| row.left < other.left && other.right < row.right)
                .count();
            let implied = (row.right - row.left - 1) / 2;
            if usize::try_from(implied).ok() != Some(inside) {
                self.violation(
                    "span disagrees with descendant count",
                    operation_index,
                    format!(
                        "node {:?} [{}, {}] implies {implied}, has {inside}",
                        row.id, row.left, row.right
                    ),
                );
            }
        }

        Ok(self.violations.len() - before)
    }
}

fn all_rows<S: RecordStore>(
    store: &S,
    scope: &TreeScope<S::Scope>,
) -> Result<Vec<Row<S::Id>>, TreeError> {
    Ok(store.select(scope.predicate(), &Filter::all(), Order::LeftAsc, None)?)
}

/// Direct parent of every well-formed row, derived from a left-ordered scan.
fn direct_parents<Id: Clone + Ord + Debug>(rows: &[Row<Id>]) -> BTreeMap<Id, Option<Id>> {
    let mut parents = BTreeMap::new();
    let mut open: Vec<&Row<Id>> = Vec::new();
    for row in rows.iter().filter(|row| row.left < row.right) {
        while open.last().is_some_and(|top| top.right < row.left) {
            open.pop();
        }
        parents.insert(row.id.clone(), open.last().map(|top| top.id.clone()));
        open.push(row);
    }
    parents
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, RawBounds};

    fn store_with(rows: &[(u64, i64, i64)]) -> MemoryStore {
        let mut store = MemoryStore::new(0);
        for &(id, left, right) in rows {
            store.insert_raw("i", id, RawBounds::assigned(left, right));
        }
        store
    }

    fn scope() -> TreeScope<String> {
        TreeScope::new("i".to_string())
    }

    #[test]
    fn test_valid_scope_has_no_violations() {
        let store = store_with(&[(1, 0, 5), (2, 1, 2), (3, 3, 4), (4, 6, 7)]);
        let mut checker = InvariantChecker::new();
        assert_eq!(checker.check_scope(&store, &scope(), 0).expect("check"), 0);
        assert_eq!(checker.check_size_law(&store, &scope(), 0).expect("check"), 0);
        assert!(!checker.has_violations());
    }

    #[test]
    fn test_overlap_is_a_violation() {
        let store = store_with(&[(1, 0, 4), (2, 2, 6)]);
        let mut checker = InvariantChecker::new();
        assert_eq!(checker.check_scope(&store, &scope(), 3).expect("check"), 1);
        assert_eq!(
            checker.violations()[0].description,
            "intervals overlap without nesting"
        );
        assert_eq!(checker.violations()[0].operation_index, 3);
    }

    #[test]
    fn test_inverted_and_shared_bounds() {
        let store = store_with(&[(1, 0, 3), (2, 5, 4), (3, 3, 8)]);
        let mut checker = InvariantChecker::new();
        let found = checker.check_scope(&store, &scope(), 0).expect("check");
        let descriptions: Vec<&str> = checker
            .violations()
            .iter()
            .map(|v| v.description.as_str())
            .collect();
        assert!(found >= 2);
        assert!(descriptions.contains(&"left bound not below right bound"));
        assert!(descriptions.contains(&"bound value used twice"));
    }

    #[test]
    fn test_parent_model_comparison() {
        let store = store_with(&[(1, 0, 5), (2, 1, 2), (3, 3, 4)]);
        let mut checker = InvariantChecker::new();

        let mut model = BTreeMap::from([(1, None), (2, Some(1)), (3, Some(1))]);
        assert_eq!(
            checker
                .check_parents(&store, &scope(), &model, 0)
                .expect("check"),
            0
        );

        model.insert(3, Some(2));
        model.insert(9, None);
        assert_eq!(
            checker
                .check_parents(&store, &scope(), &model, 1)
                .expect("check"),
            2
        );
    }

    #[test]
    fn test_child_order_comparison() {
        let store = store_with(&[(1, 0, 5), (2, 1, 2), (3, 3, 4), (4, 6, 7)]);
        let mut checker = InvariantChecker::new();

        let mut model = BTreeMap::from([(None, vec![1, 4]), (Some(1), vec![2, 3])]);
        assert_eq!(
            checker
                .check_child_order(&store, &scope(), &model, 0)
                .expect("check"),
            0
        );

        model.insert(Some(1), vec![3, 2]);
        model.insert(None, vec![4, 1]);
        assert_eq!(
            checker
                .check_child_order(&store, &scope(), &model, 1)
                .expect("check"),
            2
        );
        assert_eq!(
            checker.violations()[0].description,
            "sibling order differs from model"
        );
    }

    #[test]
    fn test_size_law_detects_holes() {
        // 1 lost a child: its span still claims two descendants.
        let store = store_with(&[(1, 0, 5), (3, 3, 4)]);
        let mut checker = InvariantChecker::new();
        assert_eq!(checker.check_size_law(&store, &scope(), 0).expect("check"), 1);
        checker.clear();
        assert!(!checker.has_violations());
    }
}
