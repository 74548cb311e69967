//! Validated bound reads.
//!
//! Everything above the store goes through [`BoundsReader`]: it turns raw
//! columns into [`Bounds`], refusing unsaved nodes and corrupt pairs.

use crate::error::TreeError;
use crate::store::{Aggregate, BoundField, Filter, Order, RawBounds, RecordStore, Row};
use crate::types::{Bounds, Extent, Node};

use super::TreeScope;

/// Reads bounds from a store within one scope.
#[derive(Debug)]
pub struct BoundsReader<'a, S: RecordStore> {
    store: &'a S,
    scope: &'a TreeScope<S::Scope>,
}

impl<S: RecordStore> Clone for BoundsReader<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: RecordStore> Copy for BoundsReader<'_, S> {}

impl<'a, S: RecordStore> BoundsReader<'a, S> {
    /// Create a reader.
    pub const fn new(store: &'a S, scope: &'a TreeScope<S::Scope>) -> Self {
        Self { store, scope }
    }

    /// The scope being read.
    #[must_use]
    pub const fn scope(&self) -> &'a TreeScope<S::Scope> {
        self.scope
    }

    /// The node's `(left, right)` pair.
    ///
    /// # Errors
    ///
    /// - `NotPersisted` if the record is missing or has no bounds.
    /// - `CorruptBounds` if only one side is set or `left >= right`.
    pub fn bounds_of(&self, id: &S::Id) -> Result<Bounds, TreeError> {
        let raw = self
            .store
            .fetch_bounds(self.scope.predicate(), id)?
            .ok_or_else(|| TreeError::not_persisted(id))?;
        validate(id, raw)
    }

    /// The node's bounds as a [`Node`] snapshot.
    pub fn node(&self, id: &S::Id) -> Result<Node<S::Id>, TreeError> {
        Ok(Node::new(id.clone(), self.bounds_of(id)?))
    }

    /// Whether the node already has bounds in this scope.
    ///
    /// A record with only one bound set counts as persisted (and corrupt).
    pub fn is_persisted(&self, id: &S::Id) -> Result<bool, TreeError> {
        Ok(self
            .store
            .fetch_bounds(self.scope.predicate(), id)?
            .is_some_and(|raw| !raw.is_unassigned()))
    }

    /// The scope's smallest left and largest right bound.
    ///
    /// `None` means the scope holds no placed nodes.
    pub fn scope_extent(&self) -> Result<Option<Extent>, TreeError> {
        let predicate = self.scope.predicate();
        let min_left = self
            .store
            .aggregate(predicate, BoundField::Left, Aggregate::Min)?;
        let max_right = self
            .store
            .aggregate(predicate, BoundField::Right, Aggregate::Max)?;

        Ok(match (min_left, max_right) {
            (Some(min_left), Some(max_right)) => Some(Extent {
                min_left,
                max_right,
            }),
            _ => None,
        })
    }

    /// Validated nodes matching `filter`.
    pub fn select(
        &self,
        filter: &Filter<S::Id>,
        order: Order,
        limit: Option<usize>,
    ) -> Result<Vec<Node<S::Id>>, TreeError> {
        self.store
            .select(self.scope.predicate(), filter, order, limit)?
            .into_iter()
            .map(validate_row)
            .collect()
    }

    /// Ids of the nodes matching `filter`, ascending by left bound.
    pub fn select_ids(&self, filter: &Filter<S::Id>) -> Result<Vec<S::Id>, TreeError> {
        Ok(self
            .store
            .select(self.scope.predicate(), filter, Order::LeftAsc, None)?
            .into_iter()
            .map(|row| row.id)
            .collect())
    }

    /// Number of nodes matching `filter`.
    pub fn count(&self, filter: &Filter<S::Id>) -> Result<usize, TreeError> {
        Ok(self.store.count(self.scope.predicate(), filter)?)
    }
}

fn validate<Id: std::fmt::Debug>(id: &Id, raw: RawBounds) -> Result<Bounds, TreeError> {
    if raw.is_unassigned() {
        return Err(TreeError::not_persisted(id));
    }
    raw.left
        .zip(raw.right)
        .and_then(|(left, right)| Bounds::new(left, right))
        .ok_or_else(|| TreeError::CorruptBounds {
            node: format!("{id:?}"),
            left: raw.left,
            right: raw.right,
        })
}

fn validate_row<Id: std::fmt::Debug>(row: Row<Id>) -> Result<Node<Id>, TreeError> {
    let bounds = validate(&row.id, RawBounds::assigned(row.left, row.right))?;
    Ok(Node::new(row.id, bounds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn fixture() -> (MemoryStore, TreeScope<String>) {
        let mut store = MemoryStore::new(0);
        store.insert_raw("t", 1, RawBounds::assigned(0, 3));
        store.insert_raw("t", 2, RawBounds::assigned(1, 2));
        store.insert_unassigned("t", 3);
        store.insert_raw(
            "t",
            4,
            RawBounds {
                left: Some(9),
                right: None,
            },
        );
        store.insert_raw("t", 5, RawBounds::assigned(7, 7));
        (store, TreeScope::new("t".to_string()))
    }

    #[test]
    fn test_bounds_of_valid_node() {
        let (store, scope) = fixture();
        let bounds = scope.reader(&store).bounds_of(&1).expect("bounds");
        assert_eq!((bounds.left(), bounds.right()), (0, 3));
    }

    #[test]
    fn test_bounds_of_unsaved_node() {
        let (store, scope) = fixture();
        let reader = scope.reader(&store);
        assert!(matches!(
            reader.bounds_of(&3),
            Err(TreeError::NotPersisted { .. })
        ));
        assert!(matches!(
            reader.bounds_of(&42),
            Err(TreeError::NotPersisted { .. })
        ));
        assert!(!reader.is_persisted(&3).expect("persisted"));
        assert!(reader.is_persisted(&4).expect("persisted"));
    }

    #[test]
    fn test_bounds_of_corrupt_node() {
        let (store, scope) = fixture();
        let reader = scope.reader(&store);
        assert_eq!(
            reader.bounds_of(&4),
            Err(TreeError::CorruptBounds {
                node: "4".to_string(),
                left: Some(9),
                right: None,
            })
        );
        assert!(matches!(
            reader.bounds_of(&5),
            Err(TreeError::CorruptBounds { .. })
        ));
    }

    #[test]
    fn test_scope_extent() {
        let mut store = MemoryStore::new(0);
        let scope = TreeScope::new("t".to_string());
        assert_eq!(scope.reader(&store).scope_extent().expect("extent"), None);

        store.insert_raw("t", 1, RawBounds::assigned(4, 9));
        store.insert_raw("t", 2, RawBounds::assigned(10, 11));
        store.insert_raw("u", 3, RawBounds::assigned(0, 99));
        assert_eq!(
            scope.reader(&store).scope_extent().expect("extent"),
            Some(Extent {
                min_left: 4,
                max_right: 11
            })
        );
    }

    #[test]
    fn test_scope_extent_ignores_half_set_rows() {
        let mut store = MemoryStore::new(0);
        let scope = TreeScope::new("t".to_string());
        store.insert_raw(
            "t",
            1,
            RawBounds {
                left: Some(1),
                right: None,
            },
        );
        assert_eq!(scope.reader(&store).scope_extent().expect("extent"), None);

        store.insert_raw("t", 2, RawBounds::assigned(4, 9));
        store.insert_raw(
            "t",
            3,
            RawBounds {
                left: None,
                right: Some(40),
            },
        );
        assert_eq!(
            scope.reader(&store).scope_extent().expect("extent"),
            Some(Extent {
                min_left: 4,
                max_right: 9
            })
        );
    }

    #[test]
    fn test_select_surfaces_corrupt_rows() {
        let (store, scope) = fixture();
        let result = scope.reader(&store).select(&Filter::all(), Order::LeftAsc, None);
        assert!(matches!(result, Err(TreeError::CorruptBounds { .. })));

        let ids = scope
            .reader(&store)
            .select_ids(&Filter::all().right_lt(5))
            .expect("ids");
        assert_eq!(ids, vec![1, 2]);
    }
}
