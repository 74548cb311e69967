//! Common helpers for end-to-end tests.

use std::collections::BTreeMap;

use crate::config::TreeConfig;
use crate::simulation::InvariantChecker;
use crate::store::memory::RecordId;
use crate::store::{MemoryStore, RawBounds};
use crate::testing::new_test_store;
use crate::tree::{BoundsMutator, TreeQuery, TreeScope};
use crate::types::Node;

/// Scope name used unless a test asks for another.
pub const DEFAULT_SCOPE: &str = "menu";

/// A store plus the scope most tests operate in.
pub struct TestTree {
    pub store: MemoryStore,
    pub scope: TreeScope<String>,
}

impl TestTree {
    /// Create an empty tree in the default scope.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    /// Create an empty tree with a custom configuration.
    #[must_use]
    pub fn with_config(config: TreeConfig) -> Self {
        Self {
            store: new_test_store(),
            scope: TreeScope::with_config(DEFAULT_SCOPE.to_string(), config),
        }
    }

    /// Query handle over the current state.
    #[must_use]
    pub const fn query(&self) -> TreeQuery<'_, MemoryStore> {
        self.scope.query(&self.store)
    }

    /// Mutator handle.
    pub const fn mutator(&mut self) -> BoundsMutator<'_, MemoryStore> {
        self.scope.mutator(&mut self.store)
    }

    /// Save `id` unplaced and make it a root.
    #[allow(clippy::expect_used)]
    pub fn root(&mut self, id: RecordId) -> (i64, i64) {
        self.store.insert_unassigned(DEFAULT_SCOPE, id);
        let bounds = self.mutator().set_as_root(&id).expect("set_as_root");
        (bounds.left(), bounds.right())
    }

    /// Save `id` unplaced and add it as the last child of `parent`.
    #[allow(clippy::expect_used)]
    pub fn child(&mut self, parent: RecordId, id: RecordId) -> (i64, i64) {
        self.store.insert_unassigned(DEFAULT_SCOPE, id);
        let bounds = self.mutator().add_child(&parent, &id).expect("add_child");
        (bounds.left(), bounds.right())
    }

    /// Current `(left, right)` of a node.
    #[allow(clippy::expect_used)]
    #[must_use]
    pub fn bounds(&self, id: RecordId) -> (i64, i64) {
        let bounds = self.query().reader().bounds_of(&id).expect("bounds_of");
        (bounds.left(), bounds.right())
    }

    /// Ids of `id`'s direct children in order.
    #[allow(clippy::expect_used)]
    #[must_use]
    pub fn child_ids(&self, id: RecordId) -> Vec<RecordId> {
        ids(&self.query().direct_children(&id).expect("direct_children"))
    }

    /// Ids of the top nodes in order.
    #[allow(clippy::expect_used)]
    #[must_use]
    pub fn top_ids(&self) -> Vec<RecordId> {
        ids(&self.query().top_nodes().expect("top_nodes"))
    }

    /// Id of the direct parent of `id`, if any.
    #[allow(clippy::expect_used)]
    #[must_use]
    pub fn parent_id(&self, id: RecordId) -> Option<RecordId> {
        self.query()
            .direct_parent(&id)
            .expect("direct_parent")
            .map(|node| node.id)
    }

    /// Raw bound columns of the default scope.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<RecordId, RawBounds> {
        self.store.snapshot(DEFAULT_SCOPE)
    }

    /// Panic if the scope breaks any structural invariant.
    #[allow(clippy::expect_used)]
    pub fn assert_valid(&self) {
        let mut checker = InvariantChecker::new();
        checker
            .check_scope(&self.store, &self.scope, 0)
            .expect("check_scope");
        assert!(
            !checker.has_violations(),
            "violations: {:?}",
            checker.violations()
        );
    }

    /// Panic if any span disagrees with its descendant count.
    #[allow(clippy::expect_used)]
    pub fn assert_size_law(&self) {
        let mut checker = InvariantChecker::new();
        checker
            .check_size_law(&self.store, &self.scope, 0)
            .expect("check_size_law");
        assert!(
            !checker.has_violations(),
            "violations: {:?}",
            checker.violations()
        );
    }
}

/// Ids of a node list.
#[must_use]
pub fn ids(nodes: &[Node<RecordId>]) -> Vec<RecordId> {
    nodes.iter().map(|node| node.id).collect()
}
