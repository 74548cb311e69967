//! Test child placement and the bounds it shifts.

use crate::e2e_tests::helpers::{DEFAULT_SCOPE, TestTree};
use crate::error::TreeError;

#[test]
fn test_add_children_in_order() {
    let mut tree = TestTree::new();
    assert_eq!(tree.root(1), (0, 1));

    assert_eq!(tree.child(1, 2), (1, 2));
    assert_eq!(tree.bounds(1), (0, 3));

    assert_eq!(tree.child(1, 3), (3, 4));
    assert_eq!(tree.bounds(1), (0, 5));
    assert_eq!(tree.bounds(2), (1, 2));

    assert_eq!(tree.child_ids(1), vec![2, 3]);
    tree.assert_valid();
    tree.assert_size_law();
}

#[test]
fn test_add_child_shifts_later_roots() {
    let mut tree = TestTree::new();
    tree.root(1);
    tree.root(2);
    tree.child(2, 3);
    assert_eq!(tree.bounds(2), (2, 5));

    tree.child(1, 4);
    assert_eq!(tree.bounds(1), (0, 3));
    assert_eq!(tree.bounds(4), (1, 2));
    assert_eq!(tree.bounds(2), (4, 7));
    assert_eq!(tree.bounds(3), (5, 6));
    tree.assert_valid();
}

#[test]
fn test_add_placed_node_is_rejected() {
    let mut tree = TestTree::new();
    tree.root(1);
    tree.child(1, 2);
    tree.root(3);
    let before = tree.snapshot();

    let result = tree.mutator().add_child(&3, &2);
    assert!(matches!(result, Err(TreeError::AlreadyPersisted { .. })));
    assert_eq!(tree.snapshot(), before);
}

#[test]
fn test_add_under_unplaced_parent() {
    let mut tree = TestTree::new();
    tree.root(1);
    tree.store.insert_unassigned(DEFAULT_SCOPE, 2);
    tree.store.insert_unassigned(DEFAULT_SCOPE, 3);
    let before = tree.snapshot();

    let result = tree.mutator().add_child(&2, &3);
    assert!(matches!(result, Err(TreeError::NotPersisted { .. })));

    let result = tree.mutator().add_child(&99, &3);
    assert!(matches!(result, Err(TreeError::NotPersisted { .. })));
    assert_eq!(tree.snapshot(), before);
}

#[test]
fn test_deep_chain() {
    let mut tree = TestTree::new();
    tree.root(1);
    for id in 2..=10 {
        tree.child(id - 1, id);
    }
    assert_eq!(tree.bounds(1), (0, 19));
    assert_eq!(tree.bounds(10), (9, 10));
    assert_eq!(tree.query().depth(&10).expect("depth"), 9);
    tree.assert_size_law();
}
