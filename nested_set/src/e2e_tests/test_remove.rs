//! Test subtree removal and the holes it leaves.

use crate::e2e_tests::helpers::TestTree;
use crate::error::TreeError;

#[test]
fn test_remove_leaf_leaves_hole() {
    let mut tree = TestTree::new();
    tree.root(1);
    tree.child(1, 2);
    tree.child(1, 3);

    assert_eq!(tree.mutator().remove(&2).expect("remove"), 1);
    assert_eq!(tree.bounds(1), (0, 5));
    assert_eq!(tree.bounds(3), (3, 4));
    assert_eq!(tree.query().count_descendants(&1).expect("count"), 1);
    assert!(!tree.query().reader().is_persisted(&2).expect("persisted"));
    tree.assert_valid();
}

#[test]
fn test_remove_subtree() {
    let mut tree = TestTree::new();
    tree.root(1);
    tree.child(1, 2);
    tree.child(2, 3);
    tree.child(2, 4);
    tree.child(1, 5);

    assert_eq!(tree.mutator().remove(&2).expect("remove"), 3);
    assert_eq!(tree.child_ids(1), vec![5]);
    assert_eq!(tree.snapshot().len(), 2);
    tree.assert_valid();
}

#[test]
fn test_remove_children_keeps_node() {
    let mut tree = TestTree::new();
    tree.root(1);
    tree.child(1, 2);
    tree.child(2, 3);
    tree.child(1, 4);
    tree.root(5);

    assert_eq!(tree.mutator().remove_children(&1).expect("remove_children"), 3);
    assert!(tree.query().is_leaf(&1).expect("is_leaf"));
    assert_eq!(tree.bounds(1), (0, 7));
    assert_eq!(tree.top_ids(), vec![1, 5]);

    assert_eq!(tree.mutator().remove_children(&5).expect("remove_children"), 0);
    tree.assert_valid();
}

#[test]
fn test_add_after_remove() {
    let mut tree = TestTree::new();
    tree.root(1);
    tree.child(1, 2);
    tree.child(1, 3);
    tree.mutator().remove(&2).expect("remove");

    assert_eq!(tree.child(1, 4), (5, 6));
    assert_eq!(tree.bounds(1), (0, 7));
    assert_eq!(tree.child_ids(1), vec![3, 4]);
    tree.assert_valid();
}

#[test]
fn test_remove_unplaced_node() {
    let mut tree = TestTree::new();
    tree.root(1);

    let result = tree.mutator().remove(&42);
    assert!(matches!(result, Err(TreeError::NotPersisted { .. })));
}
