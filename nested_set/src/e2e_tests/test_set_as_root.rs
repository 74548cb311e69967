//! Test root placement: fresh roots, existing roots and promotion.

use crate::config::TreeConfig;
use crate::e2e_tests::helpers::TestTree;

#[test]
fn test_first_root_in_empty_scope() {
    let mut tree = TestTree::new();
    assert_eq!(tree.root(1), (0, 1));
    assert_eq!(tree.top_ids(), vec![1]);
}

#[test]
fn test_roots_are_appended_in_order() {
    let mut tree = TestTree::new();
    tree.root(1);
    assert_eq!(tree.root(2), (2, 3));
    assert_eq!(tree.root(3), (4, 5));
    assert_eq!(tree.top_ids(), vec![1, 2, 3]);
    tree.assert_valid();
}

#[test]
fn test_existing_root_is_left_alone() {
    let mut tree = TestTree::new();
    tree.root(1);
    tree.child(1, 2);
    let before = tree.snapshot();

    let bounds = tree.mutator().set_as_root(&1).expect("set_as_root");
    assert_eq!((bounds.left(), bounds.right()), (0, 3));
    assert_eq!(tree.snapshot(), before);
}

#[test]
fn test_promote_subtree_to_root() {
    let mut tree = TestTree::new();
    tree.root(1);
    tree.child(1, 2);
    tree.child(2, 3);
    tree.root(4);
    assert_eq!(tree.bounds(1), (0, 5));
    assert_eq!(tree.bounds(2), (1, 4));
    assert_eq!(tree.bounds(3), (2, 3));
    assert_eq!(tree.bounds(4), (6, 7));

    let bounds = tree.mutator().set_as_root(&2).expect("set_as_root");
    assert_eq!((bounds.left(), bounds.right()), (8, 11));
    assert_eq!(tree.bounds(3), (9, 10));

    // The old parent keeps its span as a hole.
    assert_eq!(tree.bounds(1), (0, 5));
    assert!(tree.query().is_leaf(&1).expect("is_leaf"));
    assert_eq!(tree.top_ids(), vec![1, 4, 2]);
    assert_eq!(tree.parent_id(3), Some(2));
    tree.assert_valid();
}

#[test]
fn test_configured_floor_for_first_root() {
    let mut tree = TestTree::with_config(TreeConfig::default().with_min_left(100));
    assert_eq!(tree.root(1), (100, 101));
    assert_eq!(tree.root(2), (102, 103));
}
