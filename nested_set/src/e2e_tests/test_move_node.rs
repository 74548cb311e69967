//! Test re-parenting subtrees with move_node.

use crate::e2e_tests::helpers::TestTree;
use crate::error::TreeError;

/// A(0,5) > B(1,4) > D(2,3), plus root E(6,7).
fn fixture() -> TestTree {
    let mut tree = TestTree::new();
    tree.root(1);
    tree.child(1, 2);
    tree.child(2, 4);
    tree.root(5);
    assert_eq!(tree.bounds(1), (0, 5));
    assert_eq!(tree.bounds(2), (1, 4));
    assert_eq!(tree.bounds(4), (2, 3));
    assert_eq!(tree.bounds(5), (6, 7));
    tree
}

#[test]
fn test_move_to_later_parent() {
    let mut tree = fixture();

    let bounds = tree.mutator().move_node(&2, &5).expect("move_node");
    assert_eq!((bounds.left(), bounds.right()), (7, 10));
    assert_eq!(tree.bounds(4), (8, 9));
    assert_eq!(tree.bounds(5), (6, 11));
    assert_eq!(tree.bounds(1), (0, 5));

    assert_eq!(tree.parent_id(2), Some(5));
    assert_eq!(tree.parent_id(4), Some(2));
    assert!(tree.query().is_leaf(&1).expect("is_leaf"));
    tree.assert_valid();
}

#[test]
fn test_move_to_earlier_parent() {
    let mut tree = fixture();
    tree.mutator().move_node(&2, &5).expect("move_node");

    let bounds = tree.mutator().move_node(&2, &1).expect("move_node");
    assert_eq!((bounds.left(), bounds.right()), (5, 8));
    assert_eq!(tree.bounds(4), (6, 7));
    assert_eq!(tree.bounds(1), (0, 9));
    assert_eq!(tree.bounds(5), (10, 15));

    assert_eq!(tree.parent_id(2), Some(1));
    assert_eq!(tree.top_ids(), vec![1, 5]);
    tree.assert_valid();
}

#[test]
fn test_move_to_own_parent_keeps_structure() {
    let mut tree = TestTree::new();
    tree.root(1);
    tree.child(1, 2);
    tree.child(1, 3);

    tree.mutator().move_node(&2, &1).expect("move_node");
    assert_eq!(tree.bounds(1), (0, 7));
    assert_eq!(tree.bounds(3), (3, 4));
    assert_eq!(tree.bounds(2), (5, 6));

    // Same parent, now the last child.
    assert_eq!(tree.parent_id(2), Some(1));
    assert_eq!(tree.parent_id(3), Some(1));
    assert_eq!(tree.child_ids(1), vec![3, 2]);
    tree.assert_valid();
}

#[test]
fn test_move_under_descendant_is_rejected() {
    let mut tree = fixture();
    let before = tree.snapshot();
    let writes = tree.store.stats().writes;

    for (node, target) in [(1, 4), (1, 2), (2, 4), (2, 2)] {
        let result = tree.mutator().move_node(&node, &target);
        assert!(
            matches!(result, Err(TreeError::CycleRejected { .. })),
            "{node} under {target}: {result:?}"
        );
    }
    assert_eq!(tree.snapshot(), before);
    assert_eq!(tree.store.stats().writes, writes);
}

#[test]
fn test_move_root_under_other_root() {
    let mut tree = fixture();

    tree.mutator().move_node(&5, &4).expect("move_node");
    assert_eq!(tree.top_ids(), vec![1]);
    assert_eq!(tree.parent_id(5), Some(4));
    assert_eq!(tree.query().depth(&5).expect("depth"), 3);
    tree.assert_valid();
}
