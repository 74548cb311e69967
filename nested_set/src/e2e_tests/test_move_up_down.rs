//! Test sibling reordering: move_up, move_down and direct exchanges.

use crate::e2e_tests::helpers::TestTree;
use crate::error::TreeError;
use crate::tree::ExchangeStrategy;

/// A(0,5) with leaves B(1,2) and C(3,4).
fn two_leaves() -> TestTree {
    let mut tree = TestTree::new();
    tree.root(1);
    tree.child(1, 2);
    tree.child(1, 3);
    tree
}

#[test]
fn test_move_up_swaps_leaves() {
    let mut tree = two_leaves();

    assert!(tree.mutator().move_up(&3).expect("move_up"));
    assert_eq!(tree.bounds(3), (1, 2));
    assert_eq!(tree.bounds(2), (3, 4));
    assert_eq!(tree.bounds(1), (0, 5));
    assert_eq!(tree.child_ids(1), vec![3, 2]);
    tree.assert_valid();
}

#[test]
fn test_move_past_the_ends() {
    let mut tree = two_leaves();
    let before = tree.snapshot();

    assert!(!tree.mutator().move_up(&2).expect("move_up"));
    assert!(!tree.mutator().move_down(&3).expect("move_down"));
    assert!(!tree.mutator().move_up(&1).expect("move_up"));
    assert_eq!(tree.snapshot(), before);
}

#[test]
fn test_move_down_then_up_restores_order() {
    let mut tree = two_leaves();
    let before = tree.snapshot();

    assert!(tree.mutator().move_down(&2).expect("move_down"));
    assert_eq!(tree.child_ids(1), vec![3, 2]);
    assert!(tree.mutator().move_up(&2).expect("move_up"));
    assert_eq!(tree.snapshot(), before);
}

#[test]
fn test_move_down_carries_subtree() {
    let mut tree = two_leaves();
    tree.child(2, 4);
    assert_eq!(tree.bounds(1), (0, 7));
    assert_eq!(tree.bounds(2), (1, 4));
    assert_eq!(tree.bounds(4), (2, 3));
    assert_eq!(tree.bounds(3), (5, 6));

    assert!(tree.mutator().move_down(&2).expect("move_down"));
    assert_eq!(tree.bounds(3), (1, 2));
    assert_eq!(tree.bounds(2), (3, 6));
    assert_eq!(tree.bounds(4), (4, 5));
    assert_eq!(tree.child_ids(1), vec![3, 2]);
    assert_eq!(tree.parent_id(4), Some(2));
    tree.assert_valid();
}

#[test]
fn test_exchange_strategies() {
    let mut tree = two_leaves();
    let strategy = tree
        .mutator()
        .exchange_sibling_bounds(&2, &3)
        .expect("exchange");
    assert_eq!(strategy, ExchangeStrategy::SwapPairs);

    tree.child(3, 5);
    let strategy = tree
        .mutator()
        .exchange_sibling_bounds(&3, &2)
        .expect("exchange");
    assert_eq!(strategy, ExchangeStrategy::RelocateBlocks);
    assert_eq!(tree.child_ids(1), vec![2, 3]);
    assert_eq!(tree.parent_id(5), Some(3));
    tree.assert_valid();
}

#[test]
fn test_exchange_moves_nodes_in_between() {
    let mut tree = TestTree::new();
    tree.root(1);
    tree.child(1, 2);
    tree.child(1, 3);
    tree.child(1, 4);
    tree.child(4, 5);
    tree.child(4, 6);

    tree.mutator()
        .exchange_sibling_bounds(&2, &4)
        .expect("exchange");
    assert_eq!(tree.child_ids(1), vec![4, 3, 2]);
    assert_eq!(tree.child_ids(4), vec![5, 6]);
    tree.assert_valid();
}

#[test]
fn test_exchange_rejects_non_siblings() {
    let mut tree = two_leaves();
    tree.child(2, 4);
    tree.root(5);
    let before = tree.snapshot();

    for (a, b) in [(2, 4), (3, 5), (2, 2)] {
        let result = tree.mutator().exchange_sibling_bounds(&a, &b);
        assert!(
            matches!(result, Err(TreeError::NotSiblings { .. })),
            "{a} and {b}: {result:?}"
        );
    }
    assert_eq!(tree.snapshot(), before);
}

#[test]
fn test_reorder_roots() {
    let mut tree = TestTree::new();
    tree.root(1);
    tree.child(1, 2);
    tree.root(3);

    assert!(tree.mutator().move_up(&3).expect("move_up"));
    assert_eq!(tree.top_ids(), vec![3, 1]);
    assert_eq!(tree.parent_id(2), Some(1));
    tree.assert_valid();
}
