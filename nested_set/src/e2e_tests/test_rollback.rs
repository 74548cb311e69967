//! Test that a store failure part-way through a mutation writes nothing.

use crate::e2e_tests::helpers::{DEFAULT_SCOPE, TestTree};
use crate::error::TreeError;
use crate::store::StoreError;
use crate::store::memory::FaultConfig;

fn fixture() -> TestTree {
    let mut tree = TestTree::new();
    tree.root(1);
    tree.child(1, 2);
    tree.child(2, 3);
    tree.child(1, 4);
    tree.root(5);
    tree
}

fn assert_injected<T: std::fmt::Debug>(result: Result<T, TreeError>) {
    assert!(
        matches!(result, Err(TreeError::Store(StoreError::InjectedFault(_)))),
        "expected injected fault, got {result:?}"
    );
}

#[test]
fn test_add_child_fails_on_each_write() {
    // add_child issues two shifts and one assign.
    for write in 1..=3 {
        let mut tree = fixture();
        tree.store.insert_unassigned(DEFAULT_SCOPE, 6);
        let before = tree.snapshot();
        tree.store
            .set_fault_config(FaultConfig::no_faults().failing_write(write));

        assert_injected(tree.mutator().add_child(&2, &6));
        assert_eq!(tree.snapshot(), before, "failing write {write}");
        assert!(!tree.query().reader().is_persisted(&6).expect("persisted"));
        assert!(!tree.store.in_transaction());
    }
}

#[test]
fn test_move_node_fails_on_last_write() {
    let mut tree = fixture();
    let before = tree.snapshot();
    // Moving 2 under 5: lefts after 5's right are empty, so only the right
    // shift and the subtree shift reach the store.
    tree.store
        .set_fault_config(FaultConfig::no_faults().failing_write(2));

    assert_injected(tree.mutator().move_node(&2, &5));
    assert_eq!(tree.snapshot(), before);
    assert_eq!(tree.store.stats().rollbacks, 1);

    tree.store.set_fault_config(FaultConfig::no_faults());
    tree.mutator().move_node(&2, &5).expect("move_node");
    assert_eq!(tree.parent_id(2), Some(5));
    tree.assert_valid();
}

#[test]
fn test_exchange_fails_between_blocks() {
    let mut tree = fixture();
    let before = tree.snapshot();
    tree.store
        .set_fault_config(FaultConfig::no_faults().failing_write(2));

    assert_injected(tree.mutator().move_down(&2));
    assert_eq!(tree.snapshot(), before);
    assert_eq!(tree.child_ids(1), vec![2, 4]);
}

#[test]
fn test_remove_fails_cleanly() {
    let mut tree = fixture();
    let before = tree.snapshot();
    tree.store
        .set_fault_config(FaultConfig::no_faults().failing_write(1));

    assert_injected(tree.mutator().remove(&2));
    assert_eq!(tree.snapshot(), before);
    assert_eq!(tree.child_ids(2), vec![3]);
}
