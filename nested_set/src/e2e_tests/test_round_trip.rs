//! Test that adding then removing a leaf restores the tree's shape.

use crate::e2e_tests::helpers::TestTree;
use crate::types::PreOrder;

/// `(depth, id)` for every node in pre-order.
fn shape(tree: &TestTree) -> Vec<(usize, u64)> {
    let forest = tree.scope.builder(&tree.store).full_tree().expect("full_tree");
    PreOrder::over(&forest).map(|(depth, node)| (depth, node.id)).collect()
}

#[test]
fn test_add_then_remove_restores_shape() {
    let mut tree = TestTree::new();
    tree.root(1);
    tree.child(1, 2);
    tree.child(1, 3);
    tree.root(4);
    let before = shape(&tree);

    tree.child(2, 5);
    assert_eq!(tree.bounds(5), (2, 3));
    assert_eq!(tree.bounds(4), (8, 9));
    assert_ne!(shape(&tree), before);

    assert_eq!(tree.mutator().remove(&5).expect("remove"), 1);
    assert_eq!(shape(&tree), before);
    assert!(tree.query().is_leaf(&2).expect("is_leaf"));
    assert!(tree.query().is_ancestor_of(&1, &3).expect("is_ancestor_of"));
    tree.assert_valid();
}

#[test]
fn test_repeated_round_trips() {
    let mut tree = TestTree::new();
    tree.root(1);
    tree.child(1, 2);
    let before = shape(&tree);

    for id in 10..20 {
        tree.child(1, id);
        tree.mutator().remove(&id).expect("remove");
    }
    assert_eq!(shape(&tree), before);
    // Every round trip leaves a two-wide hole inside the root.
    assert_eq!(tree.bounds(1), (0, 23));
    tree.assert_valid();
}
