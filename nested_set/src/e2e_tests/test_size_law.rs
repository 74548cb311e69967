//! Test that spans track descendant counts while a tree only grows.

use crate::e2e_tests::helpers::TestTree;

#[test]
fn test_size_law_on_grown_tree() {
    let mut tree = TestTree::new();
    tree.root(1);
    for id in 2..=30u64 {
        // Deterministic but irregular parent choice among earlier nodes.
        let parent = 1 + (id * 7) % (id - 1);
        tree.child(parent, id);
    }
    tree.root(31);
    tree.child(31, 32);

    for id in 1..=32u64 {
        let (left, right) = tree.bounds(id);
        let count = tree.query().count_descendants(&id).expect("count");
        assert_eq!(
            usize::try_from((right - left - 1) / 2).expect("non-negative"),
            count,
            "node {id} [{left}, {right}]"
        );
    }
    assert_eq!(tree.bounds(1), (0, 59));
    tree.assert_size_law();
    tree.assert_valid();
}

#[test]
fn test_size_law_after_reordering() {
    let mut tree = TestTree::new();
    tree.root(1);
    tree.child(1, 2);
    tree.child(2, 3);
    tree.child(1, 4);
    tree.child(4, 5);
    tree.child(4, 6);

    tree.mutator().move_down(&2).expect("move_down");
    tree.mutator().move_up(&6).expect("move_up");
    // Exchanges relocate blocks without opening holes.
    tree.assert_size_law();
}
