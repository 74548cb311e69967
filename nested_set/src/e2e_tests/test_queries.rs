//! Test structural queries on a tree built through the mutators.

use crate::e2e_tests::helpers::{TestTree, ids};

//        1                 6
//      /   \               |
//     2     5              7
//    / \
//   3   4
fn fixture() -> TestTree {
    let mut tree = TestTree::new();
    tree.root(1);
    tree.child(1, 2);
    tree.child(2, 3);
    tree.child(2, 4);
    tree.child(1, 5);
    tree.root(6);
    tree.child(6, 7);
    tree
}

#[test]
fn test_parents_and_children() {
    let tree = fixture();
    assert_eq!(tree.parent_id(1), None);
    assert_eq!(tree.parent_id(4), Some(2));
    assert_eq!(tree.parent_id(7), Some(6));
    assert_eq!(tree.child_ids(1), vec![2, 5]);
    assert_eq!(tree.child_ids(2), vec![3, 4]);
    assert_eq!(tree.top_ids(), vec![1, 6]);
}

#[test]
fn test_siblings() {
    let tree = fixture();
    let query = tree.query();
    assert_eq!(ids(&query.siblings(&3).expect("siblings")), vec![4]);
    assert_eq!(ids(&query.siblings(&5).expect("siblings")), vec![2]);
    assert_eq!(ids(&query.siblings(&6).expect("siblings")), vec![1]);
    assert!(query.siblings(&7).expect("siblings").is_empty());
}

#[test]
fn test_ancestry() {
    let tree = fixture();
    let query = tree.query();
    assert!(query.is_ancestor_of(&1, &4).expect("is_ancestor_of"));
    assert!(query.is_descendant_of(&4, &1).expect("is_descendant_of"));
    assert!(!query.is_ancestor_of(&6, &4).expect("is_ancestor_of"));
    assert!(!query.is_ancestor_of(&4, &1).expect("is_ancestor_of"));
    assert!(query.is_direct_parent_of(&2, &3).expect("is_direct_parent_of"));
    assert!(!query.is_direct_parent_of(&1, &3).expect("is_direct_parent_of"));
    assert!(query.is_root(&6).expect("is_root"));
    assert!(!query.is_root(&7).expect("is_root"));
}

#[test]
fn test_paths_and_counts() {
    let tree = fixture();
    let query = tree.query();
    assert_eq!(ids(&query.ancestors(&4).expect("ancestors")), vec![1, 2]);
    assert_eq!(
        ids(&query.descendants(&1).expect("descendants")),
        vec![2, 3, 4, 5]
    );
    assert_eq!(query.depth(&4).expect("depth"), 2);
    assert_eq!(query.depth(&6).expect("depth"), 0);
    assert_eq!(query.count_descendants(&1).expect("count"), 4);
    assert_eq!(query.count_descendants(&6).expect("count"), 1);
    assert!(query.is_leaf(&5).expect("is_leaf"));
    assert!(!query.is_leaf(&2).expect("is_leaf"));
}
