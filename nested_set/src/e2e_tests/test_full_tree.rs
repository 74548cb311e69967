//! Test tree assembly from a mutated scope.

use crate::config::TreeConfig;
use crate::e2e_tests::helpers::TestTree;
use crate::error::TreeError;
use crate::types::{PreOrder, TreeNode};

fn build(tree: &mut TestTree) {
    tree.root(1);
    tree.child(1, 2);
    tree.child(2, 3);
    tree.child(1, 4);
    tree.root(5);
}

fn child_ids(node: &TreeNode<u64>) -> Vec<u64> {
    node.children.iter().map(|child| child.id).collect()
}

#[test]
fn test_full_tree_after_edits() {
    let mut tree = TestTree::new();
    build(&mut tree);
    tree.mutator().move_up(&4).expect("move_up");
    tree.mutator().move_node(&5, &4).expect("move_node");

    let forest = tree.scope.builder(&tree.store).full_tree().expect("full_tree");
    assert_eq!(forest.len(), 1);
    assert_eq!(child_ids(&forest[0]), vec![4, 2]);
    assert_eq!(child_ids(&forest[0].children[0]), vec![5]);
    assert_eq!(child_ids(&forest[0].children[1]), vec![3]);

    let walk: Vec<(usize, u64)> = PreOrder::over(&forest)
        .map(|(depth, node)| (depth, node.id))
        .collect();
    assert_eq!(walk, vec![(0, 1), (1, 4), (2, 5), (1, 2), (2, 3)]);
}

#[test]
fn test_children_tree_matches_queries() {
    let mut tree = TestTree::new();
    build(&mut tree);

    let subtree = tree
        .scope
        .builder(&tree.store)
        .children_tree(&1)
        .expect("children_tree");
    assert_eq!(child_ids(&subtree), tree.child_ids(1));
    assert_eq!(subtree.len(), 4);
    assert_eq!(
        subtree.len() - 1,
        tree.query().count_descendants(&1).expect("count")
    );
}

#[test]
fn test_builder_limits() {
    let mut tree = TestTree::with_config(TreeConfig::default().with_max_depth(1).with_max_nodes(4));
    build(&mut tree);

    let builder = tree.scope.builder(&tree.store);
    assert_eq!(
        builder.full_tree(),
        Err(TreeError::SizeLimitExceeded {
            limit: 4,
            requested: 5
        })
    );
    assert_eq!(
        builder.children_tree(&1),
        Err(TreeError::DepthLimitExceeded { limit: 1 })
    );
    assert!(builder.children_tree(&2).is_ok());
}
