//! Node snapshots and assembled trees.

use serde::Serialize;

use super::bounds::Bounds;

/// A record identity paired with the bounds it held when it was read.
///
/// This is a snapshot: any later mutation in the same scope may shift the
/// stored bounds, so callers should re-read rather than keep it around.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Node<Id> {
    /// Store-owned identity.
    pub id: Id,
    /// Bounds at read time.
    pub bounds: Bounds,
}

impl<Id> Node<Id> {
    /// Create a node snapshot.
    #[must_use]
    pub const fn new(id: Id, bounds: Bounds) -> Self {
        Self { id, bounds }
    }
}

/// A node with its children populated, ordered by left bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode<Id> {
    /// Store-owned identity.
    pub id: Id,
    /// Bounds at read time.
    pub bounds: Bounds,
    /// Direct children, ascending by left bound.
    pub children: Vec<TreeNode<Id>>,
}

impl<Id> TreeNode<Id> {
    /// Create a childless tree node.
    #[must_use]
    pub fn new(node: Node<Id>) -> Self {
        Self {
            id: node.id,
            bounds: node.bounds,
            children: Vec::new(),
        }
    }

    /// Whether this node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of nodes in this subtree, including this node.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pre_order().count()
    }

    /// Always false; a tree node counts itself.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Pre-order traversal of this subtree.
    ///
    /// The root is yielded at depth 0. Calling this again restarts the walk.
    #[must_use]
    pub fn pre_order(&self) -> PreOrder<'_, Id> {
        PreOrder {
            stack: vec![(0, self)],
        }
    }
}

/// Lazy pre-order walk over one or more trees, yielding `(depth, node)`.
///
/// Order matches ascending left bound across the whole forest.
#[derive(Debug)]
pub struct PreOrder<'a, Id> {
    stack: Vec<(usize, &'a TreeNode<Id>)>,
}

impl<'a, Id> PreOrder<'a, Id> {
    /// Walk every tree of a forest in order.
    #[must_use]
    pub fn over(forest: &'a [TreeNode<Id>]) -> Self {
        Self {
            stack: forest.iter().rev().map(|tree| (0, tree)).collect(),
        }
    }
}

impl<'a, Id> Iterator for PreOrder<'a, Id> {
    type Item = (usize, &'a TreeNode<Id>);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().map(|child| (depth + 1, child)));
        Some((depth, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(id: u64, left: i64, right: i64, children: Vec<TreeNode<u64>>) -> TreeNode<u64> {
        TreeNode {
            id,
            bounds: Bounds::new(left, right).expect("valid bounds"),
            children,
        }
    }

    #[test]
    fn test_pre_order_follows_left_bounds() {
        let root = tree(
            1,
            0,
            9,
            vec![
                tree(2, 1, 4, vec![tree(3, 2, 3, vec![])]),
                tree(4, 5, 8, vec![tree(5, 6, 7, vec![])]),
            ],
        );

        let walk: Vec<(usize, u64)> = root.pre_order().map(|(d, n)| (d, n.id)).collect();
        assert_eq!(walk, vec![(0, 1), (1, 2), (2, 3), (1, 4), (2, 5)]);

        let lefts: Vec<i64> = root.pre_order().map(|(_, n)| n.bounds.left()).collect();
        assert!(lefts.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(root.len(), 5);
    }

    #[test]
    fn test_tree_node_from_owned_id() {
        let node = Node::new("menu".to_string(), Bounds::leaf(4));
        let leaf = TreeNode::new(node);
        assert_eq!(leaf.id, "menu");
        assert_eq!((leaf.bounds.left(), leaf.bounds.right()), (4, 5));
        assert!(leaf.is_leaf());
        assert_eq!(leaf.len(), 1);
    }

    #[test]
    fn test_pre_order_restarts() {
        let root = tree(1, 0, 3, vec![tree(2, 1, 2, vec![])]);
        assert_eq!(root.pre_order().count(), 2);
        assert_eq!(root.pre_order().count(), 2);
        assert!(root.children[0].is_leaf());
    }

    #[test]
    fn test_forest_walk() {
        let forest = vec![
            tree(1, 0, 1, vec![]),
            tree(2, 2, 5, vec![tree(3, 3, 4, vec![])]),
        ];
        let ids: Vec<u64> = PreOrder::over(&forest).map(|(_, n)| n.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
