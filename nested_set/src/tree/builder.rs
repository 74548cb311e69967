//! In-memory tree assembly.
//!
//! A subtree is fetched with one range select ordered by left bound and
//! folded into nested [`TreeNode`]s with an explicit stack of open nodes.
//! Depth and size are bounded by the scope's [`TreeConfig`], so a deep or
//! malformed hierarchy produces an error instead of exhausting memory.
//!
//! [`TreeConfig`]: crate::config::TreeConfig

use crate::error::TreeError;
use crate::store::{Filter, Order, RecordStore};
use crate::types::{Node, TreeNode};

use super::TreeScope;
use super::reader::BoundsReader;

/// Builds nested trees from a scope's bounds.
#[derive(Debug)]
pub struct TreeBuilder<'a, S: RecordStore> {
    reader: BoundsReader<'a, S>,
}

impl<'a, S: RecordStore> TreeBuilder<'a, S> {
    /// Create a builder.
    pub const fn new(store: &'a S, scope: &'a TreeScope<S::Scope>) -> Self {
        Self {
            reader: BoundsReader::new(store, scope),
        }
    }

    /// `id` with its children populated to every depth.
    pub fn children_tree(&self, id: &S::Id) -> Result<TreeNode<S::Id>, TreeError> {
        let root = self.reader.node(id)?;
        let filter = Filter::descendants_of(&root.bounds);
        let rows = self.fetch(&filter, 1)?;

        let mut forest = assemble(Some(root), rows, self.reader.scope().config().max_depth)?;
        forest
            .pop()
            .ok_or_else(|| TreeError::not_persisted(id))
    }

    /// Every root of the scope with its subtree populated.
    pub fn full_tree(&self) -> Result<Vec<TreeNode<S::Id>>, TreeError> {
        let rows = self.fetch(&Filter::all(), 0)?;
        assemble(None, rows, self.reader.scope().config().max_depth)
    }

    /// Select rows after checking them against the size limit.
    fn fetch(&self, filter: &Filter<S::Id>, extra: usize) -> Result<Vec<Node<S::Id>>, TreeError> {
        let limit = self.reader.scope().config().max_nodes;
        let requested = self.reader.count(filter)? + extra;
        if requested > limit {
            return Err(TreeError::SizeLimitExceeded { limit, requested });
        }
        self.reader.select(filter, Order::LeftAsc, None)
    }
}

/// Fold nodes sorted by left bound into trees.
///
/// With `root` given, every node must lie inside it and the result is a
/// single tree. Depth is counted from 0 at the outermost level.
fn assemble<Id: std::fmt::Debug>(
    root: Option<Node<Id>>,
    sorted: Vec<Node<Id>>,
    max_depth: usize,
) -> Result<Vec<TreeNode<Id>>, TreeError> {
    let mut forest: Vec<TreeNode<Id>> = Vec::new();
    // Open nodes, outermost first; each one's interval contains the next.
    let mut open: Vec<TreeNode<Id>> = root.into_iter().map(TreeNode::new).collect();
    // The root of a subtree is never closed by a later node.
    let floor = open.len();

    for node in sorted {
        while open.len() > floor
            && open
                .last()
                .is_some_and(|top| top.bounds.right() < node.bounds.left())
        {
            close_top(&mut open, &mut forest);
        }

        if let Some(top) = open.last() {
            if !top.bounds.contains(&node.bounds) {
                return Err(TreeError::Overlap {
                    first: format!("{:?}", top.id),
                    second: format!("{:?}", node.id),
                });
            }
        }

        if open.len() > max_depth {
            return Err(TreeError::DepthLimitExceeded { limit: max_depth });
        }
        open.push(TreeNode::new(node));
    }

    while !open.is_empty() {
        close_top(&mut open, &mut forest);
    }
    Ok(forest)
}

/// Pop the innermost open node into its parent, or into the forest.
fn close_top<Id>(open: &mut Vec<TreeNode<Id>>, forest: &mut Vec<TreeNode<Id>>) {
    if let Some(done) = open.pop() {
        match open.last_mut() {
            Some(parent) => parent.children.push(done),
            None => forest.push(done),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TreeConfig;
    use crate::store::{MemoryStore, RawBounds};
    use crate::types::PreOrder;

    fn store_with(rows: &[(u64, i64, i64)]) -> MemoryStore {
        let mut store = MemoryStore::new(0);
        for &(id, left, right) in rows {
            store.insert_raw("b", id, RawBounds::assigned(left, right));
        }
        store
    }

    fn sample() -> MemoryStore {
        store_with(&[
            (1, 0, 11),
            (2, 1, 6),
            (3, 2, 3),
            (4, 4, 5),
            (5, 7, 10),
            (6, 8, 9),
            (7, 12, 13),
        ])
    }

    fn child_ids(node: &TreeNode<u64>) -> Vec<u64> {
        node.children.iter().map(|c| c.id).collect()
    }

    #[test]
    fn test_children_tree() {
        let store = sample();
        let scope = TreeScope::new("b".to_string());
        let tree = scope.builder(&store).children_tree(&1).expect("tree");

        assert_eq!(tree.id, 1);
        assert_eq!(child_ids(&tree), vec![2, 5]);
        assert_eq!(child_ids(&tree.children[0]), vec![3, 4]);
        assert_eq!(child_ids(&tree.children[1]), vec![6]);
        assert_eq!(tree.len(), 6);
    }

    #[test]
    fn test_children_tree_of_leaf() {
        let store = sample();
        let scope = TreeScope::new("b".to_string());
        let tree = scope.builder(&store).children_tree(&6).expect("tree");
        assert!(tree.is_leaf());
    }

    #[test]
    fn test_full_tree_pre_order() {
        let store = sample();
        let scope = TreeScope::new("b".to_string());
        let forest = scope.builder(&store).full_tree().expect("forest");

        assert_eq!(forest.len(), 2);
        let walk: Vec<(usize, u64)> = PreOrder::over(&forest).map(|(d, n)| (d, n.id)).collect();
        assert_eq!(
            walk,
            vec![(0, 1), (1, 2), (2, 3), (2, 4), (1, 5), (2, 6), (0, 7)]
        );
    }

    #[test]
    fn test_full_tree_of_empty_scope() {
        let store = MemoryStore::new(0);
        let scope = TreeScope::new("b".to_string());
        assert!(scope.builder(&store).full_tree().expect("forest").is_empty());
    }

    #[test]
    fn test_depth_limit() {
        // A chain five levels deep.
        let store = store_with(&[(1, 0, 9), (2, 1, 8), (3, 2, 7), (4, 3, 6), (5, 4, 5)]);
        let scope = TreeScope::with_config(
            "b".to_string(),
            TreeConfig::default().with_max_depth(3),
        );
        let result = scope.builder(&store).full_tree();
        assert_eq!(result, Err(TreeError::DepthLimitExceeded { limit: 3 }));

        let scope = TreeScope::with_config(
            "b".to_string(),
            TreeConfig::default().with_max_depth(4),
        );
        assert!(scope.builder(&store).full_tree().is_ok());
    }

    #[test]
    fn test_size_limit() {
        let store = sample();
        let scope = TreeScope::with_config("b".to_string(), TreeConfig::default().with_max_nodes(5));
        assert_eq!(
            scope.builder(&store).full_tree(),
            Err(TreeError::SizeLimitExceeded {
                limit: 5,
                requested: 7
            })
        );
        assert_eq!(
            scope.builder(&store).children_tree(&1),
            Err(TreeError::SizeLimitExceeded {
                limit: 5,
                requested: 6
            })
        );
        assert!(scope.builder(&store).children_tree(&2).is_ok());
    }

    #[test]
    fn test_overlap_detected_during_assembly() {
        let store = store_with(&[(1, 0, 5), (2, 1, 3), (3, 2, 4)]);
        let scope = TreeScope::new("b".to_string());
        assert!(matches!(
            scope.builder(&store).full_tree(),
            Err(TreeError::Overlap { .. })
        ));
    }
}
