//! Reference model of a scope's hierarchy.
//!
//! The model tracks parent links and the order of each node's children.
//! That is enough to predict whether an edit should be accepted, what the
//! direct-parent relation must look like afterwards, and where every node
//! sits among its siblings.

// Simulation code legitimately needs cloning for test data
#![allow(clippy::disallowed_methods)]

use std::collections::BTreeMap;

use crate::store::memory::RecordId;

use super::op_gen::TreeOperation;

/// Why the model expects an operation to be refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedRejection {
    /// Target parent is the node itself or one of its descendants.
    Cycle,
    /// The two nodes do not share a direct parent.
    NotSiblings,
}

/// Parent links and sibling order of every live node.
#[derive(Debug, Default, Clone)]
pub struct TreeModel {
    parents: BTreeMap<RecordId, Option<RecordId>>,
    /// Children of each parent in sibling order. `None` holds the roots.
    children: BTreeMap<Option<RecordId>, Vec<RecordId>>,
}

impl TreeModel {
    /// Create an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Expected direct parent of every live node.
    #[must_use]
    pub const fn parents(&self) -> &BTreeMap<RecordId, Option<RecordId>> {
        &self.parents
    }

    /// Expected children of every parent with at least one, in order.
    ///
    /// The `None` entry lists the roots.
    #[must_use]
    pub const fn children(&self) -> &BTreeMap<Option<RecordId>, Vec<RecordId>> {
        &self.children
    }

    /// Live node ids in ascending order.
    #[must_use]
    pub fn live_ids(&self) -> Vec<RecordId> {
        self.parents.keys().copied().collect()
    }

    /// Whether `id` is placed in the tree.
    #[must_use]
    pub fn contains(&self, id: RecordId) -> bool {
        self.parents.contains_key(&id)
    }

    /// Whether `ancestor` lies on `id`'s parent chain.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: RecordId, id: RecordId) -> bool {
        let mut current = self.parents.get(&id).copied().flatten();
        while let Some(parent) = current {
            if parent == ancestor {
                return true;
            }
            current = self.parents.get(&parent).copied().flatten();
        }
        false
    }

    /// Predict whether `op` should be refused.
    #[must_use]
    pub fn rejection(&self, op: &TreeOperation) -> Option<ExpectedRejection> {
        match *op {
            TreeOperation::MoveNode { node, parent } => {
                (node == parent || self.is_ancestor(node, parent))
                    .then_some(ExpectedRejection::Cycle)
            }
            TreeOperation::Exchange(a, b) => {
                (a == b || self.parents.get(&a) != self.parents.get(&b))
                    .then_some(ExpectedRejection::NotSiblings)
            }
            _ => None,
        }
    }

    /// Apply a successful operation.
    pub fn apply(&mut self, op: &TreeOperation) {
        match *op {
            TreeOperation::SetAsRoot(id) => {
                // An existing root keeps its place.
                if self.parents.get(&id) != Some(&None) {
                    self.detach(id);
                    self.attach(id, None);
                }
            }
            TreeOperation::AddChild { parent, child } => self.attach(child, Some(parent)),
            TreeOperation::MoveNode { node, parent } => {
                self.detach(node);
                self.attach(node, Some(parent));
            }
            TreeOperation::Remove(id) => {
                let doomed = self.descendants(id);
                self.detach(id);
                self.forget(id);
                for id in doomed {
                    self.forget(id);
                }
            }
            TreeOperation::RemoveChildren(id) => {
                for id in self.descendants(id) {
                    self.forget(id);
                }
                self.children.remove(&Some(id));
            }
            TreeOperation::MoveUp(id) => {
                if let Some((siblings, index)) = self.position_mut(id) {
                    if index > 0 {
                        siblings.swap(index - 1, index);
                    }
                }
            }
            TreeOperation::MoveDown(id) => {
                if let Some((siblings, index)) = self.position_mut(id) {
                    if index + 1 < siblings.len() {
                        siblings.swap(index, index + 1);
                    }
                }
            }
            TreeOperation::Exchange(a, b) => {
                let Some(&parent) = self.parents.get(&a) else {
                    return;
                };
                if let Some(siblings) = self.children.get_mut(&parent) {
                    let first = siblings.iter().position(|&sibling| sibling == a);
                    let second = siblings.iter().position(|&sibling| sibling == b);
                    if let (Some(first), Some(second)) = (first, second) {
                        siblings.swap(first, second);
                    }
                }
            }
        }
    }

    /// Place `id` last among the children of `parent`.
    fn attach(&mut self, id: RecordId, parent: Option<RecordId>) {
        self.parents.insert(id, parent);
        self.children.entry(parent).or_default().push(id);
    }

    /// Take `id` out of its parent's child list, keeping its parent link.
    fn detach(&mut self, id: RecordId) {
        let Some(&parent) = self.parents.get(&id) else {
            return;
        };
        if let Some(siblings) = self.children.get_mut(&parent) {
            siblings.retain(|&sibling| sibling != id);
            if siblings.is_empty() {
                self.children.remove(&parent);
            }
        }
    }

    /// Drop `id` and its child list. Its parent's list is left alone.
    fn forget(&mut self, id: RecordId) {
        self.parents.remove(&id);
        self.children.remove(&Some(id));
    }

    fn position_mut(&mut self, id: RecordId) -> Option<(&mut Vec<RecordId>, usize)> {
        let parent = *self.parents.get(&id)?;
        let siblings = self.children.get_mut(&parent)?;
        let index = siblings.iter().position(|&sibling| sibling == id)?;
        Some((siblings, index))
    }

    fn descendants(&self, id: RecordId) -> Vec<RecordId> {
        self.parents
            .keys()
            .copied()
            .filter(|&candidate| self.is_ancestor(id, candidate))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1 -> 2 -> 3, 1 -> 4, 5
    fn model() -> TreeModel {
        let mut model = TreeModel::new();
        model.apply(&TreeOperation::SetAsRoot(1));
        model.apply(&TreeOperation::AddChild {
            parent: 1,
            child: 2,
        });
        model.apply(&TreeOperation::AddChild {
            parent: 2,
            child: 3,
        });
        model.apply(&TreeOperation::AddChild {
            parent: 1,
            child: 4,
        });
        model.apply(&TreeOperation::SetAsRoot(5));
        model
    }

    #[test]
    fn test_ancestry() {
        let model = model();
        assert!(model.is_ancestor(1, 3));
        assert!(model.is_ancestor(2, 3));
        assert!(!model.is_ancestor(3, 1));
        assert!(!model.is_ancestor(4, 3));
        assert!(!model.is_ancestor(3, 3));
    }

    #[test]
    fn test_rejections() {
        let model = model();
        let cycle = TreeOperation::MoveNode { node: 1, parent: 3 };
        let to_self = TreeOperation::MoveNode { node: 2, parent: 2 };
        let fine = TreeOperation::MoveNode { node: 3, parent: 5 };
        assert_eq!(model.rejection(&cycle), Some(ExpectedRejection::Cycle));
        assert_eq!(model.rejection(&to_self), Some(ExpectedRejection::Cycle));
        assert_eq!(model.rejection(&fine), None);

        assert_eq!(model.rejection(&TreeOperation::Exchange(2, 4)), None);
        assert_eq!(model.rejection(&TreeOperation::Exchange(1, 5)), None);
        assert_eq!(
            model.rejection(&TreeOperation::Exchange(2, 3)),
            Some(ExpectedRejection::NotSiblings)
        );
        assert_eq!(
            model.rejection(&TreeOperation::Exchange(4, 4)),
            Some(ExpectedRejection::NotSiblings)
        );
    }

    #[test]
    fn test_removals() {
        let mut model = model();
        model.apply(&TreeOperation::RemoveChildren(2));
        assert_eq!(model.live_ids(), vec![1, 2, 4, 5]);
        assert_eq!(model.children().get(&Some(2)), None);

        model.apply(&TreeOperation::Remove(1));
        assert_eq!(model.live_ids(), vec![5]);
        assert!(!model.contains(2));
        assert_eq!(model.children(), &BTreeMap::from([(None, vec![5])]));
    }

    #[test]
    fn test_sibling_order() {
        let mut model = model();
        assert_eq!(model.children().get(&None), Some(&vec![1, 5]));
        assert_eq!(model.children().get(&Some(1)), Some(&vec![2, 4]));

        model.apply(&TreeOperation::MoveUp(4));
        assert_eq!(model.children().get(&Some(1)), Some(&vec![4, 2]));

        // Already first: nothing moves.
        model.apply(&TreeOperation::MoveUp(4));
        assert_eq!(model.children().get(&Some(1)), Some(&vec![4, 2]));

        model.apply(&TreeOperation::MoveDown(1));
        assert_eq!(model.children().get(&None), Some(&vec![5, 1]));

        model.apply(&TreeOperation::Exchange(2, 4));
        assert_eq!(model.children().get(&Some(1)), Some(&vec![2, 4]));

        // Moving under the same parent sends the node to the end.
        model.apply(&TreeOperation::MoveNode { node: 2, parent: 1 });
        assert_eq!(model.children().get(&Some(1)), Some(&vec![4, 2]));

        model.apply(&TreeOperation::MoveNode { node: 3, parent: 5 });
        assert_eq!(model.children().get(&Some(2)), None);
        assert_eq!(model.children().get(&Some(5)), Some(&vec![3]));

        // A root stays put, a child becomes the last root.
        model.apply(&TreeOperation::SetAsRoot(5));
        assert_eq!(model.children().get(&None), Some(&vec![5, 1]));
        model.apply(&TreeOperation::SetAsRoot(4));
        assert_eq!(model.children().get(&None), Some(&vec![5, 1, 4]));
        assert_eq!(model.children().get(&Some(1)), Some(&vec![2]));
        assert_eq!(model.parents().get(&4), Some(&None));
    }
}
