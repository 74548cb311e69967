//! Structural questions answered from interval comparisons alone.
//!
//! Each query is one or two range selects; nothing here recurses.

use crate::error::TreeError;
use crate::store::{Filter, Order, RecordStore};
use crate::types::Node;

use super::TreeScope;
use super::reader::BoundsReader;

/// Read-only structural queries within one scope.
#[derive(Debug)]
pub struct TreeQuery<'a, S: RecordStore> {
    reader: BoundsReader<'a, S>,
}

impl<'a, S: RecordStore> TreeQuery<'a, S> {
    /// Create a query handle.
    pub const fn new(store: &'a S, scope: &'a TreeScope<S::Scope>) -> Self {
        Self {
            reader: BoundsReader::new(store, scope),
        }
    }

    /// The underlying bounds reader.
    #[must_use]
    pub const fn reader(&self) -> BoundsReader<'a, S> {
        self.reader
    }

    /// The nearest node strictly containing `id`, or `None` for a root.
    pub fn direct_parent(&self, id: &S::Id) -> Result<Option<Node<S::Id>>, TreeError> {
        let bounds = self.reader.bounds_of(id)?;
        let mut enclosing =
            self.reader
                .select(&Filter::ancestors_of(&bounds), Order::LeftDesc, Some(1))?;
        Ok(enclosing.pop())
    }

    /// Whether no node contains `id`.
    pub fn is_root(&self, id: &S::Id) -> Result<bool, TreeError> {
        let bounds = self.reader.bounds_of(id)?;
        Ok(self.reader.count(&Filter::ancestors_of(&bounds))? == 0)
    }

    /// Nodes directly under `id`, ascending by left bound.
    pub fn direct_children(&self, id: &S::Id) -> Result<Vec<Node<S::Id>>, TreeError> {
        let bounds = self.reader.bounds_of(id)?;
        let inside = self
            .reader
            .select(&Filter::descendants_of(&bounds), Order::LeftAsc, None)?;
        outermost(inside)
    }

    /// Nodes sharing `id`'s direct parent (or all other roots), ascending by
    /// left bound, without `id` itself.
    pub fn siblings(&self, id: &S::Id) -> Result<Vec<Node<S::Id>>, TreeError> {
        let mut nodes = match self.direct_parent(id)? {
            Some(parent) => self.direct_children(&parent.id)?,
            None => self.top_nodes()?,
        };
        nodes.retain(|node| &node.id != id);
        Ok(nodes)
    }

    /// Nodes contained by no other node, ascending by left bound.
    pub fn top_nodes(&self) -> Result<Vec<Node<S::Id>>, TreeError> {
        let all = self.reader.select(&Filter::all(), Order::LeftAsc, None)?;
        outermost(all)
    }

    /// Every node containing `id`, root first.
    pub fn ancestors(&self, id: &S::Id) -> Result<Vec<Node<S::Id>>, TreeError> {
        let bounds = self.reader.bounds_of(id)?;
        self.reader
            .select(&Filter::ancestors_of(&bounds), Order::LeftAsc, None)
    }

    /// Every node inside `id`, ascending by left bound (pre-order).
    pub fn descendants(&self, id: &S::Id) -> Result<Vec<Node<S::Id>>, TreeError> {
        let bounds = self.reader.bounds_of(id)?;
        self.reader
            .select(&Filter::descendants_of(&bounds), Order::LeftAsc, None)
    }

    /// Number of ancestors; roots have depth 0.
    pub fn depth(&self, id: &S::Id) -> Result<usize, TreeError> {
        let bounds = self.reader.bounds_of(id)?;
        self.reader.count(&Filter::ancestors_of(&bounds))
    }

    /// Whether `ancestor` strictly contains `node`.
    pub fn is_ancestor_of(&self, ancestor: &S::Id, node: &S::Id) -> Result<bool, TreeError> {
        let outer = self.reader.bounds_of(ancestor)?;
        let inner = self.reader.bounds_of(node)?;
        Ok(outer.contains(&inner))
    }

    /// Whether `node` lies strictly inside `ancestor`.
    pub fn is_descendant_of(&self, node: &S::Id, ancestor: &S::Id) -> Result<bool, TreeError> {
        self.is_ancestor_of(ancestor, node)
    }

    /// Whether `candidate` is the direct parent of `node`.
    pub fn is_direct_parent_of(&self, candidate: &S::Id, node: &S::Id) -> Result<bool, TreeError> {
        Ok(self
            .direct_parent(node)?
            .is_some_and(|parent| &parent.id == candidate))
    }

    /// Number of nodes strictly inside `id`.
    pub fn count_descendants(&self, id: &S::Id) -> Result<usize, TreeError> {
        let bounds = self.reader.bounds_of(id)?;
        self.reader.count(&Filter::descendants_of(&bounds))
    }

    /// Whether `id` has no descendants.
    pub fn is_leaf(&self, id: &S::Id) -> Result<bool, TreeError> {
        Ok(self.count_descendants(id)? == 0)
    }
}

/// Keep the nodes not contained by an earlier node of `sorted`.
///
/// `sorted` must be ascending by left bound. Within a properly nested set,
/// a node is either past the last kept interval or inside it; anything
/// crossing its right bound is reported as an overlap.
fn outermost<Id: std::fmt::Debug>(sorted: Vec<Node<Id>>) -> Result<Vec<Node<Id>>, TreeError> {
    let mut kept: Vec<Node<Id>> = Vec::new();
    for node in sorted {
        if let Some(last) = kept.last() {
            if last.bounds.overlaps(&node.bounds) {
                return Err(TreeError::Overlap {
                    first: format!("{:?}", last.id),
                    second: format!("{:?}", node.id),
                });
            }
            if last.bounds.encloses(&node.bounds) {
                continue;
            }
        }
        kept.push(node);
    }
    Ok(kept)
}
