//! Bound maintenance for structural edits.
//!
//! Every public operation runs inside one [`Transaction`]: it reads the
//! bounds it needs, plans the shifts, counts how many rows each shift should
//! touch, then issues the writes. Any error (including a store reporting a
//! different affected-row count than planned) rolls the whole batch back.
//!
//! # Shift rules
//!
//! With the new parent's right bound `pr` read before any write:
//!
//! - `add_child`: `left > pr` gets +2, `right >= pr` gets +2, the child
//!   takes `(pr, pr + 1)`.
//! - `move_node`: outside the moved subtree, `left > pr` and `right >= pr`
//!   get +span; the subtree moves to start at `pr`.
//! - `set_as_root`: the subtree moves past the scope's largest right bound.
//!
//! Removals and relocations leave holes in the number line. Holes are never
//! reclaimed; they do not affect containment.

use crate::error::TreeError;
use crate::store::{Filter, RecordStore, Shift, Transaction, TransactionScope};
use crate::types::{Bounds, Node};

use super::TreeScope;
use super::query::TreeQuery;
use super::reader::BoundsReader;

/// How a sibling exchange was carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeStrategy {
    /// Both nodes were leaves of equal span; their bound pairs were swapped.
    SwapPairs,
    /// Both subtrees were relocated as blocks, together with every node
    /// between them.
    RelocateBlocks,
}

/// Structural edits within one scope.
#[derive(Debug)]
pub struct BoundsMutator<'a, S: RecordStore + TransactionScope> {
    store: &'a mut S,
    scope: &'a TreeScope<S::Scope>,
}

impl<'a, S: RecordStore + TransactionScope> BoundsMutator<'a, S> {
    /// Create a mutator.
    pub const fn new(store: &'a mut S, scope: &'a TreeScope<S::Scope>) -> Self {
        Self { store, scope }
    }

    /// Make `id` a root, appended after every existing root.
    ///
    /// An unplaced node gets fresh leaf bounds past the scope's extent (or at
    /// the configured floor in an empty scope). A placed node that is not a
    /// root moves with its whole subtree. A root stays where it is.
    ///
    /// Returns the node's bounds afterwards.
    pub fn set_as_root(&mut self, id: &S::Id) -> Result<Bounds, TreeError> {
        self.atomically("set_as_root", |txn, scope| {
            let reader = BoundsReader::new(&**txn, scope);
            let extent = reader.scope_extent()?;

            if !reader.is_persisted(id)? {
                let bounds =
                    Bounds::leaf(extent.map_or(scope.config().min_left, |e| e.next_free()));
                txn.assign(scope.predicate(), id, bounds.left(), bounds.right())?;
                return Ok(bounds);
            }

            let bounds = reader.bounds_of(id)?;
            if TreeQuery::new(&**txn, scope).is_root(id)? {
                return Ok(bounds);
            }
            let extent = extent.ok_or_else(|| TreeError::not_persisted(id))?;

            let delta = extent.max_right - bounds.left() + 1;
            let subtree = Filter::closed_subtree(&bounds);
            let expected = reader.count(&subtree)?;
            tracing::debug!(
                "set_as_root {id:?}: moving {expected} nodes from {bounds} by {delta}"
            );

            shift_checked(txn, scope, "set_as_root subtree", &subtree, Shift::both(delta), expected)?;
            Ok(bounds.shifted(delta))
        })
    }

    /// Place the unplaced node `child` as the last child of `parent`.
    ///
    /// Returns the child's bounds.
    pub fn add_child(&mut self, parent: &S::Id, child: &S::Id) -> Result<Bounds, TreeError> {
        self.atomically("add_child", |txn, scope| {
            let reader = BoundsReader::new(&**txn, scope);
            if reader.is_persisted(child)? {
                return Err(TreeError::AlreadyPersisted {
                    node: format!("{child:?}"),
                });
            }
            let pr = reader.bounds_of(parent)?.right();

            let after_left = Filter::all().left_gt(pr);
            let after_right = Filter::all().right_ge(pr);
            let expected_left = reader.count(&after_left)?;
            let expected_right = reader.count(&after_right)?;
            tracing::debug!(
                "add_child {child:?} under {parent:?}: opening slot at {pr} \
                 ({expected_left} lefts, {expected_right} rights)"
            );

            let lefts = txn.shift(scope.predicate(), &after_left, Shift::left(2))?;
            let rights = txn.shift(scope.predicate(), &after_right, Shift::right(2))?;
            if lefts + rights == 0 {
                return Err(TreeError::NoSpace {
                    parent: format!("{parent:?}"),
                });
            }
            expect_rows("add_child left shift", expected_left, lefts)?;
            expect_rows("add_child right shift", expected_right, rights)?;

            let bounds = Bounds::leaf(pr);
            txn.assign(scope.predicate(), child, bounds.left(), bounds.right())?;
            Ok(bounds)
        })
    }

    /// Delete `id` and its whole subtree. Returns the number of records deleted.
    pub fn remove(&mut self, id: &S::Id) -> Result<usize, TreeError> {
        self.atomically("remove", |txn, scope| {
            let reader = BoundsReader::new(&**txn, scope);
            let bounds = reader.bounds_of(id)?;
            let ids = reader.select_ids(&Filter::closed_subtree(&bounds))?;
            delete_checked(txn, scope, "remove", &ids)
        })
    }

    /// Delete everything below `id`, keeping `id`. Returns the number deleted.
    pub fn remove_children(&mut self, id: &S::Id) -> Result<usize, TreeError> {
        self.atomically("remove_children", |txn, scope| {
            let reader = BoundsReader::new(&**txn, scope);
            let bounds = reader.bounds_of(id)?;
            let ids = reader.select_ids(&Filter::descendants_of(&bounds))?;
            delete_checked(txn, scope, "remove_children", &ids)
        })
    }

    /// Move `id` and its subtree to become the last child of `new_parent`.
    ///
    /// Returns the node's bounds afterwards.
    ///
    /// # Errors
    ///
    /// `CycleRejected` if `new_parent` is `id` or lies inside it; nothing is
    /// written in that case.
    pub fn move_node(&mut self, id: &S::Id, new_parent: &S::Id) -> Result<Bounds, TreeError> {
        self.atomically("move_node", |txn, scope| {
            let reader = BoundsReader::new(&**txn, scope);
            let bounds = reader.bounds_of(id)?;
            let parent = reader.bounds_of(new_parent)?;
            if id == new_parent || bounds.contains(&parent) {
                return Err(TreeError::CycleRejected {
                    node: format!("{id:?}"),
                    target: format!("{new_parent:?}"),
                });
            }

            let span = bounds.span();
            let pr = parent.right();
            let offset = bounds.left() - pr;

            let subtree = reader.select_ids(&Filter::closed_subtree(&bounds))?;
            let after_left = Filter::all().left_gt(pr).excluding(subtree.clone());
            let after_right = Filter::all().right_ge(pr).excluding(subtree.clone());
            let moving = Filter::all().only(subtree);
            let expected_left = reader.count(&after_left)?;
            let expected_right = reader.count(&after_right)?;
            let expected_moving = reader.count(&moving)?;
            tracing::debug!(
                "move_node {id:?} under {new_parent:?}: span {span}, offset {offset}, \
                 {expected_left} lefts and {expected_right} rights after {pr}, \
                 {expected_moving} moving"
            );

            shift_checked(txn, scope, "move_node left shift", &after_left, Shift::left(span), expected_left)?;
            shift_checked(txn, scope, "move_node right shift", &after_right, Shift::right(span), expected_right)?;
            shift_checked(txn, scope, "move_node subtree", &moving, Shift::both(-offset), expected_moving)?;
            Ok(bounds.shifted(-offset))
        })
    }

    /// Swap the positions of two siblings, carrying their subtrees along.
    ///
    /// Two leaves of equal span swap bound pairs directly. Any other pair is
    /// relocated as blocks so that descendants stay with their parent.
    ///
    /// # Errors
    ///
    /// `NotSiblings` if the nodes have different direct parents.
    pub fn exchange_sibling_bounds(
        &mut self,
        a: &S::Id,
        b: &S::Id,
    ) -> Result<ExchangeStrategy, TreeError> {
        self.atomically("exchange_sibling_bounds", |txn, scope| {
            let query = TreeQuery::new(&**txn, scope);
            let first = query.reader().node(a)?;
            let second = query.reader().node(b)?;
            let parent_of_first = query.direct_parent(a)?.map(|p| p.id);
            let parent_of_second = query.direct_parent(b)?.map(|p| p.id);
            if a == b || parent_of_first != parent_of_second {
                return Err(TreeError::NotSiblings {
                    first: format!("{a:?}"),
                    second: format!("{b:?}"),
                });
            }
            exchange(txn, scope, first, second)
        })
    }

    /// Swap `id` with the sibling just before it.
    ///
    /// Returns `false` if `id` is already first among its siblings.
    pub fn move_up(&mut self, id: &S::Id) -> Result<bool, TreeError> {
        self.atomically("move_up", |txn, scope| {
            let query = TreeQuery::new(&**txn, scope);
            let node = query.reader().node(id)?;
            let previous = query
                .siblings(id)?
                .into_iter()
                .rfind(|sibling| sibling.bounds.left() < node.bounds.left());
            match previous {
                Some(previous) => exchange(txn, scope, node, previous).map(|_| true),
                None => Ok(false),
            }
        })
    }

    /// Swap `id` with the sibling just after it.
    ///
    /// Returns `false` if `id` is already last among its siblings.
    pub fn move_down(&mut self, id: &S::Id) -> Result<bool, TreeError> {
        self.atomically("move_down", |txn, scope| {
            let query = TreeQuery::new(&**txn, scope);
            let node = query.reader().node(id)?;
            let next = query
                .siblings(id)?
                .into_iter()
                .find(|sibling| sibling.bounds.left() > node.bounds.left());
            match next {
                Some(next) => exchange(txn, scope, node, next).map(|_| true),
                None => Ok(false),
            }
        })
    }

    /// Run `apply` in a transaction, committing on success and rolling back
    /// on any error.
    fn atomically<T>(
        &mut self,
        operation: &'static str,
        apply: impl FnOnce(&mut Transaction<'_, S>, &TreeScope<S::Scope>) -> Result<T, TreeError>,
    ) -> Result<T, TreeError> {
        let scope = self.scope;
        let mut txn = Transaction::begin(&mut *self.store)?;
        match apply(&mut txn, scope) {
            Ok(value) => {
                txn.commit()?;
                tracing::debug!("{operation} committed in scope {:?}", scope.predicate());
                Ok(value)
            }
            Err(e) => {
                tracing::warn!("{operation} rolled back in scope {:?}: {e}", scope.predicate());
                txn.rollback()?;
                Err(e)
            }
        }
    }
}

/// Swap two siblings' positions inside an open transaction.
fn exchange<S: RecordStore + TransactionScope>(
    txn: &mut Transaction<'_, S>,
    scope: &TreeScope<S::Scope>,
    a: Node<S::Id>,
    b: Node<S::Id>,
) -> Result<ExchangeStrategy, TreeError> {
    let (first, second) = if a.bounds.left() < b.bounds.left() {
        (a, b)
    } else {
        (b, a)
    };
    let (fb, sb) = (first.bounds, second.bounds);

    if fb.span() == 2 && sb.span() == 2 {
        tracing::debug!("swapping leaf pairs {:?} {fb} and {:?} {sb}", first.id, second.id);
        txn.assign(scope.predicate(), &first.id, sb.left(), sb.right())?;
        txn.assign(scope.predicate(), &second.id, fb.left(), fb.right())?;
        return Ok(ExchangeStrategy::SwapPairs);
    }

    // [first][gap][second] becomes [second][gap][first].
    let reader = BoundsReader::new(&**txn, scope);
    let first_block = reader.select_ids(&Filter::closed_subtree(&fb))?;
    let second_block = reader.select_ids(&Filter::closed_subtree(&sb))?;
    let gap = reader.select_ids(&Filter::all().left_gt(fb.right()).right_lt(sb.left()))?;
    tracing::debug!(
        "relocating blocks {:?} {fb} ({} nodes) and {:?} {sb} ({} nodes) across {} nodes",
        first.id,
        first_block.len(),
        second.id,
        second_block.len(),
        gap.len()
    );

    let blocks = [
        ("exchange first block", first_block, sb.right() - fb.right()),
        ("exchange second block", second_block, fb.left() - sb.left()),
        ("exchange gap", gap, sb.span() - fb.span()),
    ];
    for (step, ids, delta) in blocks {
        let expected = ids.len();
        shift_checked(txn, scope, step, &Filter::all().only(ids), Shift::both(delta), expected)?;
    }
    Ok(ExchangeStrategy::RelocateBlocks)
}

/// Issue a shift and verify its affected-row count.
///
/// A shift that changes nothing or targets nothing is skipped, so stores that
/// count only changed rows never see a no-op update.
fn shift_checked<S: RecordStore + TransactionScope>(
    txn: &mut Transaction<'_, S>,
    scope: &TreeScope<S::Scope>,
    step: &'static str,
    filter: &Filter<S::Id>,
    shift: Shift,
    expected: usize,
) -> Result<(), TreeError> {
    if shift.is_noop() || expected == 0 {
        return Ok(());
    }
    let actual = txn.shift(scope.predicate(), filter, shift)?;
    expect_rows(step, expected, actual)
}

fn delete_checked<S: RecordStore + TransactionScope>(
    txn: &mut Transaction<'_, S>,
    scope: &TreeScope<S::Scope>,
    step: &'static str,
    ids: &[S::Id],
) -> Result<usize, TreeError> {
    if ids.is_empty() {
        return Ok(0);
    }
    let deleted = txn.delete(scope.predicate(), ids)?;
    expect_rows(step, ids.len(), deleted)?;
    Ok(deleted)
}

const fn expect_rows(step: &'static str, expected: usize, actual: usize) -> Result<(), TreeError> {
    if expected == actual {
        Ok(())
    } else {
        Err(TreeError::ConsistencyMismatch {
            step,
            expected,
            actual,
        })
    }
}
