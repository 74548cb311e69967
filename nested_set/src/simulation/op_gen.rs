//! Operation generator for deterministic simulation testing.
//!
//! Produces random but reproducible sequences of structural edits against a
//! pool of live node ids. Some generated operations are invalid on purpose
//! (moving a node under its own descendant, exchanging non-siblings) so the
//! rejection paths get exercised too.

// Simulation code legitimately needs cloning for test data
#![allow(clippy::disallowed_methods)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::store::memory::RecordId;

/// Configuration for operation generation.
#[derive(Debug, Clone)]
pub struct OperationGenConfig {
    /// Probability of inserting a new node rather than editing existing ones.
    pub insert_rate: f64,
    /// Probability that an insert creates a root instead of a child.
    pub root_rate: f64,
    /// Probability that a structural edit is a removal.
    pub remove_rate: f64,
    /// Soft cap on live nodes; above it no inserts are generated.
    pub max_live_nodes: usize,
}

impl Default for OperationGenConfig {
    fn default() -> Self {
        Self {
            insert_rate: 0.5,
            root_rate: 0.15,
            remove_rate: 0.1,
            max_live_nodes: 64,
        }
    }
}

impl OperationGenConfig {
    /// Only inserts; the scope never gets holes.
    #[must_use]
    pub fn append_only() -> Self {
        Self {
            insert_rate: 1.0,
            ..Self::default()
        }
    }
}

/// One structural edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeOperation {
    /// Make a node a root (new or existing).
    SetAsRoot(RecordId),
    /// Place a new node under a parent.
    AddChild {
        /// Existing parent.
        parent: RecordId,
        /// Node being placed.
        child: RecordId,
    },
    /// Delete a node and its subtree.
    Remove(RecordId),
    /// Delete a node's descendants.
    RemoveChildren(RecordId),
    /// Re-parent a node with its subtree.
    MoveNode {
        /// Node being moved.
        node: RecordId,
        /// New parent.
        parent: RecordId,
    },
    /// Swap a node with its previous sibling.
    MoveUp(RecordId),
    /// Swap a node with its next sibling.
    MoveDown(RecordId),
    /// Swap two nodes that may or may not be siblings.
    Exchange(RecordId, RecordId),
}

/// Generator for random [`TreeOperation`]s.
///
/// Given the same seed and the same sequence of live-id pools, it produces
/// the same operations.
pub struct OperationGenerator {
    rng: StdRng,
    config: OperationGenConfig,
    next_id: RecordId,
}

impl OperationGenerator {
    /// Create a new generator with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, OperationGenConfig::default())
    }

    /// Create a new generator with custom configuration.
    #[must_use]
    pub fn with_config(seed: u64, config: OperationGenConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            config,
            next_id: 1,
        }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &OperationGenConfig {
        &self.config
    }

    /// Generate the next operation given the currently live ids.
    pub fn next_operation(&mut self, live: &[RecordId]) -> TreeOperation {
        if live.is_empty() {
            return TreeOperation::SetAsRoot(self.fresh_id());
        }

        let room = live.len() < self.config.max_live_nodes;
        if room && self.rng.random::<f64>() < self.config.insert_rate {
            let id = self.fresh_id();
            if self.rng.random::<f64>() < self.config.root_rate {
                return TreeOperation::SetAsRoot(id);
            }
            return TreeOperation::AddChild {
                parent: self.pick(live),
                child: id,
            };
        }

        if self.rng.random::<f64>() < self.config.remove_rate {
            let id = self.pick(live);
            return if self.rng.random_bool(0.5) {
                TreeOperation::Remove(id)
            } else {
                TreeOperation::RemoveChildren(id)
            };
        }

        let id = self.pick(live);
        match self.rng.random_range(0..5) {
            0 => TreeOperation::MoveNode {
                node: id,
                parent: self.pick(live),
            },
            1 => TreeOperation::MoveUp(id),
            2 => TreeOperation::MoveDown(id),
            3 => TreeOperation::Exchange(id, self.pick(live)),
            _ => TreeOperation::SetAsRoot(id),
        }
    }

    /// Generate `count` operations against a fixed pool, for inspection.
    pub fn generate_batch(&mut self, live: &[RecordId], count: usize) -> Vec<TreeOperation> {
        (0..count).map(|_| self.next_operation(live)).collect()
    }

    fn fresh_id(&mut self) -> RecordId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn pick(&mut self, live: &[RecordId]) -> RecordId {
        live[self.rng.random_range(0..live.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_operation_creates_a_root() {
        let mut generator = OperationGenerator::new(7);
        assert_eq!(generator.next_operation(&[]), TreeOperation::SetAsRoot(1));
        assert_eq!(generator.next_operation(&[]), TreeOperation::SetAsRoot(2));
    }

    #[test]
    fn test_generator_deterministic() {
        let live = [1, 2, 3, 4, 5];
        let mut gen1 = OperationGenerator::new(12345);
        let mut gen2 = OperationGenerator::new(12345);
        assert_eq!(
            gen1.generate_batch(&live, 50),
            gen2.generate_batch(&live, 50)
        );
    }

    #[test]
    fn test_operations_reference_live_ids() {
        // Far above any id the generator hands out in 200 steps.
        let live = [1000, 2000, 3000];
        let mut generator = OperationGenerator::new(99);
        for op in generator.generate_batch(&live, 200) {
            match op {
                TreeOperation::AddChild { parent, child } => {
                    assert!(live.contains(&parent));
                    assert!(!live.contains(&child));
                }
                TreeOperation::MoveNode { node, parent } => {
                    assert!(live.contains(&node));
                    assert!(live.contains(&parent));
                }
                TreeOperation::Exchange(a, b) => {
                    assert!(live.contains(&a));
                    assert!(live.contains(&b));
                }
                TreeOperation::Remove(id)
                | TreeOperation::RemoveChildren(id)
                | TreeOperation::MoveUp(id)
                | TreeOperation::MoveDown(id) => assert!(live.contains(&id)),
                // Either a fresh id or an existing node being promoted.
                TreeOperation::SetAsRoot(_) => {}
            }
        }
    }

    #[test]
    fn test_append_only_never_edits() {
        let mut generator = OperationGenerator::with_config(3, OperationGenConfig::append_only());
        let live = [1, 2];
        for op in generator.generate_batch(&live, 100) {
            match op {
                TreeOperation::SetAsRoot(_) | TreeOperation::AddChild { .. } => {}
                other => panic!("unexpected edit {other:?}"),
            }
        }
    }

    #[test]
    fn test_full_pool_stops_inserting() {
        let config = OperationGenConfig {
            insert_rate: 1.0,
            max_live_nodes: 3,
            ..OperationGenConfig::default()
        };
        let mut generator = OperationGenerator::with_config(5, config);
        let live = [1, 2, 3];
        assert!(
            generator
                .generate_batch(&live, 50)
                .iter()
                .all(|op| !matches!(op, TreeOperation::AddChild { .. }))
        );
    }
}
