//! Main simulator harness for deterministic simulation testing.
//!
//! Each step generates one operation, applies it to an in-memory store
//! through [`BoundsMutator`](crate::tree::BoundsMutator), and checks the
//! outcome against a [`TreeModel`]:
//!
//! - accepted edits must match the model's prediction, leave every
//!   invariant intact and put each node where the model says among its
//!   siblings
//! - refused or failed edits must leave the scope's bounds byte-for-byte
//!   unchanged

// Simulation code legitimately needs cloning for test data
#![allow(clippy::disallowed_methods)]

use crate::error::TreeError;
use crate::store::memory::{FaultConfig, MemoryStore};
use crate::store::StoreError;
use crate::tree::TreeScope;

use super::invariants::{InvariantChecker, InvariantViolation};
use super::model::{ExpectedRejection, TreeModel};
use super::op_gen::{OperationGenConfig, OperationGenerator, TreeOperation};

/// Scope name used for the simulated tree.
const SIM_SCOPE: &str = "sim";

/// Configuration for the simulator.
#[derive(Debug, Clone)]
pub struct SimulatorConfig {
    /// Random seed for reproducibility.
    pub seed: u64,
    /// Fault injection configuration.
    pub fault_config: FaultConfig,
    /// Operation generation configuration.
    pub op_config: OperationGenConfig,
    /// Also check that spans match descendant counts. Only meaningful for
    /// append-only runs.
    pub check_size_law: bool,
}

impl SimulatorConfig {
    /// Create a new simulator config with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            fault_config: FaultConfig::default(),
            op_config: OperationGenConfig::default(),
            check_size_law: false,
        }
    }

    /// Set the fault configuration.
    #[must_use]
    pub const fn with_fault_config(mut self, config: FaultConfig) -> Self {
        self.fault_config = config;
        self
    }

    /// Set the write error rate.
    #[must_use]
    pub const fn with_write_error_rate(mut self, rate: f64) -> Self {
        self.fault_config.write_error_rate = rate;
        self
    }

    /// Set the operation generation configuration.
    #[must_use]
    pub fn with_op_config(mut self, config: OperationGenConfig) -> Self {
        self.op_config = config;
        self
    }

    /// Only insert nodes, and check the size law after every step.
    #[must_use]
    pub fn append_only(mut self) -> Self {
        self.op_config = OperationGenConfig::append_only();
        self.check_size_law = true;
        self
    }
}

/// Results from a simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The seed used for this simulation.
    pub seed: u64,
    /// Number of operations applied.
    pub operations_applied: u64,
    /// Number of accepted operations.
    pub successful_operations: u64,
    /// Number of operations refused as invalid (cycles, non-siblings).
    pub rejected_operations: u64,
    /// Number of operations aborted by an injected store fault.
    pub failed_operations: u64,
    /// Invariant violations detected.
    pub invariant_violations: Vec<InvariantViolation>,
    /// Error that stopped the run early, if any.
    pub error: Option<String>,
}

impl SimulationResult {
    /// Check if the simulation passed (ran to the end with no violations).
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.error.is_none() && self.invariant_violations.is_empty()
    }
}

/// The main simulator harness.
pub struct Simulator {
    config: SimulatorConfig,
    store: MemoryStore,
    scope: TreeScope<String>,
    generator: OperationGenerator,
    model: TreeModel,
    checker: InvariantChecker,
    operations_applied: u64,
    successful_operations: u64,
    rejected_operations: u64,
    failed_operations: u64,
}

impl Simulator {
    /// Create a new simulator with the given configuration.
    #[must_use]
    pub fn new(config: SimulatorConfig) -> Self {
        let store = MemoryStore::with_config(config.seed, config.fault_config.clone());
        let generator = OperationGenerator::with_config(config.seed, config.op_config.clone());

        Self {
            config,
            store,
            scope: TreeScope::new(SIM_SCOPE.to_string()),
            generator,
            model: TreeModel::new(),
            checker: InvariantChecker::new(),
            operations_applied: 0,
            successful_operations: 0,
            rejected_operations: 0,
            failed_operations: 0,
        }
    }

    /// Run the simulation for a given number of operations.
    pub fn run(&mut self, operation_count: usize) -> SimulationResult {
        for index in 0..operation_count {
            if let Err(e) = self.step(index) {
                tracing::warn!("simulation {} stopped at step {index}: {e}", self.config.seed);
                return self.result(Some(e.to_string()));
            }
        }
        self.result(None)
    }

    /// Apply one generated operation and check its outcome.
    fn step(&mut self, index: usize) -> Result<(), TreeError> {
        let op = self.generator.next_operation(&self.model.live_ids());
        self.operations_applied += 1;

        // New nodes exist as unplaced records before they join the tree.
        if let TreeOperation::SetAsRoot(id) | TreeOperation::AddChild { child: id, .. } = op {
            if !self.model.contains(id) {
                self.store.insert_unassigned(SIM_SCOPE, id);
            }
        }

        let before = self.store.snapshot(SIM_SCOPE);
        let expected = self.model.rejection(&op);
        let outcome = self.apply(&op);
        tracing::debug!("step {index}: {op:?} -> {outcome:?}");

        if self.store.in_transaction() {
            self.violation("transaction left open", index, format!("{op:?}"));
        }

        match (outcome, expected) {
            (Ok(()), None) => {
                self.successful_operations += 1;
                self.model.apply(&op);
            }
            (Ok(()), Some(rejection)) => {
                self.violation(
                    "invalid operation was accepted",
                    index,
                    format!("{op:?} should fail with {rejection:?}"),
                );
                // The store diverged from the model; nothing later is meaningful.
                return Err(TreeError::Store(StoreError::Backend(format!(
                    "model diverged at step {index}"
                ))));
            }
            (Err(e), expected) => {
                match (&e, expected) {
                    (TreeError::CycleRejected { .. }, Some(ExpectedRejection::Cycle))
                    | (TreeError::NotSiblings { .. }, Some(ExpectedRejection::NotSiblings)) => {
                        self.rejected_operations += 1;
                    }
                    (TreeError::Store(StoreError::InjectedFault(_)), _) => {
                        self.failed_operations += 1;
                    }
                    _ => self.violation(
                        "unexpected error",
                        index,
                        format!("{op:?} failed with {e}, expected {expected:?}"),
                    ),
                }
                if self.store.snapshot(SIM_SCOPE) != before {
                    self.violation(
                        "failed operation changed bounds",
                        index,
                        format!("{op:?} failed with {e}"),
                    );
                }
            }
        }

        self.check(index)
    }

    fn apply(&mut self, op: &TreeOperation) -> Result<(), TreeError> {
        let mut mutator = self.scope.mutator(&mut self.store);
        match *op {
            TreeOperation::SetAsRoot(id) => mutator.set_as_root(&id).map(drop),
            TreeOperation::AddChild { parent, child } => {
                mutator.add_child(&parent, &child).map(drop)
            }
            TreeOperation::Remove(id) => mutator.remove(&id).map(drop),
            TreeOperation::RemoveChildren(id) => mutator.remove_children(&id).map(drop),
            TreeOperation::MoveNode { node, parent } => mutator.move_node(&node, &parent).map(drop),
            TreeOperation::MoveUp(id) => mutator.move_up(&id).map(drop),
            TreeOperation::MoveDown(id) => mutator.move_down(&id).map(drop),
            TreeOperation::Exchange(a, b) => mutator.exchange_sibling_bounds(&a, &b).map(drop),
        }
    }

    /// Check every invariant against the store's current state.
    fn check(&mut self, index: usize) -> Result<(), TreeError> {
        // Faults apply to mutations only; checks read a quiet store.
        self.checker.check_scope(&self.store, &self.scope, index)?;
        self.checker
            .check_parents(&self.store, &self.scope, self.model.parents(), index)?;
        self.checker
            .check_child_order(&self.store, &self.scope, self.model.children(), index)?;
        if self.config.check_size_law {
            self.checker.check_size_law(&self.store, &self.scope, index)?;
        }
        Ok(())
    }

    fn violation(&mut self, description: &str, operation_index: usize, context: String) {
        self.checker.add_violation(InvariantViolation {
            description: description.to_string(),
            operation_index,
            context,
        });
    }

    fn result(&self, error: Option<String>) -> SimulationResult {
        SimulationResult {
            seed: self.config.seed,
            operations_applied: self.operations_applied,
            successful_operations: self.successful_operations,
            rejected_operations: self.rejected_operations,
            failed_operations: self.failed_operations,
            invariant_violations: self.checker.violations().to_vec(),
            error,
        }
    }

    /// The store under simulation.
    #[must_use]
    pub const fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// The reference model.
    #[must_use]
    pub const fn model(&self) -> &TreeModel {
        &self.model
    }

    /// The scope the simulation runs in.
    #[must_use]
    pub const fn scope(&self) -> &TreeScope<String> {
        &self.scope
    }

    /// Get the invariant checker.
    #[must_use]
    pub const fn checker(&self) -> &InvariantChecker {
        &self.checker
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulator_basic() {
        let mut simulator = Simulator::new(SimulatorConfig::new(12345));
        let result = simulator.run(100);

        assert!(result.passed(), "violations: {:?}", result.invariant_violations);
        assert_eq!(result.operations_applied, 100);
        assert_eq!(
            result.successful_operations + result.rejected_operations + result.failed_operations,
            100
        );
        assert_eq!(result.failed_operations, 0);
    }

    #[test]
    fn test_simulator_deterministic() {
        let mut sim1 = Simulator::new(SimulatorConfig::new(777));
        let result1 = sim1.run(80);
        let mut sim2 = Simulator::new(SimulatorConfig::new(777));
        let result2 = sim2.run(80);

        assert_eq!(result1.successful_operations, result2.successful_operations);
        assert_eq!(result1.rejected_operations, result2.rejected_operations);
        assert_eq!(
            sim1.store().snapshot(SIM_SCOPE),
            sim2.store().snapshot(SIM_SCOPE)
        );
    }

    #[test]
    fn test_simulator_with_faults() {
        let config = SimulatorConfig::new(4242).with_write_error_rate(0.2);
        let mut simulator = Simulator::new(config);
        let result = simulator.run(150);

        assert!(result.passed(), "violations: {:?}", result.invariant_violations);
        assert!(result.failed_operations > 0);
        assert_eq!(simulator.store().stats().commits, result.successful_operations);
    }

    #[test]
    fn test_simulator_append_only_keeps_size_law() {
        let mut simulator = Simulator::new(SimulatorConfig::new(31337).append_only());
        let result = simulator.run(60);

        assert!(result.passed(), "violations: {:?}", result.invariant_violations);
        assert_eq!(result.successful_operations, 60);
        assert_eq!(simulator.model().live_ids().len(), 60);
    }

    #[test]
    fn test_simulator_tracks_sibling_order() {
        // No removals, few nodes: most steps reorder siblings.
        let config = SimulatorConfig::new(9001).with_op_config(OperationGenConfig {
            insert_rate: 0.3,
            root_rate: 0.3,
            remove_rate: 0.0,
            max_live_nodes: 24,
        });
        let mut simulator = Simulator::new(config);
        let result = simulator.run(200);

        assert!(result.passed(), "violations: {:?}", result.invariant_violations);
        assert!(result.rejected_operations > 0);
        assert!(simulator.model().children().values().any(|list| list.len() > 2));
    }

    #[test]
    #[ignore] // Long running test
    fn test_simulator_stress() {
        for seed in 0..50 {
            let config = SimulatorConfig::new(seed).with_write_error_rate(0.05);
            let mut simulator = Simulator::new(config);
            let result = simulator.run(2_000);
            assert!(result.passed(), "seed {seed}: {:?}", result.invariant_violations);
        }
    }
}
