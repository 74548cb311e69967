//! Deterministic simulation testing for bound maintenance.
//!
//! This module drives random structural edits against the in-memory store
//! and checks the result after every step:
//! - Seeded operation generation (same seed, same run)
//! - Fault injection at the store's write boundary
//! - A parent-link reference model predicting accepted and refused edits
//! - Invariant checking of the raw bounds
//!
//! # Usage
//!
//! ```
//! use nested_set::simulation::{Simulator, SimulatorConfig};
//!
//! let config = SimulatorConfig::new(12345).with_write_error_rate(0.05);
//! let mut sim = Simulator::new(config);
//! let result = sim.run(200);
//!
//! assert!(result.passed(), "{:?}", result.invariant_violations);
//! ```
//!
//! [`InvariantChecker`] is also usable on its own to validate any scope
//! before building trees from it.

mod invariants;
mod model;
mod op_gen;
mod simulator;

pub use invariants::{InvariantChecker, InvariantViolation};
pub use model::{ExpectedRejection, TreeModel};
pub use op_gen::{OperationGenConfig, OperationGenerator, TreeOperation};
pub use simulator::{SimulationResult, Simulator, SimulatorConfig};
