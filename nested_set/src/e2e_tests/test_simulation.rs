//! Run seeded simulations over the full mutator surface.

use crate::simulation::{Simulator, SimulatorConfig};
use crate::testing::init_tracing;

#[test]
fn test_simulation_seeds() {
    init_tracing();
    for seed in [1, 2, 3, 17, 4096] {
        let mut simulator = Simulator::new(SimulatorConfig::new(seed));
        let result = simulator.run(150);
        assert!(
            result.passed(),
            "seed {seed}: {:?} {:?}",
            result.error,
            result.invariant_violations
        );
        assert!(result.rejected_operations + result.successful_operations == 150);
    }
}

#[test]
fn test_simulation_with_write_faults() {
    init_tracing();
    for seed in [5, 6, 7] {
        let config = SimulatorConfig::new(seed).with_write_error_rate(0.1);
        let mut simulator = Simulator::new(config);
        let result = simulator.run(200);
        assert!(
            result.passed(),
            "seed {seed}: {:?} {:?}",
            result.error,
            result.invariant_violations
        );
    }
}

#[test]
fn test_simulation_append_only() {
    let mut simulator = Simulator::new(SimulatorConfig::new(8).append_only());
    let result = simulator.run(50);
    assert!(result.passed(), "{:?}", result.invariant_violations);
    assert_eq!(result.rejected_operations, 0);
}
