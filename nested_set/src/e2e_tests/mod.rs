//! End-to-end tests over the in-memory store.
//!
//! Each test file covers a specific scenario, building trees through the
//! public mutators and checking bounds, structure and invariants.

#![cfg(test)]

mod helpers;

mod test_add_child;
mod test_consistency_mismatch;
mod test_full_tree;
mod test_move_node;
mod test_move_up_down;
mod test_queries;
mod test_remove;
mod test_rollback;
mod test_round_trip;
mod test_scopes;
mod test_set_as_root;
mod test_simulation;
mod test_size_law;
