// Life of a structural edit:
// 1. Caller picks a TreeScope (store predicate + config)
// 2. BoundsMutator opens a transaction on the store
// 3. Bounds are read and validated through BoundsReader
// 4. Shift deltas and expected row counts are planned
// 5. Shifts are issued; any error or count mismatch rolls back
//
// Reads (TreeQuery, TreeBuilder) issue range selects directly and never
// lock anything.

pub mod config;
pub mod error;
pub mod simulation;
pub mod store;
pub mod tree;
pub mod types;

mod e2e_tests;
#[cfg(test)]
mod testing;

pub use config::{ConfigError, TreeConfig};
pub use error::TreeError;
pub use store::{MemoryStore, RecordStore, StoreError, TransactionScope};
pub use tree::{BoundsMutator, BoundsReader, ExchangeStrategy, TreeBuilder, TreeQuery, TreeScope};
pub use types::{Bounds, Extent, Node, PreOrder, TreeNode};
