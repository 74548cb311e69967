use std::sync::atomic::{AtomicU64, Ordering};

use tracing_subscriber::EnvFilter;

use crate::store::MemoryStore;

static TEST_STORE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Install a test-writer `fmt` subscriber once per test binary.
///
/// Honors `RUST_LOG`, defaulting to debug output for this crate. Later calls
/// are no-ops.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nested_set=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Create a new in-memory store with a seed unique to this test run.
///
/// Seeds only matter for stores with fault injection enabled.
pub fn new_test_store() -> MemoryStore {
    init_tracing();
    let seed = TEST_STORE_COUNTER.fetch_add(1, Ordering::SeqCst);
    MemoryStore::new(seed)
}
