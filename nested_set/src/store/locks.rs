//! Per-scope mutual exclusion for stores with weak isolation.
//!
//! Stores that give each batch serializable isolation do not need this. For
//! anything weaker, two mutators on the same scope must not interleave their
//! shift writes, so callers take the scope's lock around each mutator call.
//!
//! # Usage
//!
//! ```
//! use nested_set::store::ScopeLocks;
//!
//! let locks: ScopeLocks<String> = ScopeLocks::new();
//! let lock = locks.lock_for(&"categories".to_string()).expect("registry lock");
//! let _guard = lock.lock().expect("scope lock");
//! // ... run one mutator operation ...
//! ```

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, RwLock};

use super::StoreError;

/// Registry of one lock per scope key, created on demand.
#[derive(Debug)]
pub struct ScopeLocks<K> {
    locks: RwLock<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K> Default for ScopeLocks<K> {
    fn default() -> Self {
        Self {
            locks: RwLock::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone> ScopeLocks<K> {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the lock for `scope`.
    ///
    /// Every caller asking for the same key gets the same lock.
    #[allow(clippy::disallowed_methods)] // Arc::clone is safe and expected
    #[allow(clippy::significant_drop_tightening)] // the write lock must be held across the insert
    pub fn lock_for(&self, scope: &K) -> Result<Arc<Mutex<()>>, StoreError> {
        {
            let locks = self.locks.read().map_err(|_| StoreError::LockPoisoned)?;
            if let Some(lock) = locks.get(scope) {
                return Ok(Arc::clone(lock));
            }
        }

        let mut locks = self.locks.write().map_err(|_| StoreError::LockPoisoned)?;

        // Another thread may have inserted it while we waited for the write lock
        if let Some(lock) = locks.get(scope) {
            return Ok(Arc::clone(lock));
        }

        let lock = Arc::new(Mutex::new(()));
        locks.insert(scope.clone(), Arc::clone(&lock));
        tracing::debug!("created scope lock ({} scopes tracked)", locks.len());
        Ok(lock)
    }

    /// Number of scopes with a lock.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.locks.read().map_err(|_| StoreError::LockPoisoned)?.len())
    }

    /// Whether no scope has a lock yet.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_same_scope_same_lock() {
        let locks: ScopeLocks<&str> = ScopeLocks::new();
        let a = locks.lock_for(&"a").expect("lock a");
        let again = locks.lock_for(&"a").expect("lock a again");
        let b = locks.lock_for(&"b").expect("lock b");

        assert!(Arc::ptr_eq(&a, &again));
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(locks.len().expect("len"), 2);
    }

    #[test]
    fn test_concurrent_lookup_converges() {
        let locks: Arc<ScopeLocks<u32>> = Arc::new(ScopeLocks::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let locks = Arc::clone(&locks);
                thread::spawn(move || locks.lock_for(&7).expect("lock"))
            })
            .collect();

        let acquired: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("thread join"))
            .collect();

        assert!(acquired.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(locks.len().expect("len"), 1);
    }
}
