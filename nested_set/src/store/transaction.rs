//! RAII transaction guard over a [`TransactionScope`].
//!
//! A `Transaction` derefs to the store it wraps, so reads and writes issued
//! through it land inside the open batch. It must end in [`Transaction::commit`]
//! or [`Transaction::rollback`]; if it is dropped without either (an early
//! return, a panic unwinding through it) it rolls back.

use std::ops::{Deref, DerefMut};

use super::{StoreError, TransactionScope};

/// An open transaction on a store.
pub struct Transaction<'a, S: TransactionScope> {
    store: &'a mut S,
    finished: bool,
}

impl<'a, S: TransactionScope> Transaction<'a, S> {
    /// Begin a new transaction.
    pub fn begin(store: &'a mut S) -> Result<Self, StoreError> {
        store.begin()?;
        Ok(Self {
            store,
            finished: false,
        })
    }

    /// Commit the transaction.
    ///
    /// If the store fails to commit, the guard is dropped unfinished and
    /// rolls back.
    pub fn commit(mut self) -> Result<(), StoreError> {
        self.store.commit()?;
        self.finished = true;
        Ok(())
    }

    /// Roll the transaction back.
    pub fn rollback(mut self) -> Result<(), StoreError> {
        self.finished = true;
        self.store.rollback()
    }
}

impl<S: TransactionScope> Deref for Transaction<'_, S> {
    type Target = S;

    fn deref(&self) -> &S {
        self.store
    }
}

impl<S: TransactionScope> DerefMut for Transaction<'_, S> {
    fn deref_mut(&mut self) -> &mut S {
        self.store
    }
}

impl<S: TransactionScope> Drop for Transaction<'_, S> {
    fn drop(&mut self) {
        if !self.finished {
            if let Err(e) = self.store.rollback() {
                tracing::warn!("rollback of abandoned transaction failed: {e}");
            }
        }
    }
}
