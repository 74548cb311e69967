//! The scope handle passed to every tree operation.

use crate::config::TreeConfig;
use crate::store::{RecordStore, TransactionScope};

use super::builder::TreeBuilder;
use super::mutator::BoundsMutator;
use super::query::TreeQuery;
use super::reader::BoundsReader;

/// One independent tree: the store predicate that selects its records plus
/// the configuration that applies to it.
///
/// Several scopes can share one store. Nothing about a scope is looked up
/// implicitly; the extent is re-read inside each operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeScope<P> {
    predicate: P,
    config: TreeConfig,
}

impl<P> TreeScope<P> {
    /// Create a scope with the default configuration.
    #[must_use]
    pub fn new(predicate: P) -> Self {
        Self::with_config(predicate, TreeConfig::default())
    }

    /// Create a scope with an explicit configuration.
    #[must_use]
    pub const fn with_config(predicate: P, config: TreeConfig) -> Self {
        Self { predicate, config }
    }

    /// The store predicate.
    #[must_use]
    pub const fn predicate(&self) -> &P {
        &self.predicate
    }

    /// The configuration.
    #[must_use]
    pub const fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Bounds reader over `store`.
    pub const fn reader<'a, S>(&'a self, store: &'a S) -> BoundsReader<'a, S>
    where
        S: RecordStore<Scope = P>,
    {
        BoundsReader::new(store, self)
    }

    /// Structural queries over `store`.
    pub const fn query<'a, S>(&'a self, store: &'a S) -> TreeQuery<'a, S>
    where
        S: RecordStore<Scope = P>,
    {
        TreeQuery::new(store, self)
    }

    /// Tree assembly over `store`.
    pub const fn builder<'a, S>(&'a self, store: &'a S) -> TreeBuilder<'a, S>
    where
        S: RecordStore<Scope = P>,
    {
        TreeBuilder::new(store, self)
    }

    /// Structural edits on `store`.
    pub const fn mutator<'a, S>(&'a self, store: &'a mut S) -> BoundsMutator<'a, S>
    where
        S: RecordStore<Scope = P> + TransactionScope,
    {
        BoundsMutator::new(store, self)
    }
}
