//! Nested-set tree operations over a [`RecordStore`](crate::store::RecordStore).
//!
//! Layers, leaf first:
//!
//! - [`BoundsReader`]: validated bound reads and scope extent
//! - [`TreeQuery`]: parent, children, siblings, ancestry and counts
//! - [`TreeBuilder`]: nested trees assembled from one range select
//! - [`BoundsMutator`]: insert, remove, move and reorder inside a transaction
//!
//! All of them are obtained from a [`TreeScope`], which names the bound space
//! they work in.

mod builder;
mod mutator;
mod query;
mod reader;
mod scope;

pub use builder::TreeBuilder;
pub use mutator::{BoundsMutator, ExchangeStrategy};
pub use query::TreeQuery;
pub use reader::BoundsReader;
pub use scope::TreeScope;
