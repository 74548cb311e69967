//! Value types shared by the reader, query, builder and mutator layers.

mod bounds;
mod node;

pub use bounds::{Bounds, Extent};
pub use node::{Node, PreOrder, TreeNode};
