//! Errors returned by tree reads and mutations.

use crate::store::StoreError;

/// Errors that can occur during tree operations.
///
/// Node identities are carried in their `Debug` rendering so the error type
/// does not depend on the store's id type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// The node has no record or no bounds in this scope yet.
    NotPersisted {
        /// The node.
        node: String,
    },
    /// A node passed as new already has bounds.
    AlreadyPersisted {
        /// The node.
        node: String,
    },
    /// Stored bounds violate `left < right` or only one side is set.
    CorruptBounds {
        /// The node.
        node: String,
        /// Stored left bound.
        left: Option<i64>,
        /// Stored right bound.
        right: Option<i64>,
    },
    /// A move would place a node inside its own subtree.
    CycleRejected {
        /// The node being moved.
        node: String,
        /// The requested new parent.
        target: String,
    },
    /// Two nodes passed to a sibling exchange do not share a parent.
    NotSiblings {
        /// First node.
        first: String,
        /// Second node.
        second: String,
    },
    /// A batch write touched a different number of rows than planned.
    ConsistencyMismatch {
        /// Which write of which operation.
        step: &'static str,
        /// Rows the plan expected.
        expected: usize,
        /// Rows the store reported.
        actual: usize,
    },
    /// Making room for a new child shifted nothing.
    NoSpace {
        /// The parent.
        parent: String,
    },
    /// Two intervals cross without nesting.
    Overlap {
        /// First node.
        first: String,
        /// Second node.
        second: String,
    },
    /// Tree assembly went deeper than the configured limit.
    DepthLimitExceeded {
        /// Configured limit.
        limit: usize,
    },
    /// Tree assembly would hold more nodes than the configured limit.
    SizeLimitExceeded {
        /// Configured limit.
        limit: usize,
        /// Nodes that would have been assembled.
        requested: usize,
    },
    /// The record store failed.
    Store(StoreError),
}

impl TreeError {
    /// Whether retrying the whole operation from a fresh read may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ConsistencyMismatch { .. })
    }

    pub(crate) fn not_persisted(node: &impl std::fmt::Debug) -> Self {
        Self::NotPersisted {
            node: format!("{node:?}"),
        }
    }
}

impl std::fmt::Display for TreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotPersisted { node } => write!(f, "node {node} has no bounds in this scope"),
            Self::AlreadyPersisted { node } => write!(f, "node {node} already has bounds"),
            Self::CorruptBounds { node, left, right } => {
                write!(f, "node {node} has corrupt bounds ({left:?}, {right:?})")
            }
            Self::CycleRejected { node, target } => {
                write!(f, "cannot move node {node} under its own descendant {target}")
            }
            Self::NotSiblings { first, second } => {
                write!(f, "nodes {first} and {second} are not siblings")
            }
            Self::ConsistencyMismatch {
                step,
                expected,
                actual,
            } => write!(
                f,
                "{step}: expected {expected} affected rows, store reported {actual}"
            ),
            Self::NoSpace { parent } => write!(f, "no room made for a child of node {parent}"),
            Self::Overlap { first, second } => {
                write!(f, "intervals of nodes {first} and {second} overlap")
            }
            Self::DepthLimitExceeded { limit } => write!(f, "tree deeper than {limit} levels"),
            Self::SizeLimitExceeded { limit, requested } => {
                write!(f, "tree of {requested} nodes exceeds limit of {limit}")
            }
            Self::Store(e) => write!(f, "store error: {e}"),
        }
    }
}

impl std::error::Error for TreeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for TreeError {
    fn from(e: StoreError) -> Self {
        Self::Store(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_mismatch_is_retryable() {
        let mismatch = TreeError::ConsistencyMismatch {
            step: "move_node subtree",
            expected: 3,
            actual: 2,
        };
        assert!(mismatch.is_retryable());
        assert!(!TreeError::not_persisted(&7u64).is_retryable());
        assert!(!TreeError::Store(StoreError::LockPoisoned).is_retryable());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            TreeError::not_persisted(&7u64).to_string(),
            "node 7 has no bounds in this scope"
        );
        assert_eq!(
            TreeError::ConsistencyMismatch {
                step: "add_child left shift",
                expected: 2,
                actual: 1,
            }
            .to_string(),
            "add_child left shift: expected 2 affected rows, store reported 1"
        );
    }

    #[test]
    fn test_store_error_source() {
        use std::error::Error;
        let e = TreeError::from(StoreError::NoActiveTransaction);
        assert!(e.source().is_some());
    }
}
