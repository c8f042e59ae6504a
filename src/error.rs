//! Errors reported by [`AvlMap::check`](crate::AvlMap::check).
//!
//! None of the map's ordinary operations fail. A missing key is reported as
//! `None`. The only error type describes a broken structural invariant found
//! by the self-check, which exists for tests and debugging.

use thiserror::Error;

/// The first structural invariant found to be violated.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvariantError {
    /// An in-order neighbour pair did not compare strictly ascending.
    #[error("keys out of order at in-order position {position}")]
    Unordered {
        /// Index of the later key of the offending pair.
        position: usize,
    },

    /// A node's cached height disagrees with its children.
    #[error("node caches height {cached} but its subtree has height {actual}")]
    StaleHeight {
        /// The height stored in the node.
        cached: u8,
        /// The height recomputed from the children.
        actual: u8,
    },

    /// A node's balance factor left `-1..=1`.
    #[error("balance factor {balance} outside -1..=1")]
    Unbalanced {
        /// `height(right) - height(left)`.
        balance: i16,
    },

    /// A child does not point back at the node that holds it.
    #[error("child link and parent link disagree")]
    BrokenParentLink,

    /// The root has a parent.
    #[error("root node has a parent")]
    RootHasParent,

    /// The cached entry count is not the number of reachable nodes.
    #[error("map caches length {cached} but holds {counted} nodes")]
    LengthMismatch {
        /// The length stored in the map.
        cached: usize,
        /// The number of nodes reachable from the root.
        counted: usize,
    },
}
