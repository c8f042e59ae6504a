//! # An ordered map on a parent-linked AVL tree
//!
//! `parent-avl` provides [`AvlMap`], a map sorted by a [`Comparator`] chosen
//! when the map is built.  Lookups, insertions, and removals take time
//! logarithmic in the number of entries, and iteration visits entries in
//! ascending key order.
//!
//! Every node records its parent, so insertion and removal rebalance by
//! climbing from the changed node to the root instead of unwinding a
//! recursion.  Nodes are kept in a [`slab`](https://docs.rs/slab) and refer
//! to one another by slot, which keeps the parent links non-owning.
//!
//! ```
//! use parent_avl::AvlMap;
//!
//! let mut m = AvlMap::from([(5, "a"), (3, "b"), (8, "c"), (1, "d"), (4, "e")]);
//! assert_eq!(m.len(), 5);
//! assert!(m.remove(&5).is_some());
//! assert_eq!(m.keys().copied().collect::<Vec<_>>(), [1, 3, 4, 8]);
//! assert_eq!(m.check(), Ok(()));
//! ```

mod avl;
pub use avl::{AvlMap, IntoIter, Iter, Keys, Values};

mod compare;
pub use compare::{Comparator, NaturalOrder, Reversed};

mod error;
pub use error::InvariantError;
