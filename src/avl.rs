#![warn(missing_docs)]
use std::cmp::Ordering::*;
use std::fmt::{Debug, Formatter};
use std::mem::replace;

use slab::Slab;
use tracing::{debug, trace};

use crate::compare::{Comparator, NaturalOrder};
use crate::error::InvariantError;

mod iter;
mod node;
mod rebalance;

pub use iter::{IntoIter, Iter, Keys, Values};
use iter::push_left_spine;
use node::{
    bal, height, max_node, min_node, replace_child, Node, NodeId, Nodes,
};
use rebalance::{retrace, Fixup};

/// A map from keys to values sorted by a comparator.
///
/// We aim for the API to resemble the (stable) API of
/// [`std::collections::BTreeMap`], with the order supplied by a
/// [`Comparator`] fixed at construction instead of by `K: Ord`.
///
/// Internally, the map is an [AVL tree](https://en.wikipedia.org/wiki/AVL_tree)
/// whose nodes live in a slab and link to their parents as well as their
/// children.  Insertion and removal descend to the affected node and then
/// climb back to the root through the parent links, recomputing heights and
/// rotating wherever a node's subtrees differ in height by two.
///
/// # Examples
/// ```
/// use parent_avl::AvlMap;
///
/// let mut m = AvlMap::new();
/// m.insert(5, "a");
/// m.insert(3, "b");
/// m.insert(8, "c");
/// assert_eq!(m.insert(3, "B"), Some("b"));
/// assert_eq!(m.remove(&5), Some("a"));
/// assert_eq!(m.iter().collect::<Vec<_>>(), [(&3, &"B"), (&8, &"c")]);
/// ```
#[derive(Clone)]
pub struct AvlMap<K, V, C = NaturalOrder> {
    nodes: Nodes<K, V>,
    root: Option<NodeId>,
    cmp: C,
}

fn fmt_node<K: Debug, V: Debug>(
    nodes: &Nodes<K, V>,
    opt_id: Option<NodeId>,
    f: &mut Formatter<'_>,
) -> std::fmt::Result {
    let Some(id) = opt_id else {
        return f.write_str(".");
    };

    let n = &nodes[id];
    f.write_fmt(format_args!("(ht: {} {{{:?}: {:?}}} ", n.height, n.key, n.val))?;
    fmt_node(nodes, n.left, f)?;
    f.write_str(" ")?;
    fmt_node(nodes, n.right, f)?;
    f.write_str(")")
}

impl<K: Debug, V: Debug, C> Debug for AvlMap<K, V, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.root {
            None => f.write_str("AvlMap(EMPTY)"),
            Some(_) => {
                f.write_fmt(format_args!("AvlMap(#{}, ", self.len()))?;
                fmt_node(&self.nodes, self.root, f)?;
                f.write_str(")")
            }
        }
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for AvlMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, C> Eq for AvlMap<K, V, C> {}

impl<K, V, C> std::ops::Index<&K> for AvlMap<K, V, C>
where
    C: Comparator<K>,
{
    type Output = V;

    fn index(&self, index: &K) -> &Self::Output {
        match self.get(index) {
            Some(v) => v,
            None => panic!("Key not found in AvlMap"),
        }
    }
}

impl<K: Ord, V> AvlMap<K, V> {
    /// Creates a new, empty map ordered by `K: Ord`.
    /// # Examples
    /// ```
    /// use parent_avl::AvlMap;
    /// let m: AvlMap<usize, usize> = AvlMap::new();
    /// assert!(m.is_empty());
    /// ```
    pub fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<K, V, C> AvlMap<K, V, C> {
    /// Drops all entries from the map.
    pub fn clear(&mut self) {
        debug!(len = self.len(), "clearing map");
        self.root = None;
        self.nodes = Slab::new();
    }

    /// Returns the comparator that orders the map.
    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Creates an iterator over the map entries, sorted by key.
    ///
    /// # Examples
    /// ```
    /// use parent_avl::AvlMap;
    ///
    /// let m = AvlMap::from([(0,1), (1,2), (2, 3)]);
    /// for (i, (k, v)) in m.iter().enumerate() {
    ///     assert_eq!(&i, k);
    ///     assert_eq!(&(i+1), v);
    /// }
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.nodes, self.root)
    }

    /// Produces an iterator over the keys of the map, in sorted order.
    ///
    /// This is a simple projection from [`iter`](#method.iter).
    /// # Examples
    /// ```
    /// use parent_avl::AvlMap;
    ///
    /// let m = AvlMap::from([(0,0), (1,1), (2,2)]);
    /// let cnt_even_keys = m.keys().filter(|&k| k % &2 == 0).count();
    /// assert_eq!(cnt_even_keys, 2);
    /// ```
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys(self.iter())
    }

    /// Produces an iterator over the values of the map, ordered by their
    /// associated keys.
    ///
    /// # Examples
    /// ```
    /// use parent_avl::AvlMap;
    ///
    /// let m = AvlMap::from([(0,0), (1,1), (2,2)]);
    /// let sum_values: u32 = m.values().sum();
    /// assert_eq!(sum_values, 3);
    /// ```
    pub fn values(&self) -> Values<'_, K, V> {
        Values(self.iter())
    }

    /// Applies f to each entry of the map in order of the keys.
    ///
    /// # Examples
    /// ```
    /// use parent_avl::AvlMap;
    ///
    /// let m = AvlMap::from([(0,-10), (1,0), (2,12)]);
    /// let mut cnt_keys_gt_vals = 0;
    /// m.for_each(|(k, v)| if k > v { cnt_keys_gt_vals += 1 });
    /// assert_eq!(cnt_keys_gt_vals, 2);
    /// ```
    pub fn for_each<F: FnMut((&K, &V))>(&self, f: F) {
        self.iter().for_each(f);
    }

    /// Applies a function to every key-value pair in the map, in order of the
    /// keys, with mutable access to the values.
    ///
    /// # Examples
    /// ```
    /// use parent_avl::AvlMap;
    ///
    /// let mut m = AvlMap::from([(0, 0), (1, 1), (2, 2)]);
    /// m.for_each_mut(|(k, v)| *v += k);
    /// assert_eq!(m.get(&2), Some(&4));
    /// ```
    pub fn for_each_mut<F: FnMut((&K, &mut V))>(&mut self, mut f: F) {
        let mut work = Vec::new();
        push_left_spine(&self.nodes, &mut work, self.root);
        while let Some(id) = work.pop() {
            let n = &mut self.nodes[id];
            f((&n.key, &mut n.val));
            let rt = n.right;
            push_left_spine(&self.nodes, &mut work, rt);
        }
    }

    /// Returns the key-value pair for the least key in the map
    ///
    /// # Examples
    /// ```
    /// use parent_avl::AvlMap;
    ///
    /// let m = AvlMap::from([(2,0), (1,0)]);
    /// assert_eq!(m.first_key_value(), Some((&1, &0)));
    /// ```
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.root.map(|r| {
            let n = &self.nodes[min_node(&self.nodes, r)];
            (&n.key, &n.val)
        })
    }

    /// Returns the key-value pair for the greatest key in the map
    ///
    /// # Examples
    /// ```
    /// use parent_avl::AvlMap;
    ///
    /// let m = AvlMap::from([(2,0), (1,0)]);
    /// assert_eq!(m.last_key_value(), Some((&2, &0)));
    /// ```
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.root.map(|r| {
            let n = &self.nodes[max_node(&self.nodes, r)];
            (&n.key, &n.val)
        })
    }

    /// Returns the height of the tree: 0 when empty, 1 for a single entry.
    pub fn height(&self) -> usize {
        height(&self.nodes, self.root) as usize
    }

    /// Tests whether the subtrees of every node differ in height by at most
    /// one.
    pub fn is_balanced(&self) -> bool {
        self.nodes
            .iter()
            .all(|(id, _)| (-1..=1).contains(&bal(&self.nodes, id)))
    }

    /// Returns true if self contains no entries, false otherwise.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of entries in self.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

impl<K, V, C: Comparator<K>> AvlMap<K, V, C> {
    /// Creates a new, empty map ordered by `cmp`.
    ///
    /// # Examples
    /// ```
    /// use parent_avl::AvlMap;
    ///
    /// let mut m = AvlMap::with_comparator(|a: &i32, b: &i32| b.cmp(a));
    /// m.extend([(1, ()), (3, ()), (2, ())]);
    /// assert_eq!(m.keys().copied().collect::<Vec<_>>(), [3, 2, 1]);
    /// ```
    pub fn with_comparator(cmp: C) -> Self {
        AvlMap {
            nodes: Slab::new(),
            root: None,
            cmp,
        }
    }

    /// Creates a map ordered by `cmp` holding `entries`.  Later entries
    /// overwrite the values of earlier ones with equal keys.
    pub fn with_entries<I>(cmp: C, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut m = Self::with_comparator(cmp);
        m.extend(entries);
        m
    }

    fn find(&self, key: &K) -> Option<NodeId> {
        let mut curr = self.root;
        while let Some(id) = curr {
            let n = &self.nodes[id];
            match self.cmp.compare(key, &n.key) {
                Less => curr = n.left,
                Equal => return Some(id),
                Greater => curr = n.right,
            }
        }

        None
    }

    /// Tests if self contains an entry for the given key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Returns a reference to the value associated with k.
    ///
    /// # Example
    /// ```
    /// use parent_avl::AvlMap;
    ///
    /// let mut m = AvlMap::new();
    /// m.insert(0, 100);
    ///
    /// assert_eq!(m.get(&0), Some(&100));
    /// assert_eq!(m.get(&1), None);
    /// ```
    pub fn get(&self, k: &K) -> Option<&V> {
        self.find(k).map(|id| &self.nodes[id].val)
    }

    /// Returns a mutable reference to the value associated with k.
    ///
    /// # Example
    /// ```
    /// use parent_avl::AvlMap;
    ///
    /// let mut m = AvlMap::new();
    /// m.insert(1, 7);
    ///
    /// *m.get_mut(&1).unwrap() = 2;
    /// assert_eq!(m.get(&1), Some(&2));
    /// ```
    pub fn get_mut(&mut self, k: &K) -> Option<&mut V> {
        self.find(k).map(|id| &mut self.nodes[id].val)
    }

    /// Inserts a key-value pair in the map.
    ///
    /// If the key is already present, only its value is replaced and the old
    /// value is returned; the shape of the tree does not change.
    ///
    /// # Examples
    /// ```
    /// use parent_avl::AvlMap;
    ///
    /// let mut m = AvlMap::new();
    /// assert_eq!(m.insert(0, "a"), None);
    /// assert_eq!(m.insert(0, "b"), Some("a"));
    /// assert_eq!(m.get(&0), Some(&"b"));
    /// ```
    pub fn insert(&mut self, key: K, val: V) -> Option<V> {
        let Some(mut curr) = self.root else {
            self.root = Some(self.nodes.insert(Node::leaf(key, val, None)));
            return None; // *** EARLY RETURN ***
        };

        let (parent, side) = loop {
            let n = &mut self.nodes[curr];
            let side = self.cmp.compare(&key, &n.key);
            let next = match side {
                Equal => return Some(replace(&mut n.val, val)),
                Less => n.left,
                Greater => n.right,
            };

            match next {
                Some(id) => curr = id,
                None => break (curr, side),
            }
        };

        let id = self.nodes.insert(Node::leaf(key, val, Some(parent)));
        let p = &mut self.nodes[parent];
        if side == Less {
            p.left = Some(id);
        } else {
            p.right = Some(id);
        }

        self.root = Some(retrace(&mut self.nodes, parent, Fixup::Insert));
        None
    }

    /// Removes a key from a map and returns the unmapped value.
    ///
    /// A missing key leaves the map untouched and yields `None`.
    ///
    /// # Examples
    /// ```
    /// use parent_avl::AvlMap;
    ///
    /// let mut m = AvlMap::new();
    /// m.insert(1, 2);
    /// m.insert(2, 3);
    /// assert_eq!(m.remove(&2), Some(3));
    /// assert_eq!(m.remove(&2), None);
    /// ```
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key from a map and returns the stored key and value.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let target = self.find(key)?;
        let n = self.unlink(target);
        Some((n.key, n.val))
    }

    // Splices the node out of the tree, rebalances from the lowest node whose
    // subtree changed, and frees the node's slot.
    fn unlink(&mut self, target: NodeId) -> Node<K, V> {
        let nodes = &mut self.nodes;
        let Node {
            left,
            right,
            parent,
            ..
        } = nodes[target];

        let replacement = match (left, right) {
            // the in-order successor
            (Some(_), Some(rt)) => Some(min_node(nodes, rt)),
            (Some(c), None) | (None, Some(c)) => Some(c),
            (None, None) => None,
        };

        let start = match replacement {
            Some(rep) if nodes[rep].parent == Some(target) => Some(rep),
            Some(rep) => nodes[rep].parent,
            None => parent,
        };

        if let (Some(rep), Some(lf), Some(rt)) = (replacement, left, right) {
            trace!("splicing in successor");
            if rep != rt {
                // the successor has no left child; its right subtree takes
                // its old place
                let rep_parent = nodes[rep].parent;
                let rep_rt = nodes[rep].right;
                replace_child(nodes, rep_parent, rep, rep_rt);

                nodes[rep].right = Some(rt);
                nodes[rt].parent = Some(rep);
            }

            nodes[rep].left = Some(lf);
            nodes[lf].parent = Some(rep);
        }

        replace_child(nodes, parent, target, replacement);
        let old = nodes.remove(target);

        self.root = start.map(|id| retrace(nodes, id, Fixup::Remove));
        old
    }

    /// Walks the whole tree and reports the first broken invariant: key
    /// order, cached heights, balance, parent links, or the entry count.
    ///
    /// # Examples
    /// ```
    /// use parent_avl::AvlMap;
    ///
    /// let m: AvlMap<_, _> = (0..100).map(|i| (i, i)).collect();
    /// assert_eq!(m.check(), Ok(()));
    /// ```
    pub fn check(&self) -> Result<(), InvariantError> {
        if let Some(r) = self.root {
            if self.nodes[r].parent.is_some() {
                return Err(InvariantError::RootHasParent);
            }
        }

        let counted = self.chk(self.root)?;
        if counted != self.len() {
            return Err(InvariantError::LengthMismatch {
                cached: self.len(),
                counted,
            });
        }

        let mut prev = None;
        for (position, (k, _)) in self.iter().enumerate() {
            if let Some(p) = prev {
                if self.cmp.compare(p, k) != Less {
                    return Err(InvariantError::Unordered { position });
                }
            }
            prev = Some(k);
        }

        Ok(())
    }

    // checks links, heights, and balance below opt_id; returns the node count
    fn chk(&self, opt_id: Option<NodeId>) -> Result<usize, InvariantError> {
        let Some(id) = opt_id else {
            return Ok(0);
        };

        let n = &self.nodes[id];
        for c in [n.left, n.right].into_iter().flatten() {
            if self.nodes[c].parent != Some(id) {
                return Err(InvariantError::BrokenParentLink);
            }
        }

        let cnt = self.chk(n.left)? + self.chk(n.right)? + 1;

        let actual = height(&self.nodes, n.left).max(height(&self.nodes, n.right)) + 1;
        if n.height != actual {
            return Err(InvariantError::StaleHeight {
                cached: n.height,
                actual,
            });
        }

        let balance = bal(&self.nodes, id) as i16;
        if !(-1..=1).contains(&balance) {
            return Err(InvariantError::Unbalanced { balance });
        }

        Ok(cnt)
    }
}

impl<K, V, C: Comparator<K> + Default> Default for AvlMap<K, V, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<K, V, C: Comparator<K>> Extend<(K, V)> for AvlMap<K, V, C> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for AvlMap<K, V> {
    fn from(vs: [(K, V); N]) -> Self {
        AvlMap::from_iter(vs)
    }
}

impl<K, V, C: Comparator<K> + Default> FromIterator<(K, V)> for AvlMap<K, V, C> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::with_entries(C::default(), iter)
    }
}

impl<'a, K, V, C> IntoIterator for &'a AvlMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, C> IntoIterator for AvlMap<K, V, C> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.nodes, self.root)
    }
}

#[cfg(feature = "serde")]
impl<K, V, C> serde::Serialize for AvlMap<K, V, C>
where
    K: serde::Serialize,
    V: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
struct AvlMapVisitor<K, V, C> {
    marker: std::marker::PhantomData<fn() -> AvlMap<K, V, C>>,
}

#[cfg(feature = "serde")]
impl<'de, K, V, C> serde::de::Visitor<'de> for AvlMapVisitor<K, V, C>
where
    K: serde::Deserialize<'de>,
    V: serde::Deserialize<'de>,
    C: Comparator<K> + Default,
{
    type Value = AvlMap<K, V, C>;

    fn expecting(&self, formatter: &mut Formatter) -> std::fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        let mut map = AvlMap::default();
        while let Some((key, value)) = access.next_entry()? {
            map.insert(key, value);
        }
        Ok(map)
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V, C> serde::Deserialize<'de> for AvlMap<K, V, C>
where
    K: serde::Deserialize<'de>,
    V: serde::Deserialize<'de>,
    C: Comparator<K> + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(AvlMapVisitor {
            marker: std::marker::PhantomData,
        })
    }
}
