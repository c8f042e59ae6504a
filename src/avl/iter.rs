use super::node::{NodeId, Nodes};
use std::iter::FusedIterator;

// Pushes `from` and its chain of left descendants onto the work stack.
pub(super) fn push_left_spine<K, V>(
    nodes: &Nodes<K, V>,
    work: &mut Vec<NodeId>,
    mut from: Option<NodeId>,
) {
    while let Some(id) = from {
        work.push(id);
        from = nodes[id].left;
    }
}

/// An iterator over the entries of an [`AvlMap`](crate::AvlMap), in ascending
/// key order.
///
/// The work stack holds the unvisited ancestors of the next entry, so its
/// size is bounded by the tree height.
pub struct Iter<'a, K, V> {
    nodes: &'a Nodes<K, V>,
    work: Vec<NodeId>,
    len: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(super) fn new(nodes: &'a Nodes<K, V>, root: Option<NodeId>) -> Self {
        let mut work = Vec::new();
        push_left_spine(nodes, &mut work, root);
        Iter {
            nodes,
            work,
            len: nodes.len(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let nodes = self.nodes;
        self.work.pop().map(|id| {
            self.len -= 1;
            let n = &nodes[id];
            push_left_spine(nodes, &mut self.work, n.right);
            (&n.key, &n.val)
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {
    fn len(&self) -> usize {
        self.len
    }
}

impl<'a, K, V> FusedIterator for Iter<'a, K, V> {}

impl<'a, K, V> Clone for Iter<'a, K, V> {
    fn clone(&self) -> Self {
        Iter {
            nodes: self.nodes,
            work: self.work.clone(),
            len: self.len,
        }
    }
}

/// An iterator over the keys of an [`AvlMap`](crate::AvlMap), in ascending
/// order.
#[derive(Clone)]
pub struct Keys<'a, K, V>(pub(super) Iter<'a, K, V>);

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a, K, V> ExactSizeIterator for Keys<'a, K, V> {}
impl<'a, K, V> FusedIterator for Keys<'a, K, V> {}

/// An iterator over the values of an [`AvlMap`](crate::AvlMap), ordered by
/// their keys.
#[derive(Clone)]
pub struct Values<'a, K, V>(pub(super) Iter<'a, K, V>);

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.0.size_hint()
    }
}

impl<'a, K, V> ExactSizeIterator for Values<'a, K, V> {}
impl<'a, K, V> FusedIterator for Values<'a, K, V> {}

/// A consuming iterator over the entries of an [`AvlMap`](crate::AvlMap), in
/// ascending key order.
///
/// Each node leaves the slab as it is yielded; its right child is still in
/// the slab at that point, so the walk can continue from it.
pub struct IntoIter<K, V> {
    nodes: Nodes<K, V>,
    work: Vec<NodeId>,
}

impl<K, V> IntoIter<K, V> {
    pub(super) fn new(nodes: Nodes<K, V>, root: Option<NodeId>) -> Self {
        let mut work = Vec::new();
        push_left_spine(&nodes, &mut work, root);
        IntoIter { nodes, work }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.work.pop()?;
        let n = self.nodes.remove(id);
        push_left_spine(&self.nodes, &mut self.work, n.right);
        Some((n.key, n.val))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.nodes.len(), Some(self.nodes.len()))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}
