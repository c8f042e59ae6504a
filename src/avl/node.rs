use slab::Slab;

/// Slot key of a node in the map's slab.
pub(super) type NodeId = usize;

/// Storage for every node of one tree.
pub(super) type Nodes<K, V> = Slab<Node<K, V>>;

#[derive(Clone)]
pub(super) struct Node<K, V> {
    pub(super) key: K,
    pub(super) val: V,
    pub(super) left: Option<NodeId>,
    pub(super) right: Option<NodeId>,
    // non-owning; None only for the root
    pub(super) parent: Option<NodeId>,
    pub(super) height: u8,
}

impl<K, V> Node<K, V> {
    pub(super) fn leaf(key: K, val: V, parent: Option<NodeId>) -> Self {
        Node {
            key,
            val,
            left: None,
            right: None,
            parent,
            height: 1,
        }
    }
}

pub(super) fn height<K, V>(nodes: &Nodes<K, V>, opt_id: Option<NodeId>) -> u8 {
    opt_id.map_or(0, |id| nodes[id].height)
}

// Returns the "balance factor" of the node: height(right) - height(left)
pub(super) fn bal<K, V>(nodes: &Nodes<K, V>, id: NodeId) -> i8 {
    let n = &nodes[id];
    height(nodes, n.right) as i8 - height(nodes, n.left) as i8
}

pub(super) fn update_height<K, V>(nodes: &mut Nodes<K, V>, id: NodeId) {
    let n = &nodes[id];
    let ht = height(nodes, n.left).max(height(nodes, n.right)) + 1;
    nodes[id].height = ht;
}

pub(super) fn min_node<K, V>(nodes: &Nodes<K, V>, mut id: NodeId) -> NodeId {
    while let Some(lf) = nodes[id].left {
        id = lf;
    }
    id
}

pub(super) fn max_node<K, V>(nodes: &Nodes<K, V>, mut id: NodeId) -> NodeId {
    while let Some(rt) = nodes[id].right {
        id = rt;
    }
    id
}

/// Points whichever child slot of `parent` holds `old` at `new`, and points
/// `new` back at `parent`.  With no parent, only the back link is written;
/// the caller owns the root reference.
pub(super) fn replace_child<K, V>(
    nodes: &mut Nodes<K, V>,
    parent: Option<NodeId>,
    old: NodeId,
    new: Option<NodeId>,
) {
    if let Some(p) = parent {
        let p = &mut nodes[p];
        if p.left == Some(old) {
            p.left = new;
        } else {
            debug_assert_eq!(p.right, Some(old));
            p.right = new;
        }
    }

    if let Some(n) = new {
        nodes[n].parent = parent;
    }
}

/// Rotates the subtree at `a` to the left and returns its new top.
///
/// ```text
///    a(x, b(y, z))   =>   b(a(x, y), z)
/// ```
///
/// x and z keep their parents.  Heights are left stale: the caller must
/// recompute `a` and then `b`.
pub(super) fn rotate_left<K, V>(nodes: &mut Nodes<K, V>, a: NodeId) -> NodeId {
    let b = nodes[a].right.expect("rotate_left needs a right child");
    let parent = nodes[a].parent;

    // move y from b to a
    let y = nodes[b].left;
    nodes[a].right = y;
    if let Some(y) = y {
        nodes[y].parent = Some(a);
    }

    // make a be b's left child
    nodes[b].left = Some(a);
    nodes[a].parent = Some(b);

    // install b where a was
    replace_child(nodes, parent, a, Some(b));
    b
}

/// Rotates the subtree at `a` to the right and returns its new top.
///
/// ```text
///    a(b(x, y), z)   =>   b(x, a(y, z))
/// ```
///
/// Heights are left stale: the caller must recompute `a` and then `b`.
pub(super) fn rotate_right<K, V>(nodes: &mut Nodes<K, V>, a: NodeId) -> NodeId {
    let b = nodes[a].left.expect("rotate_right needs a left child");
    let parent = nodes[a].parent;

    let y = nodes[b].right;
    nodes[a].left = y;
    if let Some(y) = y {
        nodes[y].parent = Some(a);
    }

    nodes[b].right = Some(a);
    nodes[a].parent = Some(b);

    replace_child(nodes, parent, a, Some(b));
    b
}
