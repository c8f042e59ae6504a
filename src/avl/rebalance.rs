use super::node::{
    bal, height, rotate_left, rotate_right, update_height, NodeId, Nodes,
};
use tracing::trace;

/// Which tie-break decides between a single and a double rotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Fixup {
    /// Lean of the heavy child (balanced counts as leaning outward).
    Insert,
    /// Heights of the heavy child's two children.
    Remove,
}

impl Fixup {
    // Does the heavy child of a left-heavy node need a left rotation first?
    fn zig_zag_lf<K, V>(self, nodes: &Nodes<K, V>, lf: NodeId) -> bool {
        match self {
            Fixup::Insert => bal(nodes, lf) > 0,
            Fixup::Remove => {
                let n = &nodes[lf];
                height(nodes, n.left) < height(nodes, n.right)
            }
        }
    }

    // Does the heavy child of a right-heavy node need a right rotation first?
    fn zig_zag_rt<K, V>(self, nodes: &Nodes<K, V>, rt: NodeId) -> bool {
        match self {
            Fixup::Insert => bal(nodes, rt) < 0,
            Fixup::Remove => {
                let n = &nodes[rt];
                height(nodes, n.right) < height(nodes, n.left)
            }
        }
    }
}

// rebalance by "shifting height" from left to right
fn rebal_lf_to_rt<K, V>(nodes: &mut Nodes<K, V>, a: NodeId, fixup: Fixup) -> NodeId {
    let lf = nodes[a].left.expect("left-heavy node has a left child");

    if fixup.zig_zag_lf(nodes, lf) {
        trace!(?fixup, "double rotation, left then right");
        let c = rotate_left(nodes, lf);
        update_height(nodes, lf);
        update_height(nodes, c);
    } else {
        trace!(?fixup, "single rotation right");
    }

    let top = rotate_right(nodes, a);
    update_height(nodes, a);
    update_height(nodes, top);
    top
}

// rebalance by "shifting height" from right to left
fn rebal_rt_to_lf<K, V>(nodes: &mut Nodes<K, V>, a: NodeId, fixup: Fixup) -> NodeId {
    let rt = nodes[a].right.expect("right-heavy node has a right child");

    if fixup.zig_zag_rt(nodes, rt) {
        trace!(?fixup, "double rotation, right then left");
        let c = rotate_right(nodes, rt);
        update_height(nodes, rt);
        update_height(nodes, c);
    } else {
        trace!(?fixup, "single rotation left");
    }

    let top = rotate_left(nodes, a);
    update_height(nodes, a);
    update_height(nodes, top);
    top
}

/// Recomputes the height of `id` and restores its balance, returning the node
/// now at the top of that subtree.
fn rebalance<K, V>(nodes: &mut Nodes<K, V>, id: NodeId, fixup: Fixup) -> NodeId {
    update_height(nodes, id);

    match bal(nodes, id) {
        -2 => {
            trace!(node = id, balance = -2, "left-heavy");
            rebal_lf_to_rt(nodes, id, fixup)
        }
        2 => {
            trace!(node = id, balance = 2, "right-heavy");
            rebal_rt_to_lf(nodes, id, fixup)
        }
        b => {
            debug_assert!((-1..=1).contains(&b), "balance factor {b}");
            id
        }
    }
}

/// Walks parent links from `from` up to the top of the tree, rebalancing
/// every node on the way, and returns the node left without a parent: the
/// new root.
///
/// The walk never stops early.  After a removal the imbalance can reappear
/// at any ancestor; after an insertion the remaining steps only refresh
/// heights.
pub(super) fn retrace<K, V>(
    nodes: &mut Nodes<K, V>,
    from: NodeId,
    fixup: Fixup,
) -> NodeId {
    let mut curr = from;
    loop {
        let top = rebalance(nodes, curr, fixup);
        match nodes[top].parent {
            Some(p) => curr = p,
            None => return top,
        }
    }
}

#[cfg(test)]
mod test {
    use super::super::node::Node;
    use super::*;
    use slab::Slab;

    fn link(nodes: &mut Nodes<u8, ()>, p: NodeId, lf: Option<NodeId>, rt: Option<NodeId>) {
        nodes[p].left = lf;
        nodes[p].right = rt;
        for c in [lf, rt].into_iter().flatten() {
            nodes[c].parent = Some(p);
        }
    }

    // 3(1(., 2), .): a left-heavy root whose child leans right
    fn zig_zag() -> (Nodes<u8, ()>, [NodeId; 3]) {
        let mut nodes = Slab::new();
        let n3 = nodes.insert(Node::leaf(3, (), None));
        let n1 = nodes.insert(Node::leaf(1, (), None));
        let n2 = nodes.insert(Node::leaf(2, (), None));
        link(&mut nodes, n1, None, Some(n2));
        link(&mut nodes, n3, Some(n1), None);
        update_height(&mut nodes, n1);
        (nodes, [n1, n2, n3])
    }

    #[test]
    fn zig_zag_takes_a_double_rotation() {
        for fixup in [Fixup::Insert, Fixup::Remove] {
            let (mut nodes, [n1, n2, n3]) = zig_zag();
            let root = retrace(&mut nodes, n3, fixup);
            assert_eq!(root, n2);
            assert_eq!(nodes[n2].left, Some(n1));
            assert_eq!(nodes[n2].right, Some(n3));
            assert_eq!(nodes[n2].height, 2);
            assert_eq!(nodes[n1].height, 1);
            assert_eq!(nodes[n3].height, 1);
            assert_eq!(nodes[n1].parent, Some(n2));
            assert_eq!(nodes[n3].parent, Some(n2));
        }
    }

    // 4(2(1, 3), .): the heavy child is balanced
    #[test]
    fn balanced_heavy_child_takes_a_single_rotation() {
        for fixup in [Fixup::Insert, Fixup::Remove] {
            let mut nodes = Slab::new();
            let ids: Vec<_> = (1..=5).map(|k| nodes.insert(Node::leaf(k, (), None))).collect();
            let &[n1, n2, n3, n4, _] = ids.as_slice() else {
                unreachable!()
            };
            link(&mut nodes, n2, Some(n1), Some(n3));
            link(&mut nodes, n4, Some(n2), None);
            update_height(&mut nodes, n2);

            let root = retrace(&mut nodes, n4, fixup);
            assert_eq!(root, n2);
            assert_eq!(nodes[n2].right, Some(n4));
            assert_eq!(nodes[n4].left, Some(n3));
            assert_eq!(nodes[n2].height, 3);
            assert_eq!(bal(&nodes, n2), 1);
        }
    }

    #[test]
    fn retrace_refreshes_heights_to_the_root() {
        let mut nodes: Nodes<u8, ()> = Slab::new();
        let n2 = nodes.insert(Node::leaf(2, (), None));
        let n1 = nodes.insert(Node::leaf(1, (), None));
        link(&mut nodes, n2, Some(n1), None);

        assert_eq!(retrace(&mut nodes, n1, Fixup::Insert), n2);
        assert_eq!(nodes[n2].height, 2);
    }
}
