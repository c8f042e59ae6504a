use proptest::prelude::*;
use std::ops::Range;

#[allow(dead_code)]
pub(super) fn assert_eq_iters<I: Iterator, J: Iterator<Item = I::Item>>(
    mut i: I,
    mut j: J,
) where
    I::Item: std::fmt::Debug + Eq, // same inferred for J::Item
{
    loop {
        match (i.next(), j.next()) {
            (None, None) => return,
            (a, b) => assert_eq!(a, b),
        }
    }
}

pub(super) type U16Pairs = Vec<(u16, u16)>;

#[allow(dead_code)]
pub(super) fn u16_pairs(
    keys: Range<u16>,
    len: Range<usize>,
) -> impl Strategy<Value = U16Pairs> {
    prop::collection::vec((keys, 0u16..1024u16), len)
}

#[allow(dead_code)]
pub(super) fn small_int_pairs() -> impl Strategy<Value = U16Pairs> {
    u16_pairs(0..1024, 0..512)
}

// few distinct keys, so inserts collide and removes hit
#[allow(dead_code)]
pub(super) fn tiny_int_pairs() -> impl Strategy<Value = U16Pairs> {
    u16_pairs(0..64, 0..128)
}

#[allow(dead_code)]
#[derive(Clone, Copy, Debug)]
pub(super) enum Op {
    Insert(u16, u16),
    Remove(u16),
}

#[allow(dead_code)]
pub(super) fn op_seqs(keys: Range<u16>, len: Range<usize>) -> impl Strategy<Value = Vec<Op>> {
    let op = prop_oneof![
        3 => (keys.clone(), any::<u16>()).prop_map(|(k, v)| Op::Insert(k, v)),
        2 => keys.prop_map(Op::Remove),
    ];
    prop::collection::vec(op, len)
}
