//! Three-way key comparison.
//!
//! A map is built around one [`Comparator`] and keeps it for its whole life.
//! The comparator must describe a total order; the map neither detects nor
//! recovers from one that does not.

use std::cmp::Ordering;

/// A total order over keys of type `K`.
///
/// Any `Fn(&K, &K) -> Ordering` is a comparator, so a closure can be passed
/// directly to [`AvlMap::with_comparator`](crate::AvlMap::with_comparator).
///
/// # Examples
/// ```
/// use parent_avl::{AvlMap, Comparator};
/// use std::cmp::Ordering;
///
/// struct ByLen;
///
/// impl Comparator<&str> for ByLen {
///     fn compare(&self, a: &&str, b: &&str) -> Ordering {
///         a.len().cmp(&b.len()).then(a.cmp(b))
///     }
/// }
///
/// let m = AvlMap::with_entries(ByLen, [("ccc", 3), ("a", 1), ("bb", 2)]);
/// assert_eq!(m.keys().copied().collect::<Vec<_>>(), ["a", "bb", "ccc"]);
/// ```
pub trait Comparator<K: ?Sized> {
    /// Compares `a` against `b`.
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// Orders keys by their [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> Comparator<K> for NaturalOrder {
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

/// Flips the order of another comparator.
///
/// # Examples
/// ```
/// use parent_avl::{AvlMap, NaturalOrder, Reversed};
///
/// let m = AvlMap::with_entries(Reversed(NaturalOrder), [(1, 'a'), (3, 'c'), (2, 'b')]);
/// assert_eq!(m.keys().copied().collect::<Vec<_>>(), [3, 2, 1]);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Reversed<C>(pub C);

impl<K: ?Sized, C: Comparator<K>> Comparator<K> for Reversed<C> {
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self.0.compare(b, a)
    }
}

impl<K: ?Sized, F> Comparator<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self(a, b)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn natural_and_reversed_disagree() {
        assert_eq!(NaturalOrder.compare(&1, &2), Ordering::Less);
        assert_eq!(Reversed(NaturalOrder).compare(&1, &2), Ordering::Greater);
        assert_eq!(Reversed(NaturalOrder).compare(&2, &2), Ordering::Equal);
    }

    #[test]
    fn closures_are_comparators() {
        let by_abs = |a: &i32, b: &i32| a.abs().cmp(&b.abs());
        assert_eq!(by_abs.compare(&-3, &2), Ordering::Greater);
        assert_eq!(by_abs.compare(&-2, &2), Ordering::Equal);
    }
}
