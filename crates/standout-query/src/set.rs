//! Set algebra: Distinct, Union, Except, Intersect.
//!
//! The plain variants hash values (`Eq + Hash`); the `_with` variants take an
//! [`EqualityComparer`] and match by linear scan.

use std::hash::Hash;

use tracing::trace;

use crate::bag::{self, Bag, BagFactory};
use crate::compare::EqualityComparer;
use crate::sequence::Sequence;
use crate::source::Queryable;

impl<'a, V: Clone + 'a, K: 'a> Sequence<'a, V, K> {
    /// Drops values equal to an earlier value. The first occurrence wins and
    /// keeps its key.
    pub fn distinct(&self) -> Self
    where
        V: Eq + Hash,
    {
        self.distinct_in(bag::hashed())
    }

    /// [`distinct`](Self::distinct) with a custom comparer.
    pub fn distinct_with<C>(&self, comparer: C) -> Self
    where
        C: EqualityComparer<V> + 'a,
    {
        self.distinct_in(bag::scanned(comparer))
    }

    /// Yields the distinct values of this sequence followed by the values
    /// of `second` not seen yet. Keys are renumbered.
    ///
    /// ```
    /// use standout_query::Sequence;
    ///
    /// let a = Sequence::from_vec(vec![5, 3, 5]);
    /// let b = Sequence::from_vec(vec![3, 8]);
    /// assert_eq!(a.union(&b).to_vec(), vec![5, 3, 8]);
    /// ```
    pub fn union<Q>(&self, second: &Q) -> Sequence<'a, V>
    where
        Q: Queryable<'a, Item = V> + ?Sized,
        V: Eq + Hash,
    {
        self.union_in(second.query().renumber(), bag::hashed())
    }

    /// [`union`](Self::union) with a custom comparer.
    pub fn union_with<Q, C>(&self, second: &Q, comparer: C) -> Sequence<'a, V>
    where
        Q: Queryable<'a, Item = V> + ?Sized,
        C: EqualityComparer<V> + 'a,
    {
        self.union_in(second.query().renumber(), bag::scanned(comparer))
    }

    /// Keeps the elements of this sequence that have no equal value in
    /// `second`. Keys are preserved.
    pub fn except<Q>(&self, second: &Q) -> Self
    where
        Q: Queryable<'a, Item = V> + ?Sized,
        V: Eq + Hash,
    {
        self.membership_in(second.query().renumber(), bag::hashed(), false)
    }

    /// [`except`](Self::except) with a custom comparer.
    pub fn except_with<Q, C>(&self, second: &Q, comparer: C) -> Self
    where
        Q: Queryable<'a, Item = V> + ?Sized,
        C: EqualityComparer<V> + 'a,
    {
        self.membership_in(second.query().renumber(), bag::scanned(comparer), false)
    }

    /// Keeps the elements of this sequence that have an equal value in
    /// `second`. Keys are preserved.
    pub fn intersect<Q>(&self, second: &Q) -> Self
    where
        Q: Queryable<'a, Item = V> + ?Sized,
        V: Eq + Hash,
    {
        self.membership_in(second.query().renumber(), bag::hashed(), true)
    }

    /// [`intersect`](Self::intersect) with a custom comparer.
    pub fn intersect_with<Q, C>(&self, second: &Q, comparer: C) -> Self
    where
        Q: Queryable<'a, Item = V> + ?Sized,
        C: EqualityComparer<V> + 'a,
    {
        self.membership_in(second.query().renumber(), bag::scanned(comparer), true)
    }

    fn distinct_in(&self, new_bag: BagFactory<'a, V>) -> Self {
        let upstream = self.clone();
        Sequence::from_pull(move || {
            let mut seen = new_bag();
            upstream.iter().filter(move |(_, value)| seen.insert(value))
        })
    }

    fn union_in(&self, second: Sequence<'a, V>, new_bag: BagFactory<'a, V>) -> Sequence<'a, V> {
        let first = self.clone();
        Sequence::from_values(move || {
            let mut seen = new_bag();
            first
                .values()
                .chain(second.values())
                .filter(move |value| seen.insert(value))
        })
    }

    /// Filters by presence in `second`, which is drained into a bag on the
    /// first pull of each traversal.
    fn membership_in(
        &self,
        second: Sequence<'a, V>,
        new_bag: BagFactory<'a, V>,
        keep_matches: bool,
    ) -> Self {
        let upstream = self.clone();
        Sequence::from_pull(move || {
            let second = second.clone();
            let new_bag = new_bag.clone();
            let mut lookup: Option<Box<dyn Bag<V> + 'a>> = None;
            upstream.iter().filter(move |(_, value)| {
                let lookup = lookup.get_or_insert_with(|| {
                    let mut bag = new_bag();
                    for item in second.values() {
                        bag.insert(&item);
                    }
                    trace!(distinct = bag.len(), "materialized comparison set");
                    bag
                });
                lookup.contains(value) == keep_matches
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn distinct_keeps_first_key() {
        let seq = Sequence::from_vec(vec![2, 2, 4, 2, 6]);
        let pairs: Vec<_> = seq.distinct().iter().collect();
        assert_eq!(pairs, vec![(0, 2), (2, 4), (4, 6)]);
    }

    #[test]
    fn distinct_with_comparer() {
        let seq = Sequence::from_vec(vec!["a", "A", "b", "B", "a"]);
        let unique = seq.distinct_with(|x: &&str, y: &&str| x.eq_ignore_ascii_case(y));
        assert_eq!(unique.to_vec(), vec!["a", "b"]);
    }

    #[test]
    fn distinct_is_fresh_per_traversal() {
        let seq = Sequence::from_vec(vec![1, 1, 2]).distinct();
        assert_eq!(seq.to_vec(), vec![1, 2]);
        assert_eq!(seq.to_vec(), vec![1, 2]);
    }

    #[test]
    fn union_shares_one_bag() {
        let a = Sequence::from_vec(vec![1, 1, 2]);
        let b = Sequence::from_vec(vec![2, 3, 3]);
        assert_eq!(a.union(&b).iter().collect::<Vec<_>>(), vec![(0, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn except_and_intersect_keep_keys() {
        let a = Sequence::from_vec(vec![10, 20, 30, 40]);
        let b = vec![20, 40];
        assert_eq!(a.except(&b).iter().collect::<Vec<_>>(), vec![(0, 10), (2, 30)]);
        assert_eq!(a.intersect(&b).iter().collect::<Vec<_>>(), vec![(1, 20), (3, 40)]);
    }

    #[test]
    fn except_with_comparer() {
        let a = Sequence::from_vec(vec![1.0, 2.5, 3.9]);
        let b = Sequence::from_vec(vec![2.0, 3.0]);
        let same_floor = |x: &f64, y: &f64| x.floor() == y.floor();
        assert_eq!(a.except_with(&b, same_floor).to_vec(), vec![1.0]);
        assert_eq!(a.intersect_with(&b, same_floor).to_vec(), vec![2.5, 3.9]);
    }

    #[test]
    fn second_is_not_read_until_first_pull() {
        let reads = Cell::new(0);
        let second = Sequence::from_values(|| {
            reads.set(reads.get() + 1);
            vec![1]
        });
        let first = Sequence::from_vec(vec![1, 2]);
        let diff = first.except(&second);
        let mut pull = diff.iter();
        assert_eq!(reads.get(), 0);
        assert_eq!(pull.next(), Some((1, 2)));
        assert_eq!(reads.get(), 1);
    }
}
