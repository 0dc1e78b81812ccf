//! Join and GroupJoin.
//!
//! Both are nested loops: the inner source is drained once per traversal,
//! on the first outer pull, and then scanned for every outer element.

use std::rc::Rc;

use tracing::trace;

use crate::compare::{DefaultEquality, EqualityComparer};
use crate::sequence::Sequence;
use crate::source::Queryable;

/// Inner elements paired with their join keys.
type Table<TK, I> = Rc<Vec<(TK, I)>>;

impl<'a, V: 'a, K: 'a> Sequence<'a, V, K> {
    /// Correlates this sequence with `inner` on equal keys.
    ///
    /// Yields one result per matching `(outer, inner)` pair, in outer order
    /// and then inner order. Outer elements without a match produce nothing.
    ///
    /// ```
    /// use standout_query::Sequence;
    ///
    /// let owners = Sequence::from_vec(vec![(1, "ann"), (2, "bob")]);
    /// let pets = vec![("rex", 2), ("tom", 1), ("kit", 2)];
    /// let rows = owners.join(&pets, |o| o.0, |p| p.1, |o, p| format!("{}:{}", o.1, p.0));
    /// assert_eq!(rows.to_vec(), vec!["ann:tom", "bob:rex", "bob:kit"]);
    /// ```
    pub fn join<Q, TK, R, OK, IK, RS>(
        &self,
        inner: &Q,
        outer_key: OK,
        inner_key: IK,
        result: RS,
    ) -> Sequence<'a, R>
    where
        Q: Queryable<'a> + ?Sized,
        TK: PartialEq + 'a,
        R: 'a,
        OK: Fn(&V) -> TK + 'a,
        IK: Fn(&Q::Item) -> TK + 'a,
        RS: Fn(&V, &Q::Item) -> R + 'a,
    {
        self.join_with(inner, outer_key, inner_key, result, DefaultEquality)
    }

    /// [`join`](Self::join) with a custom key comparer.
    pub fn join_with<Q, TK, R, OK, IK, RS, C>(
        &self,
        inner: &Q,
        outer_key: OK,
        inner_key: IK,
        result: RS,
        comparer: C,
    ) -> Sequence<'a, R>
    where
        Q: Queryable<'a> + ?Sized,
        TK: 'a,
        R: 'a,
        OK: Fn(&V) -> TK + 'a,
        IK: Fn(&Q::Item) -> TK + 'a,
        RS: Fn(&V, &Q::Item) -> R + 'a,
        C: EqualityComparer<TK> + 'a,
    {
        let upstream = self.clone();
        let inner = inner.query().renumber();
        let outer_key = Rc::new(outer_key);
        let inner_key = Rc::new(inner_key);
        let result = Rc::new(result);
        let comparer = Rc::new(comparer);
        Sequence::from_values(move || {
            let inner = inner.clone();
            let inner_key = Rc::clone(&inner_key);
            let outer_key = Rc::clone(&outer_key);
            let result = Rc::clone(&result);
            let comparer = Rc::clone(&comparer);
            let mut table: Option<Table<TK, Q::Item>> = None;
            upstream.iter().flat_map(move |(_, outer)| {
                let table = Rc::clone(
                    table.get_or_insert_with(|| materialize(&inner, &*inner_key)),
                );
                let key = outer_key(&outer);
                let result = Rc::clone(&result);
                let comparer = Rc::clone(&comparer);
                (0..table.len()).filter_map(move |i| {
                    let (candidate, item) = &table[i];
                    comparer
                        .equals(&key, candidate)
                        .then(|| result(&outer, item))
                })
            })
        })
    }

    /// Correlates each outer element with all matching inner elements.
    ///
    /// Yields exactly one result per outer element; outer elements without a
    /// match receive an empty vector.
    pub fn group_join<Q, TK, R, OK, IK, RS>(
        &self,
        inner: &Q,
        outer_key: OK,
        inner_key: IK,
        result: RS,
    ) -> Sequence<'a, R>
    where
        Q: Queryable<'a> + ?Sized,
        Q::Item: Clone,
        TK: PartialEq + 'a,
        R: 'a,
        OK: Fn(&V) -> TK + 'a,
        IK: Fn(&Q::Item) -> TK + 'a,
        RS: Fn(V, Vec<Q::Item>) -> R + 'a,
    {
        self.group_join_with(inner, outer_key, inner_key, result, DefaultEquality)
    }

    /// [`group_join`](Self::group_join) with a custom key comparer.
    pub fn group_join_with<Q, TK, R, OK, IK, RS, C>(
        &self,
        inner: &Q,
        outer_key: OK,
        inner_key: IK,
        result: RS,
        comparer: C,
    ) -> Sequence<'a, R>
    where
        Q: Queryable<'a> + ?Sized,
        Q::Item: Clone,
        TK: 'a,
        R: 'a,
        OK: Fn(&V) -> TK + 'a,
        IK: Fn(&Q::Item) -> TK + 'a,
        RS: Fn(V, Vec<Q::Item>) -> R + 'a,
        C: EqualityComparer<TK> + 'a,
    {
        let upstream = self.clone();
        let inner = inner.query().renumber();
        let outer_key = Rc::new(outer_key);
        let inner_key = Rc::new(inner_key);
        let result = Rc::new(result);
        let comparer = Rc::new(comparer);
        Sequence::from_values(move || {
            let inner = inner.clone();
            let inner_key = Rc::clone(&inner_key);
            let outer_key = Rc::clone(&outer_key);
            let result = Rc::clone(&result);
            let comparer = Rc::clone(&comparer);
            let mut table: Option<Table<TK, Q::Item>> = None;
            upstream.iter().map(move |(_, outer)| {
                let table =
                    table.get_or_insert_with(|| materialize(&inner, &*inner_key));
                let key = outer_key(&outer);
                let matches: Vec<Q::Item> = table
                    .iter()
                    .filter(|(candidate, _)| comparer.equals(&key, candidate))
                    .map(|(_, item)| item.clone())
                    .collect();
                result(outer, matches)
            })
        })
    }
}

fn materialize<'a, I, TK>(inner: &Sequence<'a, I>, inner_key: &dyn Fn(&I) -> TK) -> Table<TK, I>
where
    I: 'a,
{
    let table: Vec<(TK, I)> = inner
        .values()
        .map(|item| (inner_key(&item), item))
        .collect();
    trace!(len = table.len(), "join materialized inner source");
    Rc::new(table)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Pet {
        name: &'static str,
        owner: &'static str,
    }

    fn pets() -> Vec<Pet> {
        vec![
            Pet { name: "Daisy", owner: "magnus" },
            Pet { name: "Barley", owner: "terry" },
            Pet { name: "Boots", owner: "terry" },
            Pet { name: "Whiskers", owner: "charlotte" },
        ]
    }

    #[test]
    fn join_orders_outer_then_inner() {
        let people = Sequence::from_vec(vec!["nopet", "magnus", "terry", "charlotte"]);
        let rows = people
            .join(&pets(), |p| *p, |pet| pet.owner, |p, pet| (*p, pet.name))
            .to_vec();
        assert_eq!(
            rows,
            vec![
                ("magnus", "Daisy"),
                ("terry", "Barley"),
                ("terry", "Boots"),
                ("charlotte", "Whiskers"),
            ]
        );
    }

    #[test]
    fn join_with_comparer() {
        let people = Sequence::from_vec(vec!["MAGNUS"]);
        let rows = people
            .join_with(
                &pets(),
                |p| p.to_string(),
                |pet| pet.owner.to_string(),
                |_, pet| pet.name,
                |a: &String, b: &String| a.eq_ignore_ascii_case(b),
            )
            .to_vec();
        assert_eq!(rows, vec!["Daisy"]);
    }

    #[test]
    fn inner_read_once_per_traversal() {
        let reads = Cell::new(0);
        let inner = Sequence::from_values(|| {
            reads.set(reads.get() + 1);
            vec![1, 2, 2]
        });
        let outer = Sequence::from_vec(vec![2, 1, 3]);
        let joined = outer.join(&inner, |o| *o, |i| *i, |o, _| *o);
        assert_eq!(joined.to_vec(), vec![2, 2, 1]);
        assert_eq!(reads.get(), 1);
        assert_eq!(joined.count(), 3);
        assert_eq!(reads.get(), 2);
    }

    #[test]
    fn group_join_keeps_unmatched_outer() {
        let people = Sequence::from_vec(vec!["nopet", "terry"]);
        let rows = people
            .group_join(&pets(), |p| *p, |pet| pet.owner, |p, matched| {
                (p, matched.into_iter().map(|pet| pet.name).collect::<Vec<_>>())
            })
            .to_vec();
        assert_eq!(rows, vec![("nopet", vec![]), ("terry", vec!["Barley", "Boots"])]);
    }
}
