//! Immediate operations.
//!
//! Each method here starts one fresh traversal, drives it as far as it
//! needs, and returns a concrete value. Nothing is cached between calls, so
//! calling the same terminal twice re-reads the source.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::iter::Sum;

use num_traits::ToPrimitive;
use tracing::trace;

use crate::collections::{Dictionary, HashSet, List};
use crate::compare::{
    always_true, default_compare, is_unordered, DefaultEquality, EqualityComparer,
};
use crate::error::{QueryError, Result};
use crate::sequence::Sequence;
use crate::source::Queryable;

/// Outcome of a lookup that may find nothing.
enum Found<V> {
    One(V),
    /// The source produced no elements at all.
    Empty,
    /// The source had elements but none matched.
    Missed,
}

impl<V> Found<V> {
    fn into_result(self) -> Result<V> {
        match self {
            Found::One(value) => Ok(value),
            Found::Empty => Err(QueryError::EmptySequence),
            Found::Missed => Err(QueryError::NoMatch),
        }
    }

    fn or(self, default: V) -> V {
        match self {
            Found::One(value) => value,
            Found::Empty | Found::Missed => default,
        }
    }
}

impl<'a, V: 'a, K: 'a> Sequence<'a, V, K> {
    /// Folds the values with `func`, seeding with the first value.
    ///
    /// Fails with [`QueryError::NoElements`] on an empty source.
    pub fn aggregate<F>(&self, mut func: F) -> Result<V>
    where
        F: FnMut(V, V) -> V,
    {
        let mut values = self.values();
        let seed = values.next().ok_or(QueryError::NoElements)?;
        Ok(values.fold(seed, |acc, value| func(acc, value)))
    }

    /// Folds the values with `func`, starting from `seed`.
    pub fn aggregate_seed<A, F>(&self, seed: A, func: F) -> A
    where
        F: FnMut(A, V) -> A,
    {
        self.values().fold(seed, func)
    }

    /// Folds from `seed`, then maps the accumulator through `result`.
    pub fn aggregate_select<A, R, F, S>(&self, seed: A, func: F, result: S) -> R
    where
        F: FnMut(A, V) -> A,
        S: FnOnce(A) -> R,
    {
        result(self.aggregate_seed(seed, func))
    }

    /// Returns `true` if every value satisfies `predicate`. Stops at the
    /// first failure; an empty source yields `true`.
    pub fn all<P>(&self, mut predicate: P) -> bool
    where
        P: FnMut(&V) -> bool,
    {
        self.values().all(|value| predicate(&value))
    }

    /// Returns `true` if the source has at least one element. Pulls at most
    /// one.
    pub fn any(&self) -> bool {
        self.iter().next().is_some()
    }

    /// Returns `true` if any value satisfies `predicate`.
    pub fn any_where<P>(&self, mut predicate: P) -> bool
    where
        P: FnMut(&V) -> bool,
    {
        self.values().any(|value| predicate(&value))
    }

    /// Arithmetic mean of the values, as `f64`.
    ///
    /// An empty source yields `NaN`.
    ///
    /// ```
    /// use standout_query::Sequence;
    ///
    /// assert_eq!(Sequence::from_vec(vec![1, 2, 6]).average(), 3.0);
    /// assert!(Sequence::<i32>::empty().average().is_nan());
    /// ```
    pub fn average(&self) -> f64
    where
        V: ToPrimitive,
    {
        self.average_by(|value| value)
    }

    /// Arithmetic mean of `selector` applied to each value.
    ///
    /// Values with no `f64` representation count as `NaN`.
    pub fn average_by<N, F>(&self, mut selector: F) -> f64
    where
        N: ToPrimitive,
        F: FnMut(V) -> N,
    {
        let (total, count) = self.values().fold((0.0, 0usize), |(total, count), value| {
            let number = selector(value).to_f64().unwrap_or(f64::NAN);
            (total + number, count + 1)
        });
        trace!(count, "average finished");
        total / count as f64
    }

    /// Returns `true` if any value equals `value`.
    pub fn contains(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.contains_with(value, DefaultEquality)
    }

    /// [`contains`](Self::contains) with a custom comparer.
    pub fn contains_with<C>(&self, value: &V, comparer: C) -> bool
    where
        C: EqualityComparer<V>,
    {
        self.values().any(|candidate| comparer.equals(&candidate, value))
    }

    /// Number of elements.
    pub fn count(&self) -> usize {
        let count = self.iter().count();
        trace!(count, "count finished");
        count
    }

    /// Number of values satisfying `predicate`.
    pub fn count_where<P>(&self, mut predicate: P) -> usize
    where
        P: FnMut(&V) -> bool,
    {
        self.values().filter(|value| predicate(value)).count()
    }

    /// The value at 0-based position `index`.
    ///
    /// A negative index or one past the end is
    /// [`QueryError::IndexOutOfRange`].
    pub fn element_at(&self, index: isize) -> Result<V> {
        usize::try_from(index)
            .ok()
            .and_then(|position| self.values().nth(position))
            .ok_or(QueryError::IndexOutOfRange { index })
    }

    /// The value at `index`, or `default` when out of range.
    pub fn element_at_or_default(&self, index: isize, default: V) -> V {
        self.element_at(index).unwrap_or(default)
    }

    /// The first value.
    ///
    /// An empty source is [`QueryError::EmptySequence`].
    pub fn first(&self) -> Result<V> {
        self.first_in(always_true).into_result()
    }

    /// The first value satisfying `predicate`.
    ///
    /// An empty source is [`QueryError::EmptySequence`]; a non-empty source
    /// with no match is [`QueryError::NoMatch`].
    pub fn first_where<P>(&self, predicate: P) -> Result<V>
    where
        P: FnMut(&V) -> bool,
    {
        self.first_in(predicate).into_result()
    }

    /// The first value, or `default` when the source is empty.
    pub fn first_or_default(&self, default: V) -> V {
        self.first_in(always_true).or(default)
    }

    /// The first value satisfying `predicate`, or `default`.
    pub fn first_or_default_where<P>(&self, predicate: P, default: V) -> V
    where
        P: FnMut(&V) -> bool,
    {
        self.first_in(predicate).or(default)
    }

    /// The last value.
    ///
    /// An empty source is [`QueryError::EmptySequence`].
    pub fn last(&self) -> Result<V> {
        self.last_in(always_true).into_result()
    }

    /// The last value satisfying `predicate`. Errors as
    /// [`first_where`](Self::first_where).
    pub fn last_where<P>(&self, predicate: P) -> Result<V>
    where
        P: FnMut(&V) -> bool,
    {
        self.last_in(predicate).into_result()
    }

    /// The last value, or `default` when the source is empty.
    pub fn last_or_default(&self, default: V) -> V {
        self.last_in(always_true).or(default)
    }

    /// The last value satisfying `predicate`, or `default`.
    pub fn last_or_default_where<P>(&self, predicate: P, default: V) -> V
    where
        P: FnMut(&V) -> bool,
    {
        self.last_in(predicate).or(default)
    }

    /// The only value.
    ///
    /// Fails with [`QueryError::EmptySequence`] when empty and
    /// [`QueryError::MoreThanOneElement`] when there is more than one.
    pub fn single(&self) -> Result<V> {
        self.single_in(always_true, QueryError::MoreThanOneElement)?
            .into_result()
    }

    /// The only value satisfying `predicate`.
    ///
    /// Fails with [`QueryError::MoreThanOneMatch`] when several match.
    pub fn single_where<P>(&self, predicate: P) -> Result<V>
    where
        P: FnMut(&V) -> bool,
    {
        self.single_in(predicate, QueryError::MoreThanOneMatch)?
            .into_result()
    }

    /// The only value, or `default` when empty. Still fails on more than one.
    pub fn single_or_default(&self, default: V) -> Result<V> {
        Ok(self
            .single_in(always_true, QueryError::MoreThanOneElement)?
            .or(default))
    }

    /// The only value satisfying `predicate`, or `default` when none does.
    /// Still fails when several match.
    pub fn single_or_default_where<P>(&self, predicate: P, default: V) -> Result<V>
    where
        P: FnMut(&V) -> bool,
    {
        Ok(self
            .single_in(predicate, QueryError::MoreThanOneMatch)?
            .or(default))
    }

    /// The largest value.
    ///
    /// Values that do not compare with themselves (NaN) are skipped, unless
    /// the source holds nothing else. An empty source is
    /// [`QueryError::NoElements`].
    pub fn max(&self) -> Result<V>
    where
        V: PartialOrd,
    {
        extreme(self.values(), Ordering::Greater)
    }

    /// The smallest value. NaN is skipped the same way as in [`Self::max`].
    pub fn min(&self) -> Result<V>
    where
        V: PartialOrd,
    {
        extreme(self.values(), Ordering::Less)
    }

    /// The largest result of `selector` over the values.
    pub fn max_by<M, F>(&self, selector: F) -> Result<M>
    where
        M: PartialOrd,
        F: FnMut(V) -> M,
    {
        extreme(self.values().map(selector), Ordering::Greater)
    }

    /// The smallest result of `selector` over the values.
    pub fn min_by<M, F>(&self, selector: F) -> Result<M>
    where
        M: PartialOrd,
        F: FnMut(V) -> M,
    {
        extreme(self.values().map(selector), Ordering::Less)
    }

    /// Returns `true` if `other` yields equal values in the same order and
    /// has the same length. Keys are ignored.
    pub fn sequence_equal<Q>(&self, other: &Q) -> bool
    where
        Q: Queryable<'a, Item = V> + ?Sized,
        V: PartialEq,
    {
        self.sequence_equal_with(other, DefaultEquality)
    }

    /// [`sequence_equal`](Self::sequence_equal) with a custom comparer.
    pub fn sequence_equal_with<Q, C>(&self, other: &Q, comparer: C) -> bool
    where
        Q: Queryable<'a, Item = V> + ?Sized,
        C: EqualityComparer<V>,
    {
        let mut left = self.values();
        let mut right = other.query().values();
        loop {
            match (left.next(), right.next()) {
                (None, None) => return true,
                (Some(a), Some(b)) if comparer.equals(&a, &b) => {}
                _ => return false,
            }
        }
    }

    /// Sum of the values. An empty source yields the additive identity.
    pub fn sum(&self) -> V
    where
        V: Sum<V>,
    {
        self.values().sum()
    }

    /// Sum of `selector` applied to each value.
    pub fn sum_by<S, F>(&self, selector: F) -> S
    where
        S: Sum<S>,
        F: FnMut(V) -> S,
    {
        self.values().map(selector).sum()
    }

    /// Collects the values in order.
    pub fn to_vec(&self) -> Vec<V> {
        let values: Vec<V> = self.values().collect();
        trace!(len = values.len(), "to_vec finished");
        values
    }

    /// Collects `(key, value)` pairs into a map. A repeated key keeps the
    /// value seen last.
    pub fn to_map(&self) -> BTreeMap<K, V>
    where
        K: Ord,
    {
        self.iter().collect()
    }

    /// Collects the values into a new [`List`].
    pub fn to_list(&self) -> List<V> {
        List::from(self.to_vec())
    }

    /// Collects the distinct values into a new [`HashSet`].
    ///
    /// Each insert scans the values kept so far, so this is quadratic in the
    /// number of distinct values. Prefer `std::collections::HashSet` for
    /// large inputs of `Hash` values.
    pub fn to_hash_set(&self) -> HashSet<V>
    where
        V: PartialEq,
    {
        HashSet::from_values(self.values())
    }

    /// Collects the values into a [`HashSet`] that matches with `comparer`.
    pub fn to_hash_set_with<C>(&self, comparer: C) -> HashSet<V>
    where
        C: EqualityComparer<V> + 'static,
    {
        HashSet::from_values_with(self.values(), comparer)
    }

    /// Builds a [`Dictionary`] from each value's key and element.
    ///
    /// Fails with [`QueryError::DuplicateKey`] if two values produce equal
    /// keys.
    pub fn to_dictionary<DK, DV, KS, VS>(
        &self,
        mut key_selector: KS,
        mut value_selector: VS,
    ) -> Result<Dictionary<DK, DV>>
    where
        DK: PartialEq,
        KS: FnMut(&V) -> DK,
        VS: FnMut(V) -> DV,
    {
        let mut dictionary = Dictionary::new();
        for value in self.values() {
            let key = key_selector(&value);
            dictionary.add(key, value_selector(value))?;
        }
        Ok(dictionary)
    }

    /// Calls `action` with each value and its key.
    pub fn for_each<F>(&self, mut action: F)
    where
        F: FnMut(V, K),
    {
        for (key, value) in self.iter() {
            action(value, key);
        }
    }

    fn first_in<P>(&self, mut predicate: P) -> Found<V>
    where
        P: FnMut(&V) -> bool,
    {
        let mut seen = false;
        for value in self.values() {
            if predicate(&value) {
                return Found::One(value);
            }
            seen = true;
        }
        if seen {
            Found::Missed
        } else {
            Found::Empty
        }
    }

    fn last_in<P>(&self, mut predicate: P) -> Found<V>
    where
        P: FnMut(&V) -> bool,
    {
        let mut found = Found::Empty;
        for value in self.values() {
            if predicate(&value) {
                found = Found::One(value);
            } else if matches!(found, Found::Empty) {
                found = Found::Missed;
            }
        }
        found
    }

    /// Stops at the second match, failing with `multiple`.
    fn single_in<P>(&self, mut predicate: P, multiple: QueryError) -> Result<Found<V>>
    where
        P: FnMut(&V) -> bool,
    {
        let mut found = Found::Empty;
        for value in self.values() {
            if !predicate(&value) {
                if matches!(found, Found::Empty) {
                    found = Found::Missed;
                }
                continue;
            }
            if let Found::One(_) = found {
                return Err(multiple);
            }
            found = Found::One(value);
        }
        Ok(found)
    }
}

/// Keeps the first value no later value beats in direction `wins`.
/// Unordered values only survive when nothing else is seen.
fn extreme<V, I>(mut values: I, wins: Ordering) -> Result<V>
where
    V: PartialOrd,
    I: Iterator<Item = V>,
{
    let first = values.next().ok_or(QueryError::NoElements)?;
    Ok(values.fold(first, |best, value| {
        if is_unordered(&value) {
            best
        } else if is_unordered(&best) || default_compare(&value, &best) == wins {
            value
        } else {
            best
        }
    }))
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::error::ErrorKind;

    fn numbers<'a>() -> Sequence<'a, i32> {
        Sequence::from_vec(vec![3, 8, 1, 8, 5])
    }

    #[test]
    fn aggregate_variants() {
        assert_eq!(numbers().aggregate(|a, b| a * 10 + b), Ok(38185));
        assert_eq!(
            Sequence::<i32>::empty().aggregate(|a, b| a + b),
            Err(QueryError::NoElements)
        );
        assert_eq!(numbers().aggregate_seed(100, |acc, v| acc - v), 75);
        assert_eq!(
            numbers().aggregate_select(0, |acc, v| acc + v, |total| total * 2),
            50
        );
    }

    #[test]
    fn all_and_any() {
        assert!(numbers().all(|v| *v > 0));
        assert!(!numbers().all(|v| *v > 1));
        assert!(Sequence::<i32>::empty().all(|_| false));
        assert!(numbers().any());
        assert!(!Sequence::<i32>::empty().any());
        assert!(numbers().any_where(|v| *v == 5));
    }

    #[test]
    fn any_pulls_one_element() {
        let pulled = Cell::new(0);
        let seq = numbers().select(|v, _| {
            pulled.set(pulled.get() + 1);
            v
        });
        assert!(seq.any());
        assert_eq!(pulled.get(), 1);
    }

    #[test]
    fn average_and_sum() {
        assert_eq!(numbers().average(), 5.0);
        assert!(Sequence::<f64>::empty().average().is_nan());
        assert_eq!(numbers().average_by(|v| v * 2), 10.0);
        assert_eq!(numbers().sum(), 25);
        assert_eq!(Sequence::<i32>::empty().sum(), 0);
        assert_eq!(numbers().sum_by(|v| v as i64 * 1_000_000_000), 25_000_000_000);
    }

    #[test]
    fn contains_and_count() {
        assert!(numbers().contains(&8));
        assert!(!numbers().contains(&7));
        assert!(numbers().contains_with(&7, |a: &i32, b: &i32| (a - b).abs() <= 1));
        assert_eq!(numbers().count(), 5);
        assert_eq!(numbers().count_where(|v| *v == 8), 2);
    }

    #[test]
    fn element_at_bounds() {
        assert_eq!(numbers().element_at(0), Ok(3));
        assert_eq!(numbers().element_at(4), Ok(5));
        assert_eq!(
            numbers().element_at(5),
            Err(QueryError::IndexOutOfRange { index: 5 })
        );
        assert_eq!(
            numbers().element_at(-1).map_err(|e| e.kind()),
            Err(ErrorKind::Bounds)
        );
        assert_eq!(numbers().element_at_or_default(9, -1), -1);
        assert_eq!(numbers().element_at_or_default(-3, -1), -1);
    }

    #[test]
    fn first_and_last_distinguish_empty_from_no_match() {
        let empty = Sequence::<i32>::empty();
        assert_eq!(numbers().first(), Ok(3));
        assert_eq!(numbers().first_where(|v| *v > 4), Ok(8));
        assert_eq!(empty.first(), Err(QueryError::EmptySequence));
        assert_eq!(empty.first_where(|_| true), Err(QueryError::EmptySequence));
        assert_eq!(numbers().first_where(|v| *v > 10), Err(QueryError::NoMatch));
        assert_eq!(numbers().first_or_default_where(|v| *v > 10, 0), 0);
        assert_eq!(empty.first_or_default(7), 7);

        assert_eq!(numbers().last(), Ok(5));
        assert_eq!(numbers().last_where(|v| *v == 8), Ok(8));
        assert_eq!(empty.last(), Err(QueryError::EmptySequence));
        assert_eq!(numbers().last_where(|v| *v > 10), Err(QueryError::NoMatch));
        assert_eq!(numbers().last_or_default_where(|v| *v < 3, 0), 1);
        assert_eq!(empty.last_or_default(-1), -1);
    }

    #[test]
    fn single_variants() {
        let one = Sequence::from_vec(vec![42]);
        assert_eq!(one.single(), Ok(42));
        assert_eq!(numbers().single(), Err(QueryError::MoreThanOneElement));
        assert_eq!(Sequence::<i32>::empty().single(), Err(QueryError::EmptySequence));
        assert_eq!(numbers().single_where(|v| *v == 1), Ok(1));
        assert_eq!(numbers().single_where(|v| *v == 8), Err(QueryError::MoreThanOneMatch));
        assert_eq!(numbers().single_where(|v| *v == 9), Err(QueryError::NoMatch));
        assert_eq!(Sequence::<i32>::empty().single_or_default(0), Ok(0));
        assert_eq!(numbers().single_or_default(0), Err(QueryError::MoreThanOneElement));
        assert_eq!(numbers().single_or_default_where(|v| *v == 9, 0), Ok(0));
        assert_eq!(
            numbers().single_or_default_where(|v| *v == 8, 0),
            Err(QueryError::MoreThanOneMatch)
        );
    }

    #[test]
    fn single_stops_at_second_match() {
        let pulled = Cell::new(0);
        let seq = Sequence::from_vec(vec![1, 1, 2, 3]).select(|v, _| {
            pulled.set(pulled.get() + 1);
            v
        });
        assert!(seq.single().is_err());
        assert_eq!(pulled.get(), 2);
    }

    #[test]
    fn max_and_min() {
        assert_eq!(numbers().max(), Ok(8));
        assert_eq!(numbers().min(), Ok(1));
        assert_eq!(numbers().max_by(|v| -v), Ok(-1));
        assert_eq!(numbers().min_by(|v| v % 4), Ok(0));
        assert_eq!(Sequence::<i32>::empty().max(), Err(QueryError::NoElements));
        assert_eq!(
            Sequence::<f64>::empty().min().map_err(|e| e.kind()),
            Err(ErrorKind::EmptySequence)
        );
    }

    #[test]
    fn max_and_min_skip_nan() {
        let readings = Sequence::from_vec(vec![f64::NAN, 1.0, 5.0, f64::NAN, 3.0]);
        assert_eq!(readings.max(), Ok(5.0));
        assert_eq!(readings.min(), Ok(1.0));

        let only_nan = Sequence::from_vec(vec![f64::NAN, f64::NAN]);
        assert!(only_nan.max().is_ok_and(f64::is_nan));
        assert!(only_nan.min().is_ok_and(f64::is_nan));
    }

    #[test]
    fn sequence_equal_checks_length() {
        assert!(numbers().sequence_equal(&vec![3, 8, 1, 8, 5]));
        assert!(!numbers().sequence_equal(&vec![3, 8, 1, 8]));
        assert!(!numbers().sequence_equal(&vec![3, 8, 1, 8, 5, 0]));
        assert!(numbers().sequence_equal_with(&vec![4, 9, 2, 9, 6], |a: &i32, b: &i32| {
            b - a == 1
        }));
    }

    #[test]
    fn to_map_keeps_last_key() {
        let pairs = Sequence::from_fn(|| vec![("a", 1), ("b", 2), ("a", 3)]);
        let map = pairs.to_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map["a"], 3);
    }

    #[test]
    fn collections_from_terminals() {
        let list = numbers().to_list();
        assert_eq!(list.len(), 5);
        let set = numbers().to_hash_set();
        assert_eq!(set.to_vec(), vec![3, 8, 1, 5]);
        let loose = numbers().to_hash_set_with(|a: &i32, b: &i32| a % 2 == b % 2);
        assert_eq!(loose.to_vec(), vec![3, 8]);
    }

    #[test]
    fn to_dictionary_rejects_duplicate_keys() {
        let words = Sequence::from_vec(vec!["one", "three"]);
        let by_len = words.to_dictionary(|w| w.len(), |w| w.to_uppercase());
        let by_len = by_len.expect("distinct lengths");
        assert_eq!(by_len.get(&5), Some("THREE".to_string()));
        assert_eq!(
            numbers().to_dictionary(|v| *v, |v| v).map(|d| d.len()),
            Err(QueryError::DuplicateKey)
        );
    }

    #[test]
    fn for_each_sees_keys() {
        let mut seen = Vec::new();
        numbers().take(2).for_each(|value, key| seen.push((key, value)));
        assert_eq!(seen, vec![(0, 3), (1, 8)]);
    }

    #[test]
    fn terminal_inside_predicate() {
        let seq = numbers();
        let above_average = seq.count_where(|v| f64::from(*v) > seq.average());
        assert_eq!(above_average, 2);
    }
}
