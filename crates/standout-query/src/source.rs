//! Turning containers into sequences.
//!
//! [`Queryable`] is the capability every sequence source implements. The
//! constructors on [`Sequence`] cover the common raw containers.

use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

use crate::error::{QueryError, Result};
use crate::sequence::Sequence;

/// A source that can start any number of independent traversals.
///
/// Each call to [`query`](Queryable::query) must produce a sequence that
/// reads the source's contents at traversal time, so changes made between
/// two terminal operations are visible to the second one.
///
/// Operator arguments such as the `second` of [`Sequence::union`] or the
/// `inner` of [`Sequence::join`] accept any `Queryable`.
///
/// # Example
///
/// ```
/// use standout_query::{Queryable, Sequence};
///
/// struct Countdown(i64);
///
/// impl<'a> Queryable<'a> for Countdown {
///     type Key = usize;
///     type Item = i64;
///
///     fn query(&self) -> Sequence<'a, i64> {
///         let from = self.0;
///         Sequence::from_values(move || (1..=from).rev())
///     }
/// }
///
/// let values = Countdown(3).query().to_vec();
/// assert_eq!(values, vec![3, 2, 1]);
/// ```
pub trait Queryable<'a> {
    /// Key type of the produced pairs.
    type Key: 'a;
    /// Value type of the produced pairs.
    type Item: 'a;

    /// Returns a sequence over this source.
    fn query(&self) -> Sequence<'a, Self::Item, Self::Key>;
}

impl<'a, V: 'a, K: 'a> Queryable<'a> for Sequence<'a, V, K> {
    type Key = K;
    type Item = V;

    fn query(&self) -> Sequence<'a, V, K> {
        self.clone()
    }
}

impl<'a, T: Clone + 'a> Queryable<'a> for Vec<T> {
    type Key = usize;
    type Item = T;

    /// Snapshots the vector.
    fn query(&self) -> Sequence<'a, T> {
        Sequence::from_vec(self.clone())
    }
}

impl<'a, K, V> Queryable<'a> for BTreeMap<K, V>
where
    K: Clone + 'a,
    V: Clone + 'a,
{
    type Key = K;
    type Item = V;

    fn query(&self) -> Sequence<'a, V, K> {
        Sequence::from_pairs(self.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}

impl<'a, K, V, S> Queryable<'a> for HashMap<K, V, S>
where
    K: Clone + 'a,
    V: Clone + 'a,
{
    type Key = K;
    type Item = V;

    /// Snapshots the map in its native iteration order.
    fn query(&self) -> Sequence<'a, V, K> {
        Sequence::from_pairs(self.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }
}

impl<'a, V: 'a, K: 'a> Sequence<'a, V, K> {
    /// Builds a sequence from a factory of `(key, value)` pairs.
    ///
    /// The factory runs once per traversal.
    pub fn from_fn<F, I>(factory: F) -> Self
    where
        F: Fn() -> I + 'a,
        I: IntoIterator<Item = (K, V)>,
        I::IntoIter: 'a,
    {
        Sequence::from_pull(move || factory().into_iter())
    }

    /// Wraps any queryable source without evaluating it.
    pub fn from_source<Q>(source: &Q) -> Self
    where
        Q: Queryable<'a, Item = V, Key = K> + ?Sized,
    {
        source.query()
    }
}

impl<'a, MV: 'a, MK: 'a> Sequence<'a, &'a MV, &'a MK> {
    /// Borrows an associative container, yielding its entries in the
    /// container's own iteration order.
    ///
    /// ```
    /// use std::collections::BTreeMap;
    /// use standout_query::Sequence;
    ///
    /// let stock = BTreeMap::from([("apples", 3), ("pears", 0)]);
    /// let empty: Vec<_> = Sequence::from_map(&stock)
    ///     .filter(|count, _| **count == 0)
    ///     .keys()
    ///     .collect();
    /// assert_eq!(empty, vec![&"pears"]);
    /// ```
    pub fn from_map<M>(map: &'a M) -> Self
    where
        M: ?Sized,
        &'a M: IntoIterator<Item = (&'a MK, &'a MV)>,
        <&'a M as IntoIterator>::IntoIter: 'a,
    {
        Sequence::from_fn(move || map)
    }
}

impl<'a, V: Clone + 'a, K: Clone + 'a> Sequence<'a, V, K> {
    /// Owns a list of `(key, value)` pairs and replays them on every traversal.
    pub fn from_pairs(pairs: Vec<(K, V)>) -> Self {
        let pairs: Rc<[(K, V)]> = pairs.into();
        Sequence::from_pull(move || {
            let pairs = Rc::clone(&pairs);
            (0..pairs.len()).map(move |i| pairs[i].clone())
        })
    }
}

impl<'a, V: 'a> Sequence<'a, V> {
    /// Builds a positional sequence from a factory of values.
    ///
    /// ```
    /// use standout_query::Sequence;
    ///
    /// let squares = Sequence::from_values(|| (1..=3).map(|n| n * n));
    /// assert_eq!(squares.to_vec(), vec![1, 4, 9]);
    /// ```
    pub fn from_values<F, I>(factory: F) -> Self
    where
        F: Fn() -> I + 'a,
        I: IntoIterator<Item = V>,
        I::IntoIter: 'a,
    {
        Sequence::from_pull(move || factory().into_iter().enumerate())
    }

    /// A sequence with no elements.
    pub fn empty() -> Self {
        Sequence::from_pull(std::iter::empty)
    }

    /// Owns a vector and replays it on every traversal.
    pub fn from_vec(items: Vec<V>) -> Self
    where
        V: Clone,
    {
        let items: Rc<[V]> = items.into();
        Sequence::from_values(move || {
            let items = Rc::clone(&items);
            (0..items.len()).map(move |i| items[i].clone())
        })
    }

    /// Repeats `value` `count` times.
    ///
    /// A negative count is an [`InvalidArgument`](QueryError::InvalidArgument).
    pub fn repeat(value: V, count: i64) -> Result<Self>
    where
        V: Clone,
    {
        let count = non_negative(count)?;
        Ok(Sequence::from_values(move || {
            std::iter::repeat(value.clone()).take(count)
        }))
    }
}

impl<'a, T: 'a> Sequence<'a, &'a T> {
    /// Borrows a slice, yielding references to its elements.
    pub fn from_slice(items: &'a [T]) -> Self {
        Sequence::from_values(move || items.iter())
    }
}

impl<'a> Sequence<'a, i64> {
    /// `count` consecutive integers starting at `start`.
    ///
    /// A negative count is an [`InvalidArgument`](QueryError::InvalidArgument).
    pub fn range(start: i64, count: i64) -> Result<Self> {
        let count = non_negative(count)?;
        if count > 0 && start.checked_add(count as i64 - 1).is_none() {
            return Err(QueryError::InvalidArgument(format!(
                "range starting at {start} with {count} elements overflows i64"
            )));
        }
        Ok(Sequence::from_values(move || {
            (0..count as i64).map(move |offset| start + offset)
        }))
    }
}

impl<'a, V: Clone + 'a> FromIterator<V> for Sequence<'a, V> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Sequence::from_vec(iter.into_iter().collect())
    }
}

fn non_negative(count: i64) -> Result<usize> {
    usize::try_from(count)
        .map_err(|_| QueryError::InvalidArgument(format!("count must not be negative, got {count}")))
}
