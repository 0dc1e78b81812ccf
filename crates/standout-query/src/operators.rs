//! Streaming projection, filtering, partitioning and concatenation.
//!
//! Every method here is deferred: it returns a new [`Sequence`] and runs no
//! callback until that sequence is traversed. Callbacks are shared through
//! `Rc` because the same pipeline may be traversed many times.

use std::rc::Rc;

use tracing::trace;

use crate::sequence::{deferred, Sequence};
use crate::source::Queryable;

impl<'a, V: 'a, K: 'a> Sequence<'a, V, K> {
    /// Transforms each value, keeping its key.
    ///
    /// ```
    /// use standout_query::Sequence;
    ///
    /// let labels = Sequence::from_vec(vec!["a", "b"])
    ///     .select(|value, position| format!("{position}:{value}"))
    ///     .to_vec();
    /// assert_eq!(labels, vec!["0:a", "1:b"]);
    /// ```
    pub fn select<U, F>(&self, transform: F) -> Sequence<'a, U, K>
    where
        U: 'a,
        F: Fn(V, &K) -> U + 'a,
    {
        let upstream = self.clone();
        let transform = Rc::new(transform);
        Sequence::from_pull(move || {
            let transform = Rc::clone(&transform);
            upstream.iter().map(move |(key, value)| {
                let value = transform(value, &key);
                (key, value)
            })
        })
    }

    /// Keeps the pairs for which `predicate` holds (LINQ `Where`).
    pub fn filter<P>(&self, predicate: P) -> Self
    where
        P: Fn(&V, &K) -> bool + 'a,
    {
        let upstream = self.clone();
        let predicate = Rc::new(predicate);
        Sequence::from_pull(move || {
            let predicate = Rc::clone(&predicate);
            upstream
                .iter()
                .filter(move |(key, value)| predicate(value, key))
        })
    }

    /// Maps each value to a collection and flattens the results.
    ///
    /// Each inner collection is drained before the next outer element is
    /// pulled.
    pub fn select_many<C, F>(&self, selector: F) -> Sequence<'a, C::Item>
    where
        C: IntoIterator + 'a,
        C::IntoIter: 'a,
        C::Item: 'a,
        F: Fn(V, &K) -> C + 'a,
    {
        let upstream = self.clone();
        let selector = Rc::new(selector);
        Sequence::from_values(move || {
            let selector = Rc::clone(&selector);
            upstream
                .iter()
                .flat_map(move |(key, value)| selector(value, &key))
        })
    }

    /// Like [`select_many`](Self::select_many), combining each outer value
    /// with each of its inner elements through `result`.
    pub fn select_many_with<C, R, F, G>(&self, collection: F, result: G) -> Sequence<'a, R>
    where
        C: IntoIterator,
        C::IntoIter: 'a,
        R: 'a,
        F: Fn(&V, &K) -> C + 'a,
        G: Fn(&V, C::Item) -> R + 'a,
    {
        let upstream = self.clone();
        let collection = Rc::new(collection);
        let result = Rc::new(result);
        Sequence::from_values(move || {
            let collection = Rc::clone(&collection);
            let result = Rc::clone(&result);
            upstream.iter().flat_map(move |(key, outer)| {
                let inner = collection(&outer, &key);
                let result = Rc::clone(&result);
                inner.into_iter().map(move |item| result(&outer, item))
            })
        })
    }

    /// Drops the first `count` elements. A count of zero or less is a no-op.
    pub fn skip(&self, count: isize) -> Self {
        let upstream = self.clone();
        let count = clamp_count(count);
        Sequence::from_pull(move || upstream.iter().skip(count))
    }

    /// Drops elements while `predicate` holds, then passes everything.
    ///
    /// The predicate is not called again after it first returns `false`.
    pub fn skip_while<P>(&self, predicate: P) -> Self
    where
        P: Fn(&V, &K) -> bool + 'a,
    {
        let upstream = self.clone();
        let predicate = Rc::new(predicate);
        Sequence::from_pull(move || {
            let predicate = Rc::clone(&predicate);
            upstream
                .iter()
                .skip_while(move |(key, value)| predicate(value, key))
        })
    }

    /// Yields at most `count` elements. A count of zero or less is empty.
    ///
    /// The upstream is never pulled past the last element taken.
    pub fn take(&self, count: isize) -> Self {
        let upstream = self.clone();
        let count = clamp_count(count);
        Sequence::from_pull(move || upstream.iter().take(count))
    }

    /// Yields elements until `predicate` first fails. The failing element is
    /// dropped.
    pub fn take_while<P>(&self, predicate: P) -> Self
    where
        P: Fn(&V, &K) -> bool + 'a,
    {
        let upstream = self.clone();
        let predicate = Rc::new(predicate);
        Sequence::from_pull(move || {
            let predicate = Rc::clone(&predicate);
            upstream
                .iter()
                .take_while(move |(key, value)| predicate(value, key))
        })
    }

    /// Yields this sequence, then `second`.
    ///
    /// Both halves are renumbered from 0: upstream keys of this sequence are
    /// dropped too, and the elements of `second` continue right after the
    /// last position of this sequence.
    pub fn concat<Q>(&self, second: &Q) -> Sequence<'a, V>
    where
        Q: Queryable<'a, Item = V> + ?Sized,
    {
        let first = self.clone();
        let second = second.query();
        Sequence::from_values(move || first.values().chain(second.values()))
    }

    /// Adds `element` after the last element.
    pub fn append(&self, element: V) -> Sequence<'a, V>
    where
        V: Clone,
    {
        let upstream = self.clone();
        Sequence::from_values(move || upstream.values().chain(std::iter::once(element.clone())))
    }

    /// Adds `element` before the first element.
    pub fn prepend(&self, element: V) -> Sequence<'a, V>
    where
        V: Clone,
    {
        let upstream = self.clone();
        Sequence::from_values(move || std::iter::once(element.clone()).chain(upstream.values()))
    }

    /// Yields `default` once at position 0 if this sequence is empty,
    /// otherwise the values unchanged.
    pub fn default_if_empty(&self, default: V) -> Sequence<'a, V>
    where
        V: Clone,
    {
        let upstream = self.clone();
        Sequence::from_values(move || DefaultIfEmpty {
            upstream: upstream.values(),
            default: Some(default.clone()),
        })
    }

    /// Pairs elements by position, stopping at the shorter sequence.
    pub fn zip<Q>(&self, second: &Q) -> Sequence<'a, (V, Q::Item)>
    where
        Q: Queryable<'a> + ?Sized,
    {
        self.zip_with(second, |first, second| (first, second))
    }

    /// Combines elements by position with `result`, stopping at the shorter
    /// sequence.
    pub fn zip_with<Q, R, F>(&self, second: &Q, result: F) -> Sequence<'a, R>
    where
        Q: Queryable<'a> + ?Sized,
        R: 'a,
        F: Fn(V, Q::Item) -> R + 'a,
    {
        let first = self.clone();
        let second = second.query();
        let result = Rc::new(result);
        Sequence::from_values(move || {
            let result = Rc::clone(&result);
            first
                .values()
                .zip(second.values())
                .map(move |(a, b)| result(a, b))
        })
    }

    /// Yields the values back to front.
    ///
    /// Buffering: the upstream is drained on the first pull of each
    /// traversal.
    pub fn reverse(&self) -> Sequence<'a, V> {
        let upstream = self.clone();
        Sequence::from_values(move || {
            let upstream = upstream.clone();
            deferred(move || {
                let mut buffer: Vec<V> = upstream.values().collect();
                trace!(len = buffer.len(), "reverse buffered upstream");
                buffer.reverse();
                buffer.into_iter()
            })
        })
    }
}

struct DefaultIfEmpty<I, V> {
    upstream: I,
    default: Option<V>,
}

impl<I: Iterator<Item = V>, V> Iterator for DefaultIfEmpty<I, V> {
    type Item = V;

    fn next(&mut self) -> Option<V> {
        match self.upstream.next() {
            Some(value) => {
                self.default = None;
                Some(value)
            }
            None => self.default.take(),
        }
    }
}

fn clamp_count(count: isize) -> usize {
    usize::try_from(count).unwrap_or(0)
}
