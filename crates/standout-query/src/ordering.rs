//! Sorting: OrderBy / ThenBy chains.
//!
//! An [`OrderedSequence`] keeps the unsorted upstream and one composed
//! comparator. Every `then_by` composes a new comparator over the same
//! upstream, so the sort itself stays deferred and always sees the source's
//! current contents.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use tracing::trace;

use crate::compare::default_compare;
use crate::sequence::{deferred, Sequence};
use crate::source::Queryable;

/// Sort direction.
#[derive(Debug, Clone, Copy)]
enum Dir {
    Asc,
    Desc,
}

impl Dir {
    /// `Desc` swaps the operands, which reverses any comparer's verdict
    /// without touching its `Equal` results.
    fn arrange<'t, T: ?Sized>(self, a: &'t T, b: &'t T) -> (&'t T, &'t T) {
        match self {
            Dir::Asc => (a, b),
            Dir::Desc => (b, a),
        }
    }
}

type Comparator<'a, V> = Rc<dyn Fn(&V, &V) -> Ordering + 'a>;

/// Builds a value comparator from a key selector, a key comparer and a
/// direction.
fn by_key<'a, V, SK, KS, C>(key_selector: KS, comparer: C, dir: Dir) -> Comparator<'a, V>
where
    V: 'a,
    SK: 'a,
    KS: Fn(&V) -> SK + 'a,
    C: Fn(&SK, &SK) -> Ordering + 'a,
{
    Rc::new(move |a: &V, b: &V| {
        let (a, b) = dir.arrange(a, b);
        comparer(&key_selector(a), &key_selector(b))
    })
}

/// A sequence sorted by one or more keys.
///
/// Dereferences to the sorted [`Sequence`], so every operator and terminal
/// operation is available directly.
///
/// ```
/// use standout_query::Sequence;
///
/// let people = Sequence::from_vec(vec![("ann", 31), ("bob", 25), ("cy", 31)]);
/// let names: Vec<_> = people
///     .order_by_descending(|p| p.1)
///     .then_by(|p| p.0)
///     .select(|p, _| p.0)
///     .to_vec();
/// assert_eq!(names, vec!["ann", "cy", "bob"]);
/// ```
pub struct OrderedSequence<'a, V> {
    upstream: Sequence<'a, V>,
    comparator: Comparator<'a, V>,
    sorted: Sequence<'a, V>,
}

impl<V> Clone for OrderedSequence<'_, V> {
    fn clone(&self) -> Self {
        OrderedSequence {
            upstream: self.upstream.clone(),
            comparator: Rc::clone(&self.comparator),
            sorted: self.sorted.clone(),
        }
    }
}

impl<V> fmt::Debug for OrderedSequence<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedSequence").finish_non_exhaustive()
    }
}

impl<'a, V: 'a> OrderedSequence<'a, V> {
    fn new(upstream: Sequence<'a, V>, comparator: Comparator<'a, V>) -> Self {
        let sorted = {
            let upstream = upstream.clone();
            let comparator = Rc::clone(&comparator);
            Sequence::from_values(move || {
                let upstream = upstream.clone();
                let comparator = Rc::clone(&comparator);
                deferred(move || {
                    let mut buffer: Vec<V> = upstream.values().collect();
                    trace!(len = buffer.len(), "order_by buffered upstream");
                    // stable: ties keep upstream order
                    buffer.sort_by(|a, b| comparator(a, b));
                    buffer.into_iter()
                })
            })
        };
        OrderedSequence {
            upstream,
            comparator,
            sorted,
        }
    }

    /// Breaks ties with an ascending secondary key.
    pub fn then_by<SK, KS>(&self, key_selector: KS) -> Self
    where
        SK: PartialOrd + 'a,
        KS: Fn(&V) -> SK + 'a,
    {
        self.then_in(by_key(key_selector, default_compare, Dir::Asc))
    }

    /// Breaks ties with a descending secondary key.
    pub fn then_by_descending<SK, KS>(&self, key_selector: KS) -> Self
    where
        SK: PartialOrd + 'a,
        KS: Fn(&V) -> SK + 'a,
    {
        self.then_in(by_key(key_selector, default_compare, Dir::Desc))
    }

    /// Breaks ties with an ascending secondary key and a custom key comparer.
    pub fn then_by_with<SK, KS, C>(&self, key_selector: KS, comparer: C) -> Self
    where
        SK: 'a,
        KS: Fn(&V) -> SK + 'a,
        C: Fn(&SK, &SK) -> Ordering + 'a,
    {
        self.then_in(by_key(key_selector, comparer, Dir::Asc))
    }

    /// Breaks ties with a descending secondary key and a custom key comparer.
    pub fn then_by_descending_with<SK, KS, C>(&self, key_selector: KS, comparer: C) -> Self
    where
        SK: 'a,
        KS: Fn(&V) -> SK + 'a,
        C: Fn(&SK, &SK) -> Ordering + 'a,
    {
        self.then_in(by_key(key_selector, comparer, Dir::Desc))
    }

    /// The sorted sequence.
    pub fn as_sequence(&self) -> &Sequence<'a, V> {
        &self.sorted
    }

    fn then_in(&self, secondary: Comparator<'a, V>) -> Self {
        let primary = Rc::clone(&self.comparator);
        let composed: Comparator<'a, V> = Rc::new(move |a: &V, b: &V| match primary(a, b) {
            Ordering::Equal => secondary(a, b),
            decided => decided,
        });
        OrderedSequence::new(self.upstream.clone(), composed)
    }
}

impl<'a, V> Deref for OrderedSequence<'a, V> {
    type Target = Sequence<'a, V>;

    fn deref(&self) -> &Sequence<'a, V> {
        &self.sorted
    }
}

impl<'a, V: 'a> Queryable<'a> for OrderedSequence<'a, V> {
    type Key = usize;
    type Item = V;

    fn query(&self) -> Sequence<'a, V> {
        self.sorted.clone()
    }
}

impl<'a, V: 'a, K: 'a> Sequence<'a, V, K> {
    /// Sorts ascending by the key `key_selector` returns.
    ///
    /// Buffering and stable. Keys are renumbered in sorted order.
    pub fn order_by<SK, KS>(&self, key_selector: KS) -> OrderedSequence<'a, V>
    where
        SK: PartialOrd + 'a,
        KS: Fn(&V) -> SK + 'a,
    {
        self.order_in(by_key(key_selector, default_compare, Dir::Asc))
    }

    /// Sorts descending by key.
    pub fn order_by_descending<SK, KS>(&self, key_selector: KS) -> OrderedSequence<'a, V>
    where
        SK: PartialOrd + 'a,
        KS: Fn(&V) -> SK + 'a,
    {
        self.order_in(by_key(key_selector, default_compare, Dir::Desc))
    }

    /// Sorts ascending by key using a custom key comparer.
    pub fn order_by_with<SK, KS, C>(&self, key_selector: KS, comparer: C) -> OrderedSequence<'a, V>
    where
        SK: 'a,
        KS: Fn(&V) -> SK + 'a,
        C: Fn(&SK, &SK) -> Ordering + 'a,
    {
        self.order_in(by_key(key_selector, comparer, Dir::Asc))
    }

    /// Sorts descending by key using a custom key comparer.
    pub fn order_by_descending_with<SK, KS, C>(
        &self,
        key_selector: KS,
        comparer: C,
    ) -> OrderedSequence<'a, V>
    where
        SK: 'a,
        KS: Fn(&V) -> SK + 'a,
        C: Fn(&SK, &SK) -> Ordering + 'a,
    {
        self.order_in(by_key(key_selector, comparer, Dir::Desc))
    }

    fn order_in(&self, comparator: Comparator<'a, V>) -> OrderedSequence<'a, V> {
        OrderedSequence::new(self.renumber(), comparator)
    }
}
