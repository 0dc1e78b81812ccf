use std::fmt;
use std::rc::Rc;

use tracing::debug;

use super::{live, storage, Storage};
use crate::compare::{DefaultEquality, EqualityComparer};
use crate::sequence::Sequence;
use crate::source::Queryable;

/// A set of unique values, kept in insertion order.
///
/// Uniqueness is decided by an [`EqualityComparer`], so membership tests scan
/// the stored values. Values need not be hashable, but `add`, `contains` and
/// `remove` are linear and building a set of `n` distinct values is
/// quadratic. Use `std::collections::HashSet` for large sets of `Hash` values.
///
/// ```
/// use standout_query::HashSet;
///
/// let mut tags = HashSet::with_comparer(|a: &String, b: &String| a.eq_ignore_ascii_case(b));
/// assert!(tags.add("Rust".to_string()));
/// assert!(!tags.add("RUST".to_string()));
/// assert_eq!(tags.len(), 1);
/// ```
pub struct HashSet<T> {
    items: Storage<T>,
    comparer: Rc<dyn EqualityComparer<T>>,
}

impl<T> HashSet<T> {
    /// An empty set that compares with `==`.
    pub fn new() -> Self
    where
        T: PartialEq,
    {
        HashSet::with_comparer(DefaultEquality)
    }

    /// An empty set that compares with `comparer`.
    pub fn with_comparer<C>(comparer: C) -> Self
    where
        C: EqualityComparer<T> + 'static,
    {
        HashSet {
            items: storage(Vec::new()),
            comparer: Rc::new(comparer),
        }
    }

    /// A set of the distinct values in `values`; the first occurrence wins.
    pub fn from_values<I>(values: I) -> Self
    where
        T: PartialEq,
        I: IntoIterator<Item = T>,
    {
        HashSet::from_values_with(values, DefaultEquality)
    }

    /// [`from_values`](Self::from_values) with a custom comparer.
    pub fn from_values_with<I, C>(values: I, comparer: C) -> Self
    where
        I: IntoIterator<Item = T>,
        C: EqualityComparer<T> + 'static,
    {
        let mut set = HashSet::with_comparer(comparer);
        set.union_with(values);
        set
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Adds `item` unless an equal value is present. Returns whether it was
    /// added.
    pub fn add(&mut self, item: T) -> bool {
        if self.contains(&item) {
            debug!("hash set rejected duplicate value");
            return false;
        }
        self.items.borrow_mut().push(item);
        true
    }

    /// Removes the value equal to `item`. Returns whether one was present.
    pub fn remove(&mut self, item: &T) -> bool {
        match self.position(item) {
            Some(index) => {
                self.items.borrow_mut().remove(index);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, item: &T) -> bool {
        self.position(item).is_some()
    }

    pub fn clear(&mut self) {
        self.items.borrow_mut().clear();
    }

    /// Adds every value of `other` not already present.
    pub fn union_with<I>(&mut self, other: I)
    where
        I: IntoIterator<Item = T>,
    {
        for item in other {
            self.add(item);
        }
    }

    /// Keeps only the values that also appear in `other`.
    pub fn intersect_with<I>(&mut self, other: I)
    where
        I: IntoIterator<Item = T>,
    {
        let other: Vec<T> = other.into_iter().collect();
        let comparer = Rc::clone(&self.comparer);
        self.items
            .borrow_mut()
            .retain(|item| other.iter().any(|candidate| comparer.equals(item, candidate)));
    }

    /// Removes every value that appears in `other`.
    pub fn except_with<I>(&mut self, other: I)
    where
        I: IntoIterator<Item = T>,
    {
        for item in other {
            self.remove(&item);
        }
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items.borrow().clone()
    }

    fn position(&self, item: &T) -> Option<usize> {
        self.items
            .borrow()
            .iter()
            .position(|candidate| self.comparer.equals(candidate, item))
    }
}

impl<T: PartialEq> Default for HashSet<T> {
    fn default() -> Self {
        HashSet::new()
    }
}

/// Copies the values and shares the comparer.
impl<T: Clone> Clone for HashSet<T> {
    fn clone(&self) -> Self {
        HashSet {
            items: storage(self.to_vec()),
            comparer: Rc::clone(&self.comparer),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for HashSet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.items.borrow().iter()).finish()
    }
}

impl<T: PartialEq> FromIterator<T> for HashSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        HashSet::from_values(iter)
    }
}

impl<'a, T: Clone + 'a> Queryable<'a> for HashSet<T> {
    type Key = usize;
    type Item = T;

    fn query(&self) -> Sequence<'a, T> {
        live(&self.items)
    }
}
