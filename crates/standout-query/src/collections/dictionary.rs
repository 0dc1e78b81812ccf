use std::fmt;
use std::rc::Rc;

use tracing::debug;

use super::{List, ReadOnlyCollection};
use crate::compare::{DefaultEquality, EqualityComparer};
use crate::error::{QueryError, Result};
use crate::sequence::Sequence;
use crate::source::Queryable;

/// An insertion-ordered map with unique keys.
///
/// Keys and values live in two lists kept in lock-step: entry `i` is
/// `(keys[i], values[i])`. Key lookup scans with an [`EqualityComparer`], so
/// keys need neither `Hash` nor `Ord`.
///
/// ```
/// use standout_query::{Dictionary, Queryable};
///
/// let mut ages = Dictionary::new();
/// ages.add("ann", 31).unwrap();
/// ages.add("bob", 25).unwrap();
/// assert!(ages.add("ann", 40).is_err());
///
/// let adults: Vec<_> = ages.query().filter(|age, _| *age >= 30).keys().collect();
/// assert_eq!(adults, vec!["ann"]);
/// ```
pub struct Dictionary<K, V> {
    keys: List<K>,
    values: List<V>,
    comparer: Rc<dyn EqualityComparer<K>>,
}

impl<K, V> Dictionary<K, V> {
    /// An empty dictionary that compares keys with `==`.
    pub fn new() -> Self
    where
        K: PartialEq,
    {
        Dictionary::with_comparer(DefaultEquality)
    }

    /// An empty dictionary that compares keys with `comparer`.
    pub fn with_comparer<C>(comparer: C) -> Self
    where
        C: EqualityComparer<K> + 'static,
    {
        Dictionary {
            keys: List::new(),
            values: List::new(),
            comparer: Rc::new(comparer),
        }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Adds a new entry.
    ///
    /// Fails with [`QueryError::DuplicateKey`] if the key is present.
    pub fn add(&mut self, key: K, value: V) -> Result<()> {
        if self.position(&key).is_some() {
            debug!(len = self.len(), "dictionary rejected duplicate key");
            return Err(QueryError::DuplicateKey);
        }
        self.keys.add(key);
        self.values.add(value);
        Ok(())
    }

    /// Adds a new entry unless the key is present. Returns whether it was
    /// added.
    pub fn try_add(&mut self, key: K, value: V) -> bool {
        self.add(key, value).is_ok()
    }

    /// Adds or overwrites an entry, returning the replaced value.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.position(&key) {
            Some(index) => Some(std::mem::replace(
                &mut self.values.storage().borrow_mut()[index],
                value,
            )),
            None => {
                self.keys.add(key);
                self.values.add(value);
                None
            }
        }
    }

    /// Returns a copy of the value stored under `key`.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.position(key).and_then(|index| self.values.get(index))
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.position(key).is_some()
    }

    pub fn contains_value(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.values.contains(value)
    }

    /// Removes the entry for `key`. Returns whether one was present.
    pub fn remove(&mut self, key: &K) -> bool {
        match self.position(key) {
            Some(index) => {
                self.keys.storage().borrow_mut().remove(index);
                self.values.storage().borrow_mut().remove(index);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.values.clear();
    }

    /// The keys in insertion order. The view follows later changes.
    pub fn keys(&self) -> ReadOnlyCollection<K> {
        self.keys.as_read_only()
    }

    /// The values in insertion order. The view follows later changes.
    pub fn values(&self) -> ReadOnlyCollection<V> {
        self.values.as_read_only()
    }

    fn position(&self, key: &K) -> Option<usize> {
        self.keys
            .storage()
            .borrow()
            .iter()
            .position(|candidate| self.comparer.equals(candidate, key))
    }
}

impl<K: PartialEq, V> Default for Dictionary<K, V> {
    fn default() -> Self {
        Dictionary::new()
    }
}

/// Copies the entries and shares the comparer.
impl<K: Clone, V: Clone> Clone for Dictionary<K, V> {
    fn clone(&self) -> Self {
        Dictionary {
            keys: self.keys.clone(),
            values: self.values.clone(),
            comparer: Rc::clone(&self.comparer),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Dictionary<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys = self.keys.storage().borrow();
        let values = self.values.storage().borrow();
        f.debug_map().entries(keys.iter().zip(values.iter())).finish()
    }
}

/// Yields `(key, value)` pairs in insertion order.
impl<'a, K: Clone + 'a, V: Clone + 'a> Queryable<'a> for Dictionary<K, V> {
    type Key = K;
    type Item = V;

    fn query(&self) -> Sequence<'a, V, K> {
        let keys = Rc::clone(self.keys.storage());
        let values = Rc::clone(self.values.storage());
        Sequence::from_fn(move || {
            let keys = Rc::clone(&keys);
            let values = Rc::clone(&values);
            (0..).map_while(move |i| {
                let key = keys.borrow().get(i).cloned()?;
                let value = values.borrow().get(i).cloned()?;
                Some((key, value))
            })
        })
    }
}
