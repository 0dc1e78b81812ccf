use std::fmt;
use std::rc::Rc;

use super::{live, storage, Storage};
use crate::sequence::Sequence;
use crate::source::Queryable;

/// A read-only view over a list of values.
///
/// Built from a `Vec` it owns that vector without copying it; obtained from
/// [`List::as_read_only`](super::List::as_read_only) or
/// [`Dictionary::keys`](super::Dictionary::keys) it follows the underlying
/// collection.
pub struct ReadOnlyCollection<T> {
    items: Storage<T>,
}

impl<T> ReadOnlyCollection<T> {
    pub fn new(items: Vec<T>) -> Self {
        ReadOnlyCollection {
            items: storage(items),
        }
    }

    pub(super) fn view(items: &Storage<T>) -> Self {
        ReadOnlyCollection {
            items: Rc::clone(items),
        }
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<T>
    where
        T: Clone,
    {
        self.items.borrow().get(index).cloned()
    }

    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.items.borrow().contains(item)
    }

    pub fn index_of(&self, item: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.items.borrow().iter().position(|candidate| candidate == item)
    }

    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items.borrow().clone()
    }
}

/// Clones share the same view.
impl<T> Clone for ReadOnlyCollection<T> {
    fn clone(&self) -> Self {
        ReadOnlyCollection::view(&self.items)
    }
}

impl<T: fmt::Debug> fmt::Debug for ReadOnlyCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.borrow().iter()).finish()
    }
}

impl<T> From<Vec<T>> for ReadOnlyCollection<T> {
    fn from(items: Vec<T>) -> Self {
        ReadOnlyCollection::new(items)
    }
}

impl<'a, T: Clone + 'a> Queryable<'a> for ReadOnlyCollection<T> {
    type Key = usize;
    type Item = T;

    fn query(&self) -> Sequence<'a, T> {
        live(&self.items)
    }
}
