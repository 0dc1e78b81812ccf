use std::fmt;

use tracing::debug;

use super::{live, out_of_range, storage, ReadOnlyCollection, Storage};
use crate::error::Result;
use crate::sequence::Sequence;
use crate::source::Queryable;

/// A growable list with positional access.
///
/// ```
/// use standout_query::{List, Queryable};
///
/// let mut list = List::from(vec![1, 2, 3]);
/// let evens = list.query().filter(|v, _| v % 2 == 0);
/// assert_eq!(evens.to_vec(), vec![2]);
///
/// list.add(4);
/// assert_eq!(evens.to_vec(), vec![2, 4]);
/// ```
pub struct List<T> {
    items: Storage<T>,
}

impl<T> List<T> {
    pub fn new() -> Self {
        List {
            items: storage(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Appends one element.
    pub fn add(&mut self, item: T) {
        self.items.borrow_mut().push(item);
    }

    /// Appends every element of `items`, in order.
    pub fn add_range<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        self.items.borrow_mut().extend(items);
    }

    /// Inserts `item` before position `index`. `index == len()` appends.
    pub fn insert(&mut self, index: usize, item: T) -> Result<()> {
        let mut items = self.items.borrow_mut();
        if index > items.len() {
            debug!(index, len = items.len(), "list insert out of range");
            return Err(out_of_range(index));
        }
        items.insert(index, item);
        Ok(())
    }

    /// Returns a copy of the element at `index`.
    pub fn get(&self, index: usize) -> Option<T>
    where
        T: Clone,
    {
        self.items.borrow().get(index).cloned()
    }

    /// Replaces the element at `index`, returning the previous one.
    pub fn set(&mut self, index: usize, item: T) -> Result<T> {
        let mut items = self.items.borrow_mut();
        match items.get_mut(index) {
            Some(slot) => Ok(std::mem::replace(slot, item)),
            None => {
                debug!(index, len = items.len(), "list set out of range");
                Err(out_of_range(index))
            }
        }
    }

    /// Removes the first element equal to `item`.
    pub fn remove(&mut self, item: &T) -> bool
    where
        T: PartialEq,
    {
        match self.index_of(item) {
            Some(index) => {
                self.items.borrow_mut().remove(index);
                true
            }
            None => false,
        }
    }

    /// Removes and returns the element at `index`.
    pub fn remove_at(&mut self, index: usize) -> Result<T> {
        let mut items = self.items.borrow_mut();
        if index >= items.len() {
            debug!(index, len = items.len(), "list remove_at out of range");
            return Err(out_of_range(index));
        }
        Ok(items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.borrow_mut().clear();
    }

    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.items.borrow().contains(item)
    }

    /// Position of the first element equal to `item`.
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

    /// A read-only view that follows later changes to this list.
    pub fn as_read_only(&self) -> ReadOnlyCollection<T> {
        ReadOnlyCollection::view(&self.items)
    }

    pub(super) fn storage(&self) -> &Storage<T> {
        &self.items
    }
}

impl<T> Default for List<T> {
    fn default() -> Self {
        List::new()
    }
}

/// Copies the elements; the clone does not share storage with `self`.
impl<T: Clone> Clone for List<T> {
    fn clone(&self) -> Self {
        List::from(self.to_vec())
    }
}

impl<T: fmt::Debug> fmt::Debug for List<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.borrow().iter()).finish()
    }
}

impl<T: PartialEq> PartialEq for List<T> {
    fn eq(&self, other: &Self) -> bool {
        *self.items.borrow() == *other.items.borrow()
    }
}

impl<T> From<Vec<T>> for List<T> {
    fn from(items: Vec<T>) -> Self {
        List {
            items: storage(items),
        }
    }
}

impl<T> FromIterator<T> for List<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        List::from(iter.into_iter().collect::<Vec<_>>())
    }
}

impl<'a, T: Clone + 'a> Queryable<'a> for List<T> {
    type Key = usize;
    type Item = T;

    fn query(&self) -> Sequence<'a, T> {
        live(&self.items)
    }
}
