//! Duplicate tracking for the set operators.
//!
//! A bag remembers values it has already seen. The set operators create one
//! per traversal through a [`BagFactory`], so two traversals of the same
//! sequence never share seen-state.

use std::collections::HashSet;
use std::hash::Hash;
use std::rc::Rc;

use crate::compare::EqualityComparer;

pub(crate) trait Bag<T> {
    /// Records `value`; returns `false` if an equal value was already present.
    fn insert(&mut self, value: &T) -> bool;

    fn contains(&self, value: &T) -> bool;

    fn len(&self) -> usize;
}

/// Builds an empty bag. Called once per traversal.
pub(crate) type BagFactory<'a, T> = Rc<dyn Fn() -> Box<dyn Bag<T> + 'a> + 'a>;

/// Bag keyed by `Hash + Eq`, used when no comparer is supplied.
pub(crate) struct HashBag<T> {
    seen: HashSet<T>,
}

impl<T: Eq + Hash + Clone> Bag<T> for HashBag<T> {
    fn insert(&mut self, value: &T) -> bool {
        if self.seen.contains(value) {
            return false;
        }
        self.seen.insert(value.clone())
    }

    fn contains(&self, value: &T) -> bool {
        self.seen.contains(value)
    }

    fn len(&self) -> usize {
        self.seen.len()
    }
}

/// Bag that compares every stored value with a custom comparer.
///
/// Lookups are linear in the number of stored values.
pub(crate) struct ScanBag<'a, T> {
    seen: Vec<T>,
    comparer: Rc<dyn EqualityComparer<T> + 'a>,
}

impl<T: Clone> Bag<T> for ScanBag<'_, T> {
    fn insert(&mut self, value: &T) -> bool {
        if self.contains(value) {
            return false;
        }
        self.seen.push(value.clone());
        true
    }

    fn contains(&self, value: &T) -> bool {
        self.seen.iter().any(|seen| self.comparer.equals(seen, value))
    }

    fn len(&self) -> usize {
        self.seen.len()
    }
}

pub(crate) fn hashed<'a, T>() -> BagFactory<'a, T>
where
    T: Eq + Hash + Clone + 'a,
{
    Rc::new(|| -> Box<dyn Bag<T> + 'a> {
        Box::new(HashBag {
            seen: HashSet::new(),
        })
    })
}

pub(crate) fn scanned<'a, T, C>(comparer: C) -> BagFactory<'a, T>
where
    T: Clone + 'a,
    C: EqualityComparer<T> + 'a,
{
    let comparer: Rc<dyn EqualityComparer<T> + 'a> = Rc::new(comparer);
    Rc::new(move || -> Box<dyn Bag<T> + 'a> {
        Box::new(ScanBag {
            seen: Vec::new(),
            comparer: Rc::clone(&comparer),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_first_insert_wins() {
        let mut bag = hashed::<i32>()();
        assert!(bag.insert(&2));
        assert!(!bag.insert(&2));
        assert!(bag.insert(&4));
        assert_eq!(bag.len(), 2);
        assert!(bag.contains(&4));
        assert!(!bag.contains(&5));
    }

    #[test]
    fn scanned_uses_comparer() {
        let mut bag = scanned(|a: &String, b: &String| a.eq_ignore_ascii_case(b))();
        assert!(bag.insert(&"apple".to_string()));
        assert!(!bag.insert(&"APPLE".to_string()));
        assert!(bag.contains(&"Apple".to_string()));
        assert_eq!(bag.len(), 1);
    }

    #[test]
    fn factory_builds_independent_bags() {
        let factory = hashed::<i32>();
        let mut first = factory();
        first.insert(&1);
        let second = factory();
        assert!(!second.contains(&1));
    }
}
