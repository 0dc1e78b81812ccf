//! GroupBy and the [`Grouping`] it produces.

use std::collections::HashMap;
use std::hash::Hash;
use std::rc::Rc;

use tracing::trace;

use crate::compare::{identity, EqualityComparer};
use crate::sequence::{deferred, Sequence};
use crate::source::Queryable;

/// A key together with the elements that produced it, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Grouping<GK, E> {
    key: GK,
    values: Vec<E>,
}

impl<GK, E> Grouping<GK, E> {
    pub fn new(key: GK, values: Vec<E>) -> Self {
        Grouping { key, values }
    }

    pub fn key(&self) -> &GK {
        &self.key
    }

    pub fn values(&self) -> &[E] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn into_parts(self) -> (GK, Vec<E>) {
        (self.key, self.values)
    }
}

impl<'a, GK, E: Clone + 'a> Queryable<'a> for Grouping<GK, E> {
    type Key = usize;
    type Item = E;

    fn query(&self) -> Sequence<'a, E> {
        Sequence::from_vec(self.values.clone())
    }
}

/// Locates the group a key belongs to.
trait GroupIndex<GK> {
    fn find(&self, key: &GK) -> Option<usize>;

    fn record(&mut self, key: &GK, group: usize);
}

struct HashIndex<GK> {
    groups: HashMap<GK, usize>,
}

impl<GK: Eq + Hash + Clone> GroupIndex<GK> for HashIndex<GK> {
    fn find(&self, key: &GK) -> Option<usize> {
        self.groups.get(key).copied()
    }

    fn record(&mut self, key: &GK, group: usize) {
        self.groups.insert(key.clone(), group);
    }
}

/// Linear scan over the keys seen so far.
struct ScanIndex<'a, GK> {
    keys: Vec<GK>,
    comparer: Rc<dyn EqualityComparer<GK> + 'a>,
}

impl<GK: Clone> GroupIndex<GK> for ScanIndex<'_, GK> {
    fn find(&self, key: &GK) -> Option<usize> {
        self.keys
            .iter()
            .position(|seen| self.comparer.equals(seen, key))
    }

    fn record(&mut self, key: &GK, group: usize) {
        debug_assert_eq!(group, self.keys.len());
        self.keys.push(key.clone());
    }
}

type IndexFactory<'a, GK> = Rc<dyn Fn() -> Box<dyn GroupIndex<GK> + 'a> + 'a>;

impl<'a, V: 'a, K: 'a> Sequence<'a, V, K> {
    /// Groups values by key, in the order each key is first seen.
    ///
    /// Buffering: the whole upstream is drained on the first pull of each
    /// traversal.
    ///
    /// ```
    /// use standout_query::Sequence;
    ///
    /// let words = Sequence::from_vec(vec!["apple", "bean", "avocado"]);
    /// let groups = words.group_by(|w| w.chars().next()).to_vec();
    /// assert_eq!(groups.len(), 2);
    /// assert_eq!(groups[0].key(), &Some('a'));
    /// assert_eq!(groups[0].values(), &["apple", "avocado"]);
    /// ```
    pub fn group_by<GK, KS>(&self, key_selector: KS) -> Sequence<'a, Grouping<GK, V>>
    where
        GK: Eq + Hash + Clone + 'a,
        KS: Fn(&V) -> GK + 'a,
    {
        self.group_by_select(key_selector, identity)
    }

    /// Groups values by key, projecting each element with `element_selector`.
    pub fn group_by_select<GK, E, KS, ES>(
        &self,
        key_selector: KS,
        element_selector: ES,
    ) -> Sequence<'a, Grouping<GK, E>>
    where
        GK: Eq + Hash + Clone + 'a,
        E: 'a,
        KS: Fn(&V) -> GK + 'a,
        ES: Fn(V) -> E + 'a,
    {
        let new_index: IndexFactory<'a, GK> = Rc::new(|| -> Box<dyn GroupIndex<GK> + 'a> {
            Box::new(HashIndex {
                groups: HashMap::new(),
            })
        });
        self.group_in(key_selector, element_selector, new_index)
    }

    /// Groups and then turns each group into a result with
    /// `result_selector(key, elements)`.
    pub fn group_by_result<GK, E, R, KS, ES, RS>(
        &self,
        key_selector: KS,
        element_selector: ES,
        result_selector: RS,
    ) -> Sequence<'a, R>
    where
        GK: Eq + Hash + Clone + 'a,
        E: 'a,
        R: 'a,
        KS: Fn(&V) -> GK + 'a,
        ES: Fn(V) -> E + 'a,
        RS: Fn(GK, Vec<E>) -> R + 'a,
    {
        self.group_by_select(key_selector, element_selector)
            .select(move |group, _| {
                let (key, values) = group.into_parts();
                result_selector(key, values)
            })
    }

    /// Groups with a custom key comparer. Each key is matched against the
    /// keys seen so far by linear scan.
    pub fn group_by_with<GK, E, KS, ES, C>(
        &self,
        key_selector: KS,
        element_selector: ES,
        comparer: C,
    ) -> Sequence<'a, Grouping<GK, E>>
    where
        GK: Clone + 'a,
        E: 'a,
        KS: Fn(&V) -> GK + 'a,
        ES: Fn(V) -> E + 'a,
        C: EqualityComparer<GK> + 'a,
    {
        let comparer: Rc<dyn EqualityComparer<GK> + 'a> = Rc::new(comparer);
        let new_index: IndexFactory<'a, GK> = Rc::new(move || -> Box<dyn GroupIndex<GK> + 'a> {
            Box::new(ScanIndex {
                keys: Vec::new(),
                comparer: Rc::clone(&comparer),
            })
        });
        self.group_in(key_selector, element_selector, new_index)
    }

    fn group_in<GK, E, KS, ES>(
        &self,
        key_selector: KS,
        element_selector: ES,
        new_index: IndexFactory<'a, GK>,
    ) -> Sequence<'a, Grouping<GK, E>>
    where
        GK: 'a,
        E: 'a,
        KS: Fn(&V) -> GK + 'a,
        ES: Fn(V) -> E + 'a,
    {
        let upstream = self.clone();
        let key_selector = Rc::new(key_selector);
        let element_selector = Rc::new(element_selector);
        Sequence::from_values(move || {
            let upstream = upstream.clone();
            let key_selector = Rc::clone(&key_selector);
            let element_selector = Rc::clone(&element_selector);
            let new_index = Rc::clone(&new_index);
            deferred(move || {
                let mut index = new_index();
                let mut groups: Vec<Grouping<GK, E>> = Vec::new();
                for value in upstream.values() {
                    let key = key_selector(&value);
                    let element = element_selector(value);
                    match index.find(&key) {
                        Some(position) => groups[position].values.push(element),
                        None => {
                            index.record(&key, groups.len());
                            groups.push(Grouping::new(key, vec![element]));
                        }
                    }
                }
                trace!(groups = groups.len(), "group_by buffered upstream");
                groups.into_iter()
            })
        })
    }
}
