//! The lazy sequence at the center of the engine.
//!
//! A [`Sequence`] owns nothing but a shared pull factory. Every traversal
//! (a terminal operation, a `for` loop, an operator pulling from its
//! upstream) calls the factory and gets a brand-new chain of iterators, so
//! counters, buffers and seen-sets never leak from one traversal into the
//! next.

use std::fmt;
use std::iter::{Fuse, FusedIterator};
use std::rc::Rc;

type Factory<'a, V, K> = Rc<dyn Fn() -> Pull<'a, V, K> + 'a>;

/// A restartable, lazily evaluated stream of `(key, value)` pairs.
///
/// Positional sequences use `K = usize`, numbering elements from 0 in the
/// order they are produced. Sequences built from maps carry the map's keys.
///
/// Cloning a `Sequence` is cheap and shares the same pipeline.
pub struct Sequence<'a, V, K = usize> {
    factory: Factory<'a, V, K>,
}

impl<V, K> Clone for Sequence<'_, V, K> {
    fn clone(&self) -> Self {
        Sequence {
            factory: Rc::clone(&self.factory),
        }
    }
}

impl<V, K> fmt::Debug for Sequence<'_, V, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sequence").finish_non_exhaustive()
    }
}

impl<'a, V: 'a, K: 'a> Sequence<'a, V, K> {
    /// Wraps a raw pull factory. The factory must hand out a fresh iterator
    /// on every call.
    pub(crate) fn from_pull<F, I>(factory: F) -> Self
    where
        F: Fn() -> I + 'a,
        I: Iterator<Item = (K, V)> + 'a,
    {
        Sequence {
            factory: Rc::new(move || Pull::new(factory())),
        }
    }

    /// Starts a new traversal.
    ///
    /// Each call re-runs the pipeline from its source's current contents.
    pub fn iter(&self) -> Pull<'a, V, K> {
        (self.factory)()
    }

    /// Starts a new traversal yielding values only.
    pub fn values(&self) -> impl Iterator<Item = V> + 'a {
        self.iter().map(|(_, value)| value)
    }

    /// Starts a new traversal yielding keys only.
    pub fn keys(&self) -> impl Iterator<Item = K> + 'a {
        self.iter().map(|(key, _)| key)
    }

    /// Drops the keys and numbers the values by position.
    ///
    /// Deferred; nothing is pulled until the result is traversed.
    pub fn renumber(&self) -> Sequence<'a, V> {
        let upstream = self.clone();
        Sequence::from_pull(move || upstream.values().enumerate())
    }
}

impl<'a, V: 'a, K: 'a> IntoIterator for &Sequence<'a, V, K> {
    type Item = (K, V);
    type IntoIter = Pull<'a, V, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// One traversal of a [`Sequence`].
///
/// Once it returns `None` it keeps returning `None`.
pub struct Pull<'a, V, K = usize> {
    inner: Fuse<Box<dyn Iterator<Item = (K, V)> + 'a>>,
}

impl<'a, V, K> Pull<'a, V, K> {
    pub(crate) fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = (K, V)> + 'a,
    {
        let boxed: Box<dyn Iterator<Item = (K, V)> + 'a> = Box::new(iter);
        Pull {
            inner: boxed.fuse(),
        }
    }
}

impl<V, K> Iterator for Pull<'_, V, K> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V, K> FusedIterator for Pull<'_, V, K> {}

impl<V, K> fmt::Debug for Pull<'_, V, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pull").finish_non_exhaustive()
    }
}

/// Iterator whose contents are computed on the first pull.
///
/// Buffering operators use this so that building the traversal stays free
/// and the upstream is only drained once the consumer asks for an element.
pub(crate) struct Deferred<I, F> {
    fill: Option<F>,
    buffer: Option<I>,
}

pub(crate) fn deferred<I, F>(fill: F) -> Deferred<I, F>
where
    I: Iterator,
    F: FnOnce() -> I,
{
    Deferred {
        fill: Some(fill),
        buffer: None,
    }
}

impl<I, F> Iterator for Deferred<I, F>
where
    I: Iterator,
    F: FnOnce() -> I,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        if let Some(fill) = self.fill.take() {
            self.buffer = Some(fill());
        }
        self.buffer.as_mut()?.next()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    /// Source whose iterator resumes after reporting exhaustion.
    struct Flaky {
        calls: usize,
    }

    impl Iterator for Flaky {
        type Item = (usize, i32);

        fn next(&mut self) -> Option<Self::Item> {
            self.calls += 1;
            match self.calls {
                1 => Some((0, 10)),
                2 => None,
                _ => Some((1, 20)),
            }
        }
    }

    #[test]
    fn pull_never_resurrects() {
        let seq = Sequence::from_pull(|| Flaky { calls: 0 });
        let mut pull = seq.iter();
        assert_eq!(pull.next(), Some((0, 10)));
        assert_eq!(pull.next(), None);
        assert_eq!(pull.next(), None);
    }

    #[test]
    fn each_traversal_calls_factory() {
        let calls = Cell::new(0);
        let seq = Sequence::from_pull(|| {
            calls.set(calls.get() + 1);
            vec![(0usize, 'a')].into_iter()
        });
        assert_eq!(calls.get(), 0);
        let _ = seq.iter().count();
        let _ = seq.iter().count();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn renumber_drops_keys() {
        let seq = Sequence::from_pull(|| vec![("x", 1), ("y", 2)].into_iter());
        let pairs: Vec<_> = seq.renumber().iter().collect();
        assert_eq!(pairs, vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn deferred_fills_on_first_pull() {
        let filled = Cell::new(false);
        let mut iter = deferred(|| {
            filled.set(true);
            vec![1, 2].into_iter()
        });
        assert!(!filled.get());
        assert_eq!(iter.next(), Some(1));
        assert!(filled.get());
        assert_eq!(iter.next(), Some(2));
        assert_eq!(iter.next(), None);
    }
}
