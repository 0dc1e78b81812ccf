//! Default equality and ordering helpers.
//!
//! Operators that accept a comparer fall back to these when none is given.

use std::cmp::Ordering;

/// Decides whether two values are equal for matching purposes.
///
/// Any `Fn(&T, &T) -> bool` closure is a comparer:
///
/// ```
/// use standout_query::{EqualityComparer, DefaultEquality};
///
/// let case_insensitive = |a: &String, b: &String| a.eq_ignore_ascii_case(b);
/// assert!(case_insensitive.equals(&"Hello".to_string(), &"HELLO".to_string()));
/// assert!(DefaultEquality.equals(&1, &1));
/// ```
pub trait EqualityComparer<T: ?Sized> {
    /// Returns `true` if `a` and `b` should be treated as the same value.
    fn equals(&self, a: &T, b: &T) -> bool;
}

impl<T: ?Sized, F> EqualityComparer<T> for F
where
    F: Fn(&T, &T) -> bool,
{
    fn equals(&self, a: &T, b: &T) -> bool {
        self(a, b)
    }
}

/// Comparer backed by `PartialEq`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultEquality;

impl<T: PartialEq + ?Sized> EqualityComparer<T> for DefaultEquality {
    fn equals(&self, a: &T, b: &T) -> bool {
        default_equals(a, b)
    }
}

/// Default equality: `a == b`.
pub fn default_equals<T: PartialEq + ?Sized>(a: &T, b: &T) -> bool {
    a == b
}

/// Default three-way ordering.
///
/// Values that are not ordered even against themselves (NaN) sort after
/// every other value and compare `Equal` to each other, so floats get a
/// total order and sorting keeps its ties stable.
///
/// ```
/// use std::cmp::Ordering;
/// use standout_query::default_compare;
///
/// assert_eq!(default_compare(&f64::NAN, &1.0), Ordering::Greater);
/// assert_eq!(default_compare(&f64::NAN, &f64::NAN), Ordering::Equal);
/// ```
pub fn default_compare<T: PartialOrd + ?Sized>(a: &T, b: &T) -> Ordering {
    match a.partial_cmp(b) {
        Some(order) => order,
        None => is_unordered(a).cmp(&is_unordered(b)),
    }
}

/// Returns `true` for values that do not compare with themselves.
pub(crate) fn is_unordered<T: PartialOrd + ?Sized>(value: &T) -> bool {
    value.partial_cmp(value).is_none()
}

/// Predicate that accepts everything.
pub fn always_true<T: ?Sized>(_: &T) -> bool {
    true
}

/// Returns its argument unchanged.
pub fn identity<T>(value: T) -> T {
    value
}
