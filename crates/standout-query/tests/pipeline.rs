//! End-to-end behavior of the deferred pipeline.

use std::cell::Cell;
use std::panic::{catch_unwind, AssertUnwindSafe};

use standout_query::{ErrorKind, Grouping, List, QueryError, Queryable, Sequence};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Test helpers
// ============================================================================

/// Routes library events to the test output. Set `RUST_LOG=trace` to see
/// where buffering operators materialize.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone, PartialEq)]
struct Person {
    name: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
struct Pet {
    name: &'static str,
    owner: &'static str,
}

fn people() -> List<Person> {
    ["nopet", "magnus", "terry", "charlotte"]
        .into_iter()
        .map(|name| Person { name })
        .collect()
}

fn pets() -> List<Pet> {
    List::from(vec![
        Pet { name: "Daisy", owner: "magnus" },
        Pet { name: "Barley", owner: "terry" },
        Pet { name: "Boots", owner: "terry" },
        Pet { name: "Whiskers", owner: "charlotte" },
    ])
}

// ============================================================================
// Laziness and restartability
// ============================================================================

#[test]
fn callbacks_run_only_for_needed_elements() {
    init_tracing();
    let f_calls = Cell::new(0);
    let g_calls = Cell::new(0);
    let query = Sequence::range(1, 10)
        .expect("valid range")
        .select(|v, _| {
            f_calls.set(f_calls.get() + 1);
            v
        })
        .skip(3)
        .take(3)
        .select(|v, _| {
            g_calls.set(g_calls.get() + 1);
            v
        });
    assert_eq!(f_calls.get(), 0);
    assert_eq!(g_calls.get(), 0);

    assert_eq!(query.to_vec(), vec![4, 5, 6]);
    assert_eq!(f_calls.get(), 6);
    assert_eq!(g_calls.get(), 3);
}

#[test]
fn query_over_list_sees_mutations() {
    init_tracing();
    let mut list = List::from(vec![1, 2, 3, 4]);
    let evens = list.query().filter(|v, _| v % 2 == 0);
    assert_eq!(evens.to_vec(), vec![2, 4]);

    list.add(6);
    list.remove(&2);
    assert_eq!(evens.to_vec(), vec![4, 6]);

    // Buffering operators re-buffer on every terminal call.
    let reversed = list.query().reverse();
    assert_eq!(reversed.to_vec(), vec![6, 4, 3, 1]);
    list.add(7);
    assert_eq!(reversed.first(), Ok(7));
}

#[test]
fn filtering_leaves_the_list_intact() {
    let list = List::from(vec![5, 1, 4]);
    let before = list.to_vec();
    let kept = list.query().filter(|v, _| *v > 3).to_vec();
    assert_eq!(kept, vec![5, 4]);
    assert_eq!(list.to_vec(), before);
    assert_eq!(list.len(), 3);
}

#[test]
fn deferred_operators_do_not_read_the_source() {
    init_tracing();
    let reads = Cell::new(0);
    let source = Sequence::from_values(|| {
        reads.set(reads.get() + 1);
        vec![3, 1, 2, 3]
    });
    let other = vec![2, 5];

    let deferred: Vec<Sequence<'_, i32>> = vec![
        source.select(|v, _| v + 1),
        source.filter(|v, _| *v > 1),
        source.select_many(|v, _| vec![v; 2]),
        source.select_many_with(|v, _| vec![*v], |o, i| o + i),
        source.skip(1),
        source.skip_while(|v, _| *v > 2),
        source.take(2),
        source.take_while(|v, _| *v > 2),
        source.concat(&other),
        source.append(9),
        source.prepend(0),
        source.default_if_empty(0),
        source.distinct(),
        source.distinct_with(|a: &i32, b: &i32| a == b),
        source.union(&other),
        source.except(&other),
        source.intersect(&other),
        source.join(&other, |o| *o, |i| *i, |o, _| *o),
        source.group_join(&other, |o| *o, |i| *i, |o, m| o + m.len() as i32),
        source.group_by(|v| v % 2).select(|g, _| g.len() as i32),
        source.reverse(),
        source.order_by(|v| *v).then_by(|v| -v).as_sequence().clone(),
        source.zip_with(&other, |a, b| a * b),
    ];
    assert_eq!(reads.get(), 0);

    for sequence in &deferred {
        sequence.count();
    }
    assert_eq!(reads.get(), deferred.len());
}

#[test]
fn terminal_calls_rerun_the_chain() {
    let reads = Cell::new(0);
    let source = Sequence::from_values(|| {
        reads.set(reads.get() + 1);
        1..=4
    });
    let query = source.filter(|v, _| *v > 1);
    assert_eq!(query.count(), 3);
    assert_eq!(query.sum(), 9);
    assert_eq!(query.max(), Ok(4));
    assert_eq!(reads.get(), 3);
}

// ============================================================================
// Operator semantics
// ============================================================================

#[test]
fn join_pairs_owners_with_pets() {
    let rows = people()
        .query()
        .join(&pets(), |p| p.name, |pet| pet.owner, |p, pet| (p.name, pet.name))
        .to_vec();
    assert_eq!(
        rows,
        vec![
            ("magnus", "Daisy"),
            ("terry", "Barley"),
            ("terry", "Boots"),
            ("charlotte", "Whiskers"),
        ]
    );
}

#[test]
fn group_join_reports_pet_counts() {
    let counts = people()
        .query()
        .group_join(&pets(), |p| p.name, |pet| pet.owner, |p, owned| {
            (p.name, owned.len())
        })
        .to_vec();
    assert_eq!(
        counts,
        vec![("nopet", 0), ("magnus", 1), ("terry", 2), ("charlotte", 1)]
    );
}

#[test]
fn group_by_floor_keeps_first_seen_order() {
    let ages = List::from(vec![8.3_f64, 4.9, 1.5, 4.3]);
    let groups: Vec<Grouping<i64, f64>> = ages
        .query()
        .group_by_select(|age| age.floor() as i64, |age| age)
        .to_vec();
    let summary: Vec<_> = groups
        .into_iter()
        .map(Grouping::into_parts)
        .collect();
    assert_eq!(
        summary,
        vec![(8, vec![8.3]), (4, vec![4.9, 4.3]), (1, vec![1.5])]
    );
}

#[test]
fn set_algebra() {
    let a = Sequence::from_vec(vec![2, 2, 4, 6, 8, 8, 8]);
    let b = Sequence::from_vec(vec![1, 3, 3, 5, 5, 5, 7, 9, 9, 9, 9]);
    let mut union = a.union(&b).to_vec();
    union.sort_unstable();
    assert_eq!(union, vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
    assert_eq!(a.union(&b).to_vec(), vec![2, 4, 6, 8, 1, 3, 5, 7, 9]);

    let first = vec![44, 26, 92, 30, 71, 38];
    let second = vec![39, 59, 83, 47, 26, 4, 30];
    let first = Sequence::from_source(&first);
    assert_eq!(first.intersect(&second).to_vec(), vec![26, 30]);
    assert_eq!(first.except(&second).to_vec(), vec![44, 92, 71, 38]);
}

#[test]
fn order_by_then_by_is_stable() {
    let rows = Sequence::from_vec(vec![
        ("b", 1, 'p'),
        ("a", 2, 'q'),
        ("b", 1, 'r'),
        ("a", 1, 's'),
        ("b", 1, 't'),
    ]);
    let tags: String = rows
        .order_by(|r| r.0)
        .then_by(|r| r.1)
        .select(|r, _| r.2)
        .to_vec()
        .into_iter()
        .collect();
    assert_eq!(tags, "sqprt");
}

#[test]
fn counts_at_the_boundaries() {
    let seq = Sequence::from_vec(vec![1, 2, 3]);
    assert_eq!(seq.skip(0).to_vec(), vec![1, 2, 3]);
    assert_eq!(seq.skip(-4).to_vec(), vec![1, 2, 3]);
    assert!(seq.take(0).to_vec().is_empty());
    assert!(seq.take(-1).to_vec().is_empty());
    assert_eq!(seq.element_at_or_default(3, 0), 0);
    assert_eq!(seq.element_at_or_default(-1, 0), 0);
    let err = seq.element_at(3).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Bounds);
    assert_eq!(err.to_string(), "index 3 is out of range");
}

#[test]
fn error_messages_distinguish_empty_and_no_match() {
    let empty = Sequence::<i32>::empty();
    let seq = Sequence::from_vec(vec![1, 2, 2]);
    assert_eq!(
        empty.first().unwrap_err().to_string(),
        "the source sequence is empty"
    );
    assert_eq!(
        seq.first_where(|v| *v > 5).unwrap_err().to_string(),
        "no element satisfies the condition"
    );
    assert_eq!(
        seq.single().unwrap_err().to_string(),
        "sequence contains more than one element"
    );
    assert_eq!(
        seq.single_where(|v| *v == 2).unwrap_err().to_string(),
        "more than one element satisfies the condition"
    );
    assert_eq!(empty.max(), Err(QueryError::NoElements));
    assert!(empty.average().is_nan());
}

#[test]
fn default_if_empty_yields_one_default() {
    let empty = Sequence::<i32>::empty();
    assert_eq!(empty.default_if_empty(7).iter().collect::<Vec<_>>(), vec![(0, 7)]);
    let full = Sequence::from_vec(vec![1]);
    assert_eq!(full.default_if_empty(7).to_vec(), vec![1]);
}

// ============================================================================
// Traversal independence
// ============================================================================

#[test]
fn predicate_may_query_its_own_sequence() {
    let seq = Sequence::from_vec(vec![4, 9, 1, 7]);
    let probe = seq.clone();
    let below_max = seq.filter(move |v, _| probe.any_where(|w| w > v));
    assert_eq!(below_max.to_vec(), vec![4, 1, 7]);

    let above_average = seq.count_where(|v| f64::from(*v) > seq.average());
    assert_eq!(above_average, 2);
}

#[test]
fn interleaved_traversals_are_independent() {
    let seq = Sequence::from_vec(vec![1, 2, 3]).distinct().skip(1);
    let mut first = seq.iter();
    let mut second = seq.iter();
    assert_eq!(first.next(), Some((1, 2)));
    assert_eq!(second.next(), Some((1, 2)));
    assert_eq!(first.next(), Some((2, 3)));
    assert_eq!(second.next(), Some((2, 3)));
}

#[test]
fn drained_pull_stays_drained() {
    let seq = Sequence::from_vec(vec!["x"]);
    let mut pull = seq.iter();
    assert_eq!(pull.next(), Some((0, "x")));
    for _ in 0..3 {
        assert_eq!(pull.next(), None);
    }
}

#[test]
fn panicking_callback_does_not_poison_the_sequence() {
    let seq = Sequence::from_vec(vec![1, 2, 3]);
    let boom = seq.select(|v, _| {
        if v == 2 {
            panic!("selector failed on {v}");
        }
        v
    });
    let outcome = catch_unwind(AssertUnwindSafe(|| boom.to_vec()));
    assert!(outcome.is_err());

    assert_eq!(seq.to_vec(), vec![1, 2, 3]);
    assert_eq!(boom.take(1).to_vec(), vec![1]);
}
