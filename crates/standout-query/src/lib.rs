//! Query - Deferred, LINQ-style query operators for Rust collections.
//!
//! Query provides a fluent API for composing lazy pipelines over in-memory
//! data. It supports:
//!
//! - Projection and filtering: `select`, `filter`, `select_many`
//! - Partitioning: `skip`, `take`, `skip_while`, `take_while`
//! - Set algebra: `distinct`, `union`, `except`, `intersect`
//! - Correlation: `join`, `group_join`, `group_by`, `zip`
//! - Stable multi-key sorting with `order_by` / `then_by`
//! - Terminal reductions: `count`, `sum`, `average`, `first`, `single`, ...
//! - Queryable collections: [`List`], [`HashSet`], [`Dictionary`],
//!   [`ReadOnlyCollection`]
//!
//! # Quick Start
//!
//! ```rust
//! use standout_query::{List, Queryable};
//!
//! #[derive(Clone)]
//! struct Task {
//!     name: &'static str,
//!     priority: i32,
//!     archived: bool,
//! }
//!
//! let mut tasks = List::from(vec![
//!     Task { name: "Write docs", priority: 3, archived: false },
//!     Task { name: "Fix bug", priority: 5, archived: false },
//!     Task { name: "Old task", priority: 1, archived: true },
//! ]);
//!
//! // Nothing runs yet: the query only describes the pipeline.
//! let open = tasks
//!     .query()
//!     .filter(|task, _| !task.archived)
//!     .order_by_descending(|task| task.priority)
//!     .select(|task, _| task.name);
//!
//! assert_eq!(open.to_vec(), vec!["Fix bug", "Write docs"]);
//!
//! // Every terminal call re-reads the source.
//! tasks.add(Task { name: "Ship", priority: 9, archived: false });
//! assert_eq!(open.first(), Ok("Ship"));
//! ```
//!
//! # Execution Model
//!
//! A [`Sequence`] is a restartable stream of `(key, value)` pairs. Operators
//! return new sequences without touching the source. A terminal operation
//! (`to_vec`, `count`, `first`, a `for` loop over [`Sequence::iter`]) builds a
//! fresh chain of iterators and pulls it from the outside in, so:
//!
//! - Streaming operators pull only the elements they need:
//!   `take(3)` after `skip(3)` pulls six upstream elements, not all of them.
//! - Buffering operators (`group_by`, `reverse`, `order_by`) drain their
//!   upstream on the first pull of each traversal, never earlier.
//! - Two traversals never share state, so a predicate may itself query the
//!   sequence it is filtering.
//!
//! | Mode | Operators |
//! |------|-----------|
//! | Streaming | `select`, `filter`, `select_many`, `skip*`, `take*`, `concat`, `append`, `prepend`, `default_if_empty`, `distinct`, `union`, `zip` |
//! | Materializes `second`/`inner` | `except`, `intersect`, `join`, `group_join` |
//! | Buffering | `group_by*`, `reverse`, `order_by*` / `then_by*` |
//!
//! # Keys
//!
//! Positional sources number their elements from 0. Sequences built from
//! maps carry the map keys. `select`, `filter`, `skip`, `take`, `distinct`,
//! `except` and `intersect` keep the upstream keys; operators that merge or
//! reorder sources (`concat`, `union`, `order_by`, `reverse`, ...) renumber.
//!
//! # Errors
//!
//! Fallible terminals return [`Result`]; [`QueryError::kind`] groups the
//! variants into an [`ErrorKind`] taxonomy.

mod bag;
mod collections;
mod compare;
mod error;
mod grouping;
mod join;
mod operators;
mod ordering;
mod sequence;
mod set;
mod source;
mod terminal;

// Re-export public API
pub use collections::{Dictionary, HashSet, List, ReadOnlyCollection};
pub use compare::{
    always_true, default_compare, default_equals, identity, DefaultEquality, EqualityComparer,
};
pub use error::{ErrorKind, QueryError, Result};
pub use grouping::Grouping;
pub use ordering::OrderedSequence;
pub use sequence::{Pull, Sequence};
pub use source::Queryable;
