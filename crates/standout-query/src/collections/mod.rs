//! Mutable collections that expose the query surface.
//!
//! Every collection keeps its elements in shared storage. A [`Sequence`]
//! obtained from `query()` reads that storage by position on each pull, so
//! mutations made between traversals are visible to the next one. Adding or
//! removing elements while a traversal of the same collection is in progress
//! is a caller error: the traversal may skip or repeat elements.

mod dictionary;
mod hash_set;
mod list;
mod read_only;

use std::cell::RefCell;
use std::rc::Rc;

pub use dictionary::Dictionary;
pub use hash_set::HashSet;
pub use list::List;
pub use read_only::ReadOnlyCollection;

use crate::error::QueryError;
use crate::sequence::Sequence;

type Storage<T> = Rc<RefCell<Vec<T>>>;

fn storage<T>(items: Vec<T>) -> Storage<T> {
    Rc::new(RefCell::new(items))
}

/// A positional sequence over the current contents of `storage`.
///
/// No borrow is held between pulls.
fn live<'a, T: Clone + 'a>(storage: &Storage<T>) -> Sequence<'a, T> {
    let storage = Rc::clone(storage);
    Sequence::from_values(move || {
        let storage = Rc::clone(&storage);
        (0..).map_while(move |i| storage.borrow().get(i).cloned())
    })
}

fn out_of_range(index: usize) -> QueryError {
    QueryError::IndexOutOfRange {
        index: isize::try_from(index).unwrap_or(isize::MAX),
    }
}
