//! Error types for the query crate.

use thiserror::Error;

/// Errors raised by terminal operations, constructors and collection adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// An argument passed to a constructor or operation was invalid.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation needs at least one element and the source had none.
    #[error("the source sequence is empty")]
    EmptySequence,

    /// Reduction (`max`, `min`, unseeded `aggregate`) over an empty source.
    #[error("sequence contains no elements")]
    NoElements,

    /// The source had elements, but none satisfied the predicate.
    #[error("no element satisfies the condition")]
    NoMatch,

    /// `single` found a second element.
    #[error("sequence contains more than one element")]
    MoreThanOneElement,

    /// `single_where` found a second matching element.
    #[error("more than one element satisfies the condition")]
    MoreThanOneMatch,

    /// A positional index fell outside the valid range.
    #[error("index {index} is out of range")]
    IndexOutOfRange { index: isize },

    /// A key (or set value) was already present.
    #[error("an element with the same key already exists")]
    DuplicateKey,
}

/// Broad classification of [`QueryError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Argument,
    EmptySequence,
    NoMatch,
    MultipleMatch,
    Bounds,
    DuplicateKey,
}

impl QueryError {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryError::InvalidArgument(_) => ErrorKind::Argument,
            QueryError::EmptySequence | QueryError::NoElements => ErrorKind::EmptySequence,
            QueryError::NoMatch => ErrorKind::NoMatch,
            QueryError::MoreThanOneElement | QueryError::MoreThanOneMatch => {
                ErrorKind::MultipleMatch
            }
            QueryError::IndexOutOfRange { .. } => ErrorKind::Bounds,
            QueryError::DuplicateKey => ErrorKind::DuplicateKey,
        }
    }
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;
