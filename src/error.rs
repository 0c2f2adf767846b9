use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error that can be returned by [`crate::Index`] methods.
#[derive(Debug, Error)]
pub enum Error {
    /// Required argument was missing or an unsupported combination of arguments was given.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// `append` was asked to insert a document whose id already exists in the store.
    #[error("document with id {0:?} already exists in the index")]
    DuplicateIngest(String),

    /// A query string could not be parsed.
    #[error("failed to parse query: {0}")]
    QueryParse(String),

    /// An invariant the public API is supposed to uphold was violated.
    ///
    /// Reaching this means a document without an id made it past `append`, or the
    /// evaluator was handed a query variant it doesn't know how to dispatch on.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
}
