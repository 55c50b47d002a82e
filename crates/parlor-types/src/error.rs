use thiserror::Error;

/// Errors from repository operations (used by trait definitions in parlor-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),
}

/// Errors surfaced by the session service.
///
/// Cache misses and evictions are never errors; only bad input and
/// chat store failures reach the caller.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("chat store error: {0}")]
    Storage(#[from] RepositoryError),
}
