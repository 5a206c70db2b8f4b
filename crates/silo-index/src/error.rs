//! Error types for the index crate.

/// Errors from index store operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The name is already indexed.
    #[error("entry already indexed: {0}")]
    AlreadyExists(String),

    /// Failure inside the embedded storage engine.
    #[error("storage engine error: {0}")]
    Engine(#[from] redb::Error),
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;

// redb reports each transaction phase with its own error type; collapse them
// into the umbrella `redb::Error` so callers see one engine variant.

impl From<redb::DatabaseError> for IndexError {
    fn from(err: redb::DatabaseError) -> Self {
        Self::Engine(err.into())
    }
}

impl From<redb::TransactionError> for IndexError {
    fn from(err: redb::TransactionError) -> Self {
        Self::Engine(err.into())
    }
}

impl From<redb::TableError> for IndexError {
    fn from(err: redb::TableError) -> Self {
        Self::Engine(err.into())
    }
}

impl From<redb::StorageError> for IndexError {
    fn from(err: redb::StorageError) -> Self {
        Self::Engine(err.into())
    }
}

impl From<redb::CommitError> for IndexError {
    fn from(err: redb::CommitError) -> Self {
        Self::Engine(err.into())
    }
}
