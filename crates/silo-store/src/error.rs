//! Error types for the store crate.

use std::path::PathBuf;

use silo_index::IndexError;

use crate::mode::ModeParseError;

/// Errors from store operations.
#[derive(Debug, thiserror::Error)]
pub enum SiloError {
    /// `create` without `exists_ok` found the name already indexed.
    #[error("entry already exists: {0}")]
    AlreadyExists(String),

    /// The index listed a name whose backing file is missing on disk.
    ///
    /// The index and the filesystem disagree (e.g. the file was deleted
    /// out-of-band). Not recovered automatically.
    #[error("index lists {name:?} but no file exists at {}", .path.display())]
    Drift { name: String, path: PathBuf },

    /// Failure from the backing index store.
    #[error("index error: {0}")]
    Index(IndexError),

    /// Malformed file-open mode string.
    #[error(transparent)]
    Mode(#[from] ModeParseError),

    /// I/O error from the filesystem.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for store results.
pub type SiloResult<T> = Result<T, SiloError>;

// Duplicate-name failures from the index surface under the same variant as
// the store's own existence check.
impl From<IndexError> for SiloError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::AlreadyExists(name) => Self::AlreadyExists(name),
            other => Self::Index(other),
        }
    }
}
