//! Error types for the staged filesystem.

use pgit_store::StoreError;

/// Errors that can occur during filesystem operations.
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    /// The path is empty or contains an illegal component.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Nothing exists at the path.
    #[error("no such file: {0}")]
    NotFound(String),

    /// The path names a directory where a file was expected.
    #[error("not a file: {0}")]
    NotAFile(String),

    /// Store operation failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Convenience alias for filesystem results.
pub type FsResult<T> = Result<T, FsError>;
