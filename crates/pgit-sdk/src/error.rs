use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("branch not found: {0}")]
    BranchNotFound(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("store error: {0}")]
    Store(#[from] pgit_store::StoreError),

    #[error("ref error: {0}")]
    Ref(#[from] pgit_refs::RefError),

    #[error("filesystem error: {0}")]
    Fs(#[from] pgit_fs::FsError),

    #[error("commit error: {0}")]
    Commit(#[from] pgit_commit::CommitError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] pgit_commit::ConfigError),
}

pub type SdkResult<T> = Result<T, SdkError>;
