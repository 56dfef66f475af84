//! Error types for commit construction.

use pgit_fs::FsError;
use pgit_refs::{RefError, RefExpectation};
use pgit_store::StoreError;
use pgit_types::{ObjectId, TypeError};

use crate::identity::Role;

/// Errors that can occur while executing a commit request.
#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    /// Exactly one of name and email was supplied.
    #[error("incomplete {role} identity: name and email must be given together")]
    IncompleteIdentity { role: Role },

    /// Amend was requested on a branch with no commits.
    #[error("no commit to amend")]
    NoCommitToAmend,

    /// The filesystem view is not on a branch.
    #[error("cannot commit from a detached view")]
    DetachedHead,

    /// No committer was given and the provider has no default identity.
    #[error("no committer identity: configure user.name and user.email")]
    NoAmbientIdentity,

    /// A supplied name or email cannot appear in a commit header.
    #[error("invalid identity: {0}")]
    InvalidIdentity(#[from] TypeError),

    /// Reading or writing objects failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Materializing the staged tree failed.
    #[error("filesystem error: {0}")]
    Fs(#[from] FsError),

    /// Another writer moved the branch since the view was opened.
    #[error("branch {branch} moved: expected {expected}, found {}", describe(.actual))]
    RefUpdateConflict {
        branch: String,
        expected: RefExpectation,
        actual: Option<ObjectId>,
    },

    /// Any other reference failure.
    #[error("ref error: {0}")]
    Ref(RefError),
}

impl CommitError {
    /// Raised while resolving the request, before any I/O.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::IncompleteIdentity { .. }
                | Self::NoCommitToAmend
                | Self::DetachedHead
                | Self::NoAmbientIdentity
                | Self::InvalidIdentity(_)
        )
    }

    /// The branch was left untouched and running the request again may
    /// succeed. After a conflict the caller must reopen the view first.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Store(_) | Self::Fs(_) | Self::RefUpdateConflict { .. }
        )
    }
}

impl From<RefError> for CommitError {
    fn from(err: RefError) -> Self {
        match err {
            RefError::Conflict {
                name,
                expected,
                actual,
            } => Self::RefUpdateConflict {
                branch: name,
                expected,
                actual,
            },
            other => Self::Ref(other),
        }
    }
}

fn describe(actual: &Option<ObjectId>) -> String {
    match actual {
        Some(id) => id.to_hex(),
        None => "no value".into(),
    }
}

/// Convenience alias for commit results.
pub type CommitResult<T> = Result<T, CommitError>;
