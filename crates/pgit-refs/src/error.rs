//! Error types for reference operations.

use pgit_types::ObjectId;
use thiserror::Error;

use crate::types::RefExpectation;

/// Errors that can occur during reference operations.
#[derive(Debug, Error)]
pub enum RefError {
    /// The reference was not found.
    #[error("ref not found: {name}")]
    NotFound { name: String },

    /// The ref's current value did not match what the update expected.
    #[error("ref {name} moved: expected {expected}, found {}", describe(.actual))]
    Conflict {
        name: String,
        expected: RefExpectation,
        actual: Option<ObjectId>,
    },

    /// The branch or ref name is invalid.
    #[error("invalid branch name: {name}: {reason}")]
    InvalidBranchName { name: String, reason: String },

    /// HEAD is in a detached state (not pointing to a branch).
    #[error("HEAD is detached")]
    DetachedHead,

    /// Cannot delete the currently checked-out branch.
    #[error("cannot delete current branch: {name}")]
    DeleteCurrentBranch { name: String },

    /// A lock guarding the store was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

fn describe(actual: &Option<ObjectId>) -> String {
    match actual {
        Some(id) => id.to_hex(),
        None => "no value".into(),
    }
}

/// Convenience type alias for ref operations.
pub type Result<T> = std::result::Result<T, RefError>;
