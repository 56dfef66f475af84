//! The [`RefStore`] trait defining the reference storage interface.
//!
//! Any backend (in-memory, filesystem, database) implements this trait to
//! provide named reference management.

use pgit_types::{ObjectId, PersonIdent};

use crate::error::Result;
use crate::names::BRANCH_PREFIX;
use crate::types::{Head, Ref, RefExpectation, RefLogEntry, RefUpdate};

/// Storage backend for named references.
///
/// Implementations must be thread-safe (`Send + Sync`). [`update_ref`]
/// compares and writes under one lock: of two updates expecting the same
/// previous value, exactly one applies and the other gets
/// [`RefError::Conflict`](crate::RefError::Conflict).
///
/// [`update_ref`]: RefStore::update_ref
pub trait RefStore: Send + Sync {
    /// Read a ref by its canonical name (e.g. "refs/heads/main").
    ///
    /// Returns `Ok(None)` if the ref does not exist.
    fn read_ref(&self, name: &str) -> Result<Option<Ref>>;

    /// Apply a compare-and-swap update and append its ref-log entry.
    ///
    /// Returns the previous value of the ref.
    fn update_ref(&self, update: RefUpdate) -> Result<Option<ObjectId>>;

    /// Delete a ref and its log by canonical name.
    ///
    /// Returns `Ok(true)` if the ref existed and was deleted, `Ok(false)` if
    /// it did not exist.
    fn delete_ref(&self, name: &str) -> Result<bool>;

    /// List all refs whose canonical name starts with `prefix`, sorted by name.
    fn list_refs(&self, prefix: &str) -> Result<Vec<Ref>>;

    /// Update history of a ref, oldest first. Empty if it was never updated.
    fn reflog(&self, name: &str) -> Result<Vec<RefLogEntry>>;

    /// Read the current HEAD state.
    ///
    /// Returns `Ok(None)` if HEAD has not been set.
    fn head(&self) -> Result<Option<Head>>;

    /// Set HEAD to point at a branch (symbolic ref).
    fn set_head(&self, branch: &str) -> Result<()>;

    /// Set HEAD to a detached state pointing directly at a commit.
    fn set_head_detached(&self, target: ObjectId) -> Result<()>;

    /// Create a ref that must not exist yet.
    fn create_ref(
        &self,
        name: &str,
        target: ObjectId,
        committer: &PersonIdent,
        message: &str,
    ) -> Result<()> {
        self.update_ref(RefUpdate::new(
            name,
            RefExpectation::Absent,
            target,
            committer.clone(),
            message,
        ))
        .map(|_| ())
    }

    /// Advance a ref that must still point at `expected_old`.
    fn fast_forward_ref(
        &self,
        name: &str,
        expected_old: ObjectId,
        target: ObjectId,
        committer: &PersonIdent,
        message: &str,
    ) -> Result<()> {
        self.update_ref(RefUpdate::new(
            name,
            RefExpectation::Value(expected_old),
            target,
            committer.clone(),
            message,
        ))
        .map(|_| ())
    }

    /// Replace the tip of a ref that must still point at `expected_old`.
    fn amend_ref(
        &self,
        name: &str,
        expected_old: ObjectId,
        target: ObjectId,
        committer: &PersonIdent,
        message: &str,
    ) -> Result<()> {
        self.update_ref(RefUpdate::new(
            name,
            RefExpectation::Value(expected_old),
            target,
            committer.clone(),
            message,
        ))
        .map(|_| ())
    }

    /// Set a ref with a caller-supplied log message.
    ///
    /// Pass [`RefExpectation::Any`] to overwrite unconditionally.
    fn force_set_ref(
        &self,
        name: &str,
        target: ObjectId,
        expected: RefExpectation,
        committer: &PersonIdent,
        message: &str,
    ) -> Result<()> {
        self.update_ref(RefUpdate::new(
            name,
            expected,
            target,
            committer.clone(),
            message,
        ))
        .map(|_| ())
    }

    /// List all branch refs.
    fn branches(&self) -> Result<Vec<Ref>> {
        self.list_refs(BRANCH_PREFIX)
    }

    /// Short name of the branch HEAD points at, `None` if detached or unset.
    fn current_branch(&self) -> Result<Option<String>> {
        Ok(match self.head()? {
            Some(Head::Symbolic(branch)) => Some(branch),
            _ => None,
        })
    }
}
