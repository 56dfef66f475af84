//! The filesystem view a commit request reads from and updates.

use pgit_fs::GitFileSystem;
use pgit_store::CommitSnapshot;
use pgit_types::ObjectId;

use crate::error::CommitResult;

/// A staged working state bound to a branch.
pub trait FileSystemView {
    /// Branch the view commits to, `None` when detached.
    fn current_branch(&self) -> Option<&str>;

    /// Commit the view was opened at, `None` on an unborn branch.
    fn current_commit(&self) -> Option<&CommitSnapshot>;

    /// Store the staged state as trees and return the root tree id.
    fn materialize_tree(&mut self) -> CommitResult<ObjectId>;

    /// Move the view onto a commit that now heads its branch.
    fn set_current_commit(&mut self, commit: CommitSnapshot) -> CommitResult<()>;
}

impl FileSystemView for GitFileSystem {
    fn current_branch(&self) -> Option<&str> {
        self.branch()
    }

    fn current_commit(&self) -> Option<&CommitSnapshot> {
        self.head()
    }

    fn materialize_tree(&mut self) -> CommitResult<ObjectId> {
        Ok(self.persist()?)
    }

    fn set_current_commit(&mut self, commit: CommitSnapshot) -> CommitResult<()> {
        Ok(GitFileSystem::set_current_commit(self, commit)?)
    }
}
