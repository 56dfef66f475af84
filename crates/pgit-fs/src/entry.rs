//! Pending edits recorded against the base tree.

use pgit_store::EntryMode;
use pgit_types::ObjectId;

/// A staged change at one normalized path.
///
/// Written content is stored as a blob at staging time, so a change only
/// carries the blob id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StagedChange {
    /// Replace or create a file.
    Write {
        object_id: ObjectId,
        mode: EntryMode,
        size: u64,
    },
    /// Remove a file, or a directory with everything under it.
    Delete,
}

impl StagedChange {
    /// Returns `true` for a delete.
    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete)
    }
}
