//! Staged in-memory filesystem for pgit.
//!
//! A [`GitFileSystem`] is a view of one branch. It starts from the branch's
//! head commit, accepts path-level writes and deletes, and turns the result
//! into a tree id on demand with [`GitFileSystem::persist`]. Nothing touches
//! the branch ref; the commit layer decides when the materialized tree
//! becomes a commit.
//!
//! # Key Types
//!
//! - [`GitFileSystem`] -- the staged view (BTreeMap-backed)
//! - [`StagedChange`] -- a pending write or delete at one path

pub mod entry;
pub mod error;
pub mod filesystem;

pub use entry::StagedChange;
pub use error::{FsError, FsResult};
pub use filesystem::{normalize_path, GitFileSystem};
