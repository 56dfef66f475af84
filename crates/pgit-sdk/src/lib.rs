//! High-level SDK for pgit.
//!
//! [`Repository`] ties the object store, the ref store and an identity
//! provider together. Work happens in a [`GitFileSystem`] checked out from a
//! branch and is recorded with a [`CommitRequest`].
//!
//! ```ignore
//! let repo = Repository::init(RepoConfig::with_user("Ada", "ada@example.com"))?;
//! let mut view = repo.checkout("main")?;
//! view.write_file("notes.txt", b"first draft")?;
//! repo.commit(&mut view, repo.commit_request().message("add notes"))?;
//! ```

pub mod commit;
pub mod error;
pub mod repository;

pub use commit::CommitSummary;
pub use error::{SdkError, SdkResult};
pub use repository::Repository;

// Re-export key types
pub use pgit_commit::{CommitOutcome, CommitRequest, IdentityProvider, RepoConfig};
pub use pgit_fs::GitFileSystem;
pub use pgit_store::{Blob, Commit, CommitSnapshot, EntryMode, Tree, TreeEntry};
pub use pgit_types::{HashAlgorithm, ObjectId, PersonIdent};
