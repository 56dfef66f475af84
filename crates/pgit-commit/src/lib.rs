//! Commit construction for pgit.
//!
//! A [`CommitRequest`] turns the staged state of a [`FileSystemView`] into a
//! commit and moves the view's branch to it. Execution runs in a fixed order:
//!
//! 1. resolve committer, author and parents (no I/O, configuration errors only)
//! 2. materialize the staged tree
//! 3. stop with [`CommitOutcome::NoOp`] if nothing changed
//! 4. store the commit object
//! 5. move the branch through the [`RefUpdateGate`] with compare-and-swap
//! 6. point the view at the new commit
//!
//! Step 5 is the only one that mutates shared state. If another writer moved
//! the branch first it fails with [`CommitError::RefUpdateConflict`] and the
//! new commit stays behind as unreachable data.
//!
//! Identity and time come from an injected [`IdentityProvider`], so tests
//! can run with deterministic values.

pub mod config;
pub mod error;
pub mod gate;
pub mod identity;
pub mod request;
pub mod view;

pub use config::{CommitConfig, ConfigError, CoreConfig, RepoConfig, UserConfig};
pub use error::{CommitError, CommitResult};
pub use gate::{GateRequest, RefUpdateGate, UpdateMode};
pub use identity::{
    ConfigIdentityProvider, FixedIdentityProvider, IdentityInput, IdentityProvider, Role,
};
pub use request::{CommitContext, CommitOutcome, CommitRequest};
pub use view::FileSystemView;
