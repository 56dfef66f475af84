//! Reference management for pgit.
//!
//! This crate provides named references (branches and HEAD) that point at
//! commits in the object store. References are the human-readable entry
//! points into the commit graph, laid out like git refs.
//!
//! # Architecture
//!
//! - **Branches** live under `refs/heads/` and move as commits are made.
//! - **HEAD** names the current branch, or is detached at a commit id.
//! - Every update names the value it expects to replace
//!   ([`RefExpectation`]). The store checks it atomically with the write, so
//!   two writers racing from the same base cannot both win.
//! - Every successful update appends a [`RefLogEntry`] to the ref's log.
//!
//! # Modules
//!
//! - [`error`] -- Error types for ref operations
//! - [`types`] -- Core ref types: [`Ref`], [`Head`], [`RefUpdate`]
//! - [`traits`] -- The [`RefStore`] trait defining the storage interface
//! - [`names`] -- Branch and ref name validation
//! - [`memory`] -- In-memory [`InMemoryRefStore`]

pub mod error;
pub mod memory;
pub mod names;
pub mod traits;
pub mod types;

pub use error::{RefError, Result};
pub use memory::InMemoryRefStore;
pub use names::{branch_ref_name, validate_branch_name, validate_ref_name, BRANCH_PREFIX};
pub use traits::RefStore;
pub use types::{Head, Ref, RefExpectation, RefLogEntry, RefUpdate};
