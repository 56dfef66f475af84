//! Foundation types for pgit.
//!
//! This crate provides the identity and structural types shared by every
//! other pgit crate.
//!
//! # Key Types
//!
//! - [`ObjectId`] -- Content-addressed identifier (20 or 32 byte digest)
//! - [`HashAlgorithm`] -- Digest algorithm a repository is configured with
//! - [`ObjectKind`] -- Git object type tag (`blob`, `tree`, `commit`)
//! - [`PersonIdent`] -- Author/committer identity with a zoned timestamp

pub mod error;
pub mod identity;
pub mod object;

pub use error::TypeError;
pub use identity::PersonIdent;
pub use object::{HashAlgorithm, ObjectId, ObjectKind, MAX_ID_LEN};
