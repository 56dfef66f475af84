//! Content hashing for pgit.
//!
//! Object identities are the digest of the canonical serialization
//! `"<type> <len>\0<content>"`, computed with the repository's configured
//! [`HashAlgorithm`](pgit_types::HashAlgorithm). Hashing is a pure function:
//! no store or I/O is involved, so identities can be computed before deciding
//! whether an object needs to be persisted.
//!
//! All digests wrap established libraries; no custom cryptography.

pub mod hasher;

pub use hasher::{object_header, ContentHasher};
