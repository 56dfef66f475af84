//! Content-addressed object storage for pgit.
//!
//! This crate implements a hash-keyed object store laid out like git's
//! `.git/objects/` directory. Blobs, trees and commits are stored as
//! immutable objects identified by the digest of their canonical
//! `"<type> <len>\0<content>"` serialization.
//!
//! # Object Types
//!
//! - [`Blob`] -- raw content (file contents, arbitrary data)
//! - [`Tree`] -- directory listing mapping names to object references
//! - [`Commit`] -- tree, parents, authorship and message
//!
//! # Snapshots
//!
//! [`ObjectSnapshot`] pairs an identity with a decoded object. It is either
//! loaded from a store or captured from fresh content without any I/O, and
//! persisted with an idempotent [`ObjectSnapshot::save`].
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//! - [`LooseObjectStore`] -- one compressed file per object under a directory
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. Writes are idempotent: re-writing existing content is a no-op success.
//! 3. Reads through [`ObjectStore::open`] re-verify the content hash.
//! 4. The store never interprets object contents -- codecs live on the types.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod loose;
pub mod memory;
pub mod object;
pub mod snapshot;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use loose::LooseObjectStore;
pub use memory::InMemoryObjectStore;
pub use object::{Blob, Commit, EntryMode, ObjectCodec, StoredObject, Tree, TreeEntry};
pub use snapshot::{BlobSnapshot, CommitSnapshot, ObjectSnapshot, TreeSnapshot};
pub use traits::ObjectStore;
