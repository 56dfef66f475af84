use pgit_crypto::ContentHasher;
use pgit_types::{HashAlgorithm, ObjectId, ObjectKind};

use crate::error::{StoreError, StoreResult};
use crate::object::{Commit, ObjectCodec, StoredObject};
use crate::snapshot::CommitSnapshot;

/// Content-addressed object store.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written. Content-addressing guarantees this:
///   the same data always produces the same ID.
/// - Every id a store hands out is computed with [`ObjectStore::algorithm`].
/// - Concurrent reads are always safe (objects are immutable).
/// - The store never interprets object contents. Codecs live on the types.
/// - All I/O errors are propagated, never silently ignored.
pub trait ObjectStore: Send + Sync {
    /// Digest algorithm used for every id in this store.
    fn algorithm(&self) -> HashAlgorithm;

    /// Read an object by its content-addressed ID.
    ///
    /// Returns `Ok(None)` if the object does not exist.
    /// Returns `Err` on I/O failure or data corruption.
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>>;

    /// Write an object and return its content-addressed ID.
    ///
    /// If the object already exists, this is a no-op (idempotent).
    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId>;

    /// Check whether an object exists in the store.
    fn exists(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Delete an object by ID. Returns `true` if the object existed.
    ///
    /// Intended for garbage collection only. Deleting a referenced object
    /// corrupts the repository.
    fn delete(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Hasher matching this store's algorithm.
    fn hasher(&self) -> ContentHasher {
        ContentHasher::new(self.algorithm())
    }

    /// Read an object that must exist, re-verifying its hash.
    fn open(&self, id: &ObjectId) -> StoreResult<StoredObject> {
        let object = self.read(id)?.ok_or(StoreError::NotFound(*id))?;
        let computed = object.compute_id(&self.hasher());
        if computed != *id {
            return Err(StoreError::HashMismatch { id: *id, computed });
        }
        Ok(object)
    }

    /// Store raw `data` as an object of `kind`.
    fn insert(&self, kind: ObjectKind, data: &[u8]) -> StoreResult<ObjectId> {
        self.write(&StoredObject::new(kind, data.to_vec()))
    }

    /// Encode and store a commit.
    fn create_commit(&self, commit: &Commit) -> StoreResult<ObjectId> {
        self.write(&commit.to_stored_object())
    }

    /// Load and decode a commit.
    fn read_commit(&self, id: &ObjectId) -> StoreResult<CommitSnapshot> {
        CommitSnapshot::load(*id, self)
    }

    /// Read multiple objects in a batch.
    ///
    /// Default implementation calls `read()` for each ID. Backends may
    /// override for better performance (e.g., fewer I/O round-trips).
    fn read_batch(&self, ids: &[ObjectId]) -> StoreResult<Vec<Option<StoredObject>>> {
        ids.iter().map(|id| self.read(id)).collect()
    }

    /// Write multiple objects in a batch and return their IDs.
    ///
    /// Default implementation calls `write()` for each object. Backends may
    /// override for better performance (e.g., single fsync).
    fn write_batch(&self, objects: &[StoredObject]) -> StoreResult<Vec<ObjectId>> {
        objects.iter().map(|obj| self.write(obj)).collect()
    }
}
