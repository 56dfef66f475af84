use std::hash::{Hash, Hasher};
use std::ops::Deref;

use pgit_crypto::ContentHasher;
use pgit_types::{HashAlgorithm, ObjectId};

use crate::error::{StoreError, StoreResult};
use crate::object::{Blob, Commit, ObjectCodec, Tree};
use crate::traits::ObjectStore;

/// An object paired with its identity.
///
/// A snapshot comes from one of two places. [`load`](Self::load) reads and
/// decodes an existing object. [`capture`](Self::capture) computes the id of
/// fresh content without touching any store. Either way the id is the digest
/// of the encoded content, so `save` on a captured snapshot stores exactly
/// the object the id names.
#[derive(Clone, Debug)]
pub struct ObjectSnapshot<T> {
    id: ObjectId,
    data: T,
}

pub type BlobSnapshot = ObjectSnapshot<Blob>;
pub type TreeSnapshot = ObjectSnapshot<Tree>;
pub type CommitSnapshot = ObjectSnapshot<Commit>;

impl<T: ObjectCodec> ObjectSnapshot<T> {
    /// Read the object `id` from `store` and decode it.
    ///
    /// Fails with `NotFound` if absent and `CorruptObject` if the stored
    /// object has a different kind or does not decode.
    pub fn load<S: ObjectStore + ?Sized>(id: ObjectId, store: &S) -> StoreResult<Self> {
        let object = store.open(&id)?;
        let data = T::from_stored_object(id, &object, store.algorithm())?;
        Ok(Self { id, data })
    }

    /// Compute the identity of `data` under `algorithm`. No I/O.
    pub fn capture(data: T, algorithm: HashAlgorithm) -> Self {
        let id = ContentHasher::new(algorithm).hash_object(T::KIND, &data.encode());
        Self { id, data }
    }

    /// Persist into `store` and return the id it was stored under.
    /// Idempotent.
    pub fn save<S: ObjectStore + ?Sized>(&self, store: &S) -> StoreResult<ObjectId> {
        let actual = store.write(&self.data.to_stored_object())?;
        if actual != self.id {
            return Err(StoreError::IdMismatch {
                expected: self.id,
                actual,
            });
        }
        Ok(actual)
    }
}

impl<T> ObjectSnapshot<T> {
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn into_data(self) -> T {
        self.data
    }
}

// Content addressing makes the id a complete equality key.
impl<T> PartialEq for ObjectSnapshot<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for ObjectSnapshot<T> {}

impl<T> Hash for ObjectSnapshot<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> Deref for ObjectSnapshot<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.data
    }
}
