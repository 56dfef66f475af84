use std::collections::HashMap;
use std::sync::RwLock;

use pgit_types::{HashAlgorithm, ObjectId};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::object::StoredObject;
use crate::traits::ObjectStore;

/// In-memory, HashMap-based object store.
///
/// Intended for tests and embedding. All objects are held in memory behind a
/// `RwLock` for safe concurrent access. Objects are cloned on read/write.
pub struct InMemoryObjectStore {
    algorithm: HashAlgorithm,
    objects: RwLock<HashMap<ObjectId, StoredObject>>,
}

impl InMemoryObjectStore {
    /// Create a new empty SHA-1 store.
    pub fn new() -> Self {
        Self::with_algorithm(HashAlgorithm::Sha1)
    }

    /// Create a new empty store keyed by `algorithm`.
    pub fn with_algorithm(algorithm: HashAlgorithm) -> Self {
        Self {
            algorithm,
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore for InMemoryObjectStore {
    fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.get(id).cloned())
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let id = object.compute_id(&self.hasher());
        if id.is_null() {
            return Err(StoreError::NullObjectId);
        }
        let mut map = self.objects.write().expect("lock poisoned");
        // Same id always maps to the same content.
        if !map.contains_key(&id) {
            debug!(id = %id.short_hex(), kind = %object.kind, size = object.size, "stored object");
            map.insert(id, object.clone());
        }
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        let map = self.objects.read().expect("lock poisoned");
        Ok(map.contains_key(id))
    }

    fn delete(&self, id: &ObjectId) -> StoreResult<bool> {
        let mut map = self.objects.write().expect("lock poisoned");
        Ok(map.remove(id).is_some())
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len();
        f.debug_struct("InMemoryObjectStore")
            .field("algorithm", &self.algorithm)
            .field("object_count", &count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};
    use pgit_crypto::ContentHasher;
    use pgit_types::{ObjectKind, PersonIdent};

    use super::*;
    use crate::object::*;

    fn blob(content: &[u8]) -> StoredObject {
        Blob::new(content.to_vec()).to_stored_object()
    }

    fn commit_on(tree: ObjectId, message: &str) -> Commit {
        let when = FixedOffset::east_opt(0)
            .unwrap()
            .timestamp_opt(1_700_000_000, 0)
            .unwrap();
        let ident = PersonIdent::new("Ada", "ada@example.com", when).unwrap();
        Commit {
            tree,
            parents: Vec::new(),
            author: ident.clone(),
            committer: ident,
            message: message.to_string(),
        }
    }

    #[test]
    fn empty_blob_has_git_id() {
        let store = InMemoryObjectStore::new();
        let id = store.insert(ObjectKind::Blob, b"").unwrap();
        assert_eq!(id.to_hex(), "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391");
    }

    #[test]
    fn ids_are_keyed_by_algorithm() {
        let sha1 = InMemoryObjectStore::new();
        let blake3 = InMemoryObjectStore::with_algorithm(HashAlgorithm::Blake3);

        let narrow = sha1.insert(ObjectKind::Blob, b"same bytes").unwrap();
        let wide = blake3.insert(ObjectKind::Blob, b"same bytes").unwrap();
        assert_eq!(narrow.width(), 20);
        assert_eq!(wide.width(), 32);
        assert_eq!(wide, ContentHasher::BLAKE3.hash_object(ObjectKind::Blob, b"same bytes"));

        assert!(!blake3.exists(&narrow).unwrap());
        assert!(!sha1.exists(&wide).unwrap());
    }

    #[test]
    fn insert_matches_hasher_and_dedups() {
        let store = InMemoryObjectStore::with_algorithm(HashAlgorithm::Sha256);
        let id = store.insert(ObjectKind::Blob, b"payload").unwrap();
        assert_eq!(id, store.hasher().hash_object(ObjectKind::Blob, b"payload"));
        assert_eq!(store.insert(ObjectKind::Blob, b"payload").unwrap(), id);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn kind_is_part_of_the_id() {
        let store = InMemoryObjectStore::new();
        let as_blob = store.insert(ObjectKind::Blob, b"x").unwrap();
        let as_tree = store.insert(ObjectKind::Tree, b"x").unwrap();
        assert_ne!(as_blob, as_tree);
    }

    #[test]
    fn open_returns_verified_object() {
        let store = InMemoryObjectStore::new();
        let id = store.write(&blob(b"hello")).unwrap();
        assert_eq!(store.open(&id).unwrap(), blob(b"hello"));
    }

    #[test]
    fn open_missing_object_is_not_found() {
        let store = InMemoryObjectStore::new();
        let id = ContentHasher::SHA1.hash_object(ObjectKind::Blob, b"absent");
        assert!(store.read(&id).unwrap().is_none());
        assert!(matches!(store.open(&id), Err(StoreError::NotFound(missing)) if missing == id));
    }

    #[test]
    fn open_detects_tampering() {
        let store = InMemoryObjectStore::new();
        let id = store.write(&blob(b"original")).unwrap();
        store
            .objects
            .write()
            .unwrap()
            .insert(id, blob(b"tampered"));

        assert!(store.read(&id).unwrap().is_some());
        match store.open(&id) {
            Err(StoreError::HashMismatch { id: filed, computed }) => {
                assert_eq!(filed, id);
                assert_eq!(computed, ContentHasher::SHA1.hash_object(ObjectKind::Blob, b"tampered"));
            }
            other => panic!("expected hash mismatch, got {other:?}"),
        }
    }

    #[test]
    fn commits_round_trip_through_the_store() {
        let store = InMemoryObjectStore::with_algorithm(HashAlgorithm::Blake3);
        let tree = store.write(&Tree::new(Vec::new()).to_stored_object()).unwrap();
        let commit = commit_on(tree, "initial\n");

        let id = store.create_commit(&commit).unwrap();
        let loaded = store.read_commit(&id).unwrap();
        assert_eq!(loaded.id(), id);
        assert_eq!(loaded.data(), &commit);
    }

    #[test]
    fn read_commit_rejects_other_kinds() {
        let store = InMemoryObjectStore::new();
        let id = store.write(&blob(b"not a commit")).unwrap();
        assert!(matches!(
            store.read_commit(&id),
            Err(StoreError::CorruptObject { .. })
        ));
    }

    #[test]
    fn batches_keep_input_order() {
        let store = InMemoryObjectStore::new();
        let objects = vec![blob(b"one"), blob(b"two"), blob(b"one")];
        let ids = store.write_batch(&objects).unwrap();
        assert_eq!(ids[0], ids[2]);
        assert_eq!(store.len(), 2);

        let absent = ContentHasher::SHA1.hash_object(ObjectKind::Blob, b"absent");
        let read = store.read_batch(&[ids[1], absent, ids[0]]).unwrap();
        assert_eq!(read[0].as_ref(), Some(&objects[1]));
        assert!(read[1].is_none());
        assert_eq!(read[2].as_ref(), Some(&objects[0]));
    }

    #[test]
    fn delete_removes_object() {
        let store = InMemoryObjectStore::new();
        let id = store.write(&blob(b"gone")).unwrap();
        assert!(store.delete(&id).unwrap());
        assert!(!store.delete(&id).unwrap());
        assert!(matches!(store.open(&id), Err(StoreError::NotFound(_))));
        assert!(store.is_empty());
    }
}
