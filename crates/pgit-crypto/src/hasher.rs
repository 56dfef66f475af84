use pgit_types::{HashAlgorithm, ObjectId, ObjectKind};
use sha1::{Digest, Sha1};
use sha2::Sha256;

/// Canonical object header: `"<type> <len>\0"`.
pub fn object_header(kind: ObjectKind, len: usize) -> Vec<u8> {
    let mut header = format!("{} {}", kind.tag(), len).into_bytes();
    header.push(0);
    header
}

/// Object content hasher bound to one digest algorithm.
///
/// The type tag is part of the hashed bytes, so a blob and a tree with
/// identical content produce different identities.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContentHasher {
    algorithm: HashAlgorithm,
}

impl ContentHasher {
    /// Git-compatible SHA-1 hasher.
    pub const SHA1: Self = Self::new(HashAlgorithm::Sha1);
    /// SHA-256 hasher.
    pub const SHA256: Self = Self::new(HashAlgorithm::Sha256);
    /// BLAKE3 hasher.
    pub const BLAKE3: Self = Self::new(HashAlgorithm::Blake3);

    pub const fn new(algorithm: HashAlgorithm) -> Self {
        Self { algorithm }
    }

    /// The digest algorithm this hasher uses.
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// Identity of an object of `kind` holding `data`.
    pub fn hash_object(&self, kind: ObjectKind, data: &[u8]) -> ObjectId {
        let header = object_header(kind, data.len());
        match self.algorithm {
            HashAlgorithm::Sha1 => {
                let mut hasher = Sha1::new();
                hasher.update(&header);
                hasher.update(data);
                let mut digest = [0u8; 20];
                digest.copy_from_slice(&hasher.finalize());
                ObjectId::from_sha1(digest)
            }
            HashAlgorithm::Sha256 => {
                let mut hasher = Sha256::new();
                hasher.update(&header);
                hasher.update(data);
                let mut digest = [0u8; 32];
                digest.copy_from_slice(&hasher.finalize());
                ObjectId::from_hash(digest)
            }
            HashAlgorithm::Blake3 => {
                let mut hasher = blake3::Hasher::new();
                hasher.update(&header);
                hasher.update(data);
                ObjectId::from_hash(*hasher.finalize().as_bytes())
            }
        }
    }

    /// Verify that `data` of `kind` produces the expected object ID.
    pub fn verify(&self, kind: ObjectKind, data: &[u8], expected: &ObjectId) -> bool {
        self.hash_object(kind, data) == *expected
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new(HashAlgorithm::default())
    }
}

impl From<HashAlgorithm> for ContentHasher {
    fn from(algorithm: HashAlgorithm) -> Self {
        Self::new(algorithm)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn sha1_matches_git_empty_blob() {
        let id = ContentHasher::SHA1.hash_object(ObjectKind::Blob, b"");
        assert_eq!(id.to_hex(), "e69de29bb2d1d6434b8b29ae775ad8c2e48c5391");
    }

    #[test]
    fn sha1_matches_git_empty_tree() {
        let id = ContentHasher::SHA1.hash_object(ObjectKind::Tree, b"");
        assert_eq!(id.to_hex(), "4b825dc642cb6eb9a060e54bf8d69288fbee4904");
    }

    #[test]
    fn widths_follow_algorithm() {
        assert_eq!(ContentHasher::SHA1.hash_object(ObjectKind::Blob, b"x").width(), 20);
        assert_eq!(ContentHasher::SHA256.hash_object(ObjectKind::Blob, b"x").width(), 32);
        assert_eq!(ContentHasher::BLAKE3.hash_object(ObjectKind::Blob, b"x").width(), 32);
    }

    #[test]
    fn different_kinds_produce_different_hashes() {
        for hasher in [ContentHasher::SHA1, ContentHasher::SHA256, ContentHasher::BLAKE3] {
            let blob = hasher.hash_object(ObjectKind::Blob, b"same content");
            let tree = hasher.hash_object(ObjectKind::Tree, b"same content");
            let commit = hasher.hash_object(ObjectKind::Commit, b"same content");
            assert_ne!(blob, tree);
            assert_ne!(blob, commit);
            assert_ne!(tree, commit);
        }
    }

    #[test]
    fn algorithms_disagree() {
        let sha256 = ContentHasher::SHA256.hash_object(ObjectKind::Blob, b"data");
        let blake3 = ContentHasher::BLAKE3.hash_object(ObjectKind::Blob, b"data");
        assert_ne!(sha256, blake3);
    }

    #[test]
    fn verify_detects_tampering() {
        let id = ContentHasher::SHA1.hash_object(ObjectKind::Blob, b"original");
        assert!(ContentHasher::SHA1.verify(ObjectKind::Blob, b"original", &id));
        assert!(!ContentHasher::SHA1.verify(ObjectKind::Blob, b"tampered", &id));
        assert!(!ContentHasher::SHA1.verify(ObjectKind::Tree, b"original", &id));
    }

    #[test]
    fn header_format() {
        assert_eq!(object_header(ObjectKind::Commit, 12), b"commit 12\0".to_vec());
    }

    #[test]
    fn no_collisions_across_corpus() {
        let hasher = ContentHasher::SHA1;
        let mut seen = HashSet::new();
        for i in 0u32..10_000 {
            let data = i.to_le_bytes();
            assert!(seen.insert(hasher.hash_object(ObjectKind::Blob, &data)));
        }
        // Variable-length inputs, including prefixes of one another.
        for len in 0..512 {
            let data = vec![7u8; len];
            assert!(seen.insert(hasher.hash_object(ObjectKind::Blob, &data)));
        }
    }

    proptest! {
        #[test]
        fn hashing_is_deterministic(data in proptest::collection::vec(any::<u8>(), 0..1024)) {
            let a = ContentHasher::SHA1.hash_object(ObjectKind::Blob, &data);
            let b = ContentHasher::SHA1.hash_object(ObjectKind::Blob, &data);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn distinct_inputs_distinct_ids(
            a in proptest::collection::vec(any::<u8>(), 0..256),
            b in proptest::collection::vec(any::<u8>(), 0..256),
        ) {
            let id_a = ContentHasher::BLAKE3.hash_object(ObjectKind::Blob, &a);
            let id_b = ContentHasher::BLAKE3.hash_object(ObjectKind::Blob, &b);
            prop_assert_eq!(a == b, id_a == id_b);
        }
    }
}
