use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Widest digest any supported algorithm produces.
pub const MAX_ID_LEN: usize = 32;

/// Digest algorithm used to derive object identities.
///
/// A repository is configured with exactly one algorithm; every object it
/// stores is keyed by that algorithm's digest of the canonical
/// `"<type> <len>\0<content>"` serialization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SHA-1, 20 bytes. Produces ids identical to stock Git.
    #[default]
    Sha1,
    /// SHA-256, 32 bytes. Git's `objectformat = sha256`.
    Sha256,
    /// BLAKE3, 32 bytes.
    Blake3,
}

impl HashAlgorithm {
    /// Width in bytes of digests produced by this algorithm.
    pub const fn digest_len(&self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 | Self::Blake3 => 32,
        }
    }

    /// Canonical lowercase name.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Blake3 => "blake3",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha1" | "sha-1" => Ok(Self::Sha1),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            "blake3" => Ok(Self::Blake3),
            other => Err(TypeError::UnknownAlgorithm(other.to_string())),
        }
    }
}

/// The type of a stored object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// Raw content (file contents, arbitrary data).
    Blob,
    /// Directory listing mapping names to child objects.
    Tree,
    /// Commit: tree, parents, authorship and message.
    Commit,
}

impl ObjectKind {
    /// The type tag written into the canonical object header.
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
        }
    }

    /// Parse a type tag.
    pub fn from_tag(tag: &str) -> Result<Self, TypeError> {
        match tag {
            "blob" => Ok(Self::Blob),
            "tree" => Ok(Self::Tree),
            "commit" => Ok(Self::Commit),
            other => Err(TypeError::UnknownObjectKind(other.to_string())),
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Content-addressed identifier for any stored object.
///
/// An `ObjectId` is the digest of an object's type tag and content. Identical
/// content always produces the same `ObjectId`, making objects deduplicatable
/// and verifiable. Its width (20 or 32 bytes) follows the repository's
/// [`HashAlgorithm`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId {
    len: u8,
    bytes: [u8; MAX_ID_LEN],
}

impl ObjectId {
    /// Build an id from a raw digest. The digest must be 20 or 32 bytes.
    pub fn from_slice(digest: &[u8]) -> Result<Self, TypeError> {
        match digest.len() {
            20 | 32 => {
                let mut bytes = [0u8; MAX_ID_LEN];
                bytes[..digest.len()].copy_from_slice(digest);
                Ok(Self {
                    len: digest.len() as u8,
                    bytes,
                })
            }
            actual => Err(TypeError::InvalidLength {
                expected: if actual < 20 { 20 } else { 32 },
                actual,
            }),
        }
    }

    /// Create an `ObjectId` from a pre-computed 20-byte digest.
    pub fn from_sha1(digest: [u8; 20]) -> Self {
        let mut bytes = [0u8; MAX_ID_LEN];
        bytes[..20].copy_from_slice(&digest);
        Self { len: 20, bytes }
    }

    /// Create an `ObjectId` from a pre-computed 32-byte digest.
    pub fn from_hash(digest: [u8; 32]) -> Self {
        Self {
            len: 32,
            bytes: digest,
        }
    }

    /// The null object ID (all zeros) for an algorithm. Represents "no object".
    pub const fn null(algorithm: HashAlgorithm) -> Self {
        Self {
            len: algorithm.digest_len() as u8,
            bytes: [0u8; MAX_ID_LEN],
        }
    }

    /// Returns `true` if this is a null object ID.
    pub fn is_null(&self) -> bool {
        self.as_bytes().iter().all(|b| *b == 0)
    }

    /// The raw digest bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len as usize]
    }

    /// Digest width in bytes.
    pub fn width(&self) -> usize {
        self.len as usize
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.bytes[..4])
    }

    /// Parse from a 40 or 64 character hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.short_hex())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for ObjectId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
