use pgit_crypto::ContentHasher;
use pgit_types::{HashAlgorithm, ObjectId, ObjectKind, PersonIdent};

use crate::error::{StoreError, StoreResult};

/// A stored object: kind tag + encoded data + cached size.
///
/// `StoredObject` is the unit of storage. The store never interprets the
/// contents of the data; it is a pure key-value store keyed by content hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    /// The type of this object.
    pub kind: ObjectKind,
    /// The encoded bytes of the object (without the canonical header).
    pub data: Vec<u8>,
    /// The size of `data` in bytes.
    pub size: u64,
}

impl StoredObject {
    /// Create a new stored object from kind and data.
    pub fn new(kind: ObjectKind, data: Vec<u8>) -> Self {
        let size = data.len() as u64;
        Self { kind, data, size }
    }

    /// Compute the content-addressed ID for this object.
    pub fn compute_id(&self, hasher: &ContentHasher) -> ObjectId {
        hasher.hash_object(self.kind, &self.data)
    }
}

/// Encoding between an in-memory object and its stored bytes.
pub trait ObjectCodec: Sized {
    /// The object type this codec reads and writes.
    const KIND: ObjectKind;

    /// Encode into the canonical byte form.
    fn encode(&self) -> Vec<u8>;

    /// Decode from stored bytes. `algorithm` gives the width of embedded ids.
    fn decode(data: &[u8], algorithm: HashAlgorithm) -> Result<Self, String>;

    /// Convert into a `StoredObject` for storage.
    fn to_stored_object(&self) -> StoredObject {
        StoredObject::new(Self::KIND, self.encode())
    }

    /// Decode from a `StoredObject` filed under `id`.
    fn from_stored_object(
        id: ObjectId,
        obj: &StoredObject,
        algorithm: HashAlgorithm,
    ) -> StoreResult<Self> {
        if obj.kind != Self::KIND {
            return Err(StoreError::CorruptObject {
                id,
                reason: format!("expected {}, got {}", Self::KIND, obj.kind),
            });
        }
        Self::decode(&obj.data, algorithm).map_err(|reason| StoreError::CorruptObject { id, reason })
    }
}

// ---------------------------------------------------------------------------
// Blob
// ---------------------------------------------------------------------------

/// Raw content object (analogous to git blob).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    /// Create a new blob from raw bytes.
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self { data: data.into() }
    }
}

impl ObjectCodec for Blob {
    const KIND: ObjectKind = ObjectKind::Blob;

    fn encode(&self) -> Vec<u8> {
        self.data.clone()
    }

    fn decode(data: &[u8], _algorithm: HashAlgorithm) -> Result<Self, String> {
        Ok(Self::new(data))
    }
}

// ---------------------------------------------------------------------------
// Tree
// ---------------------------------------------------------------------------

/// File mode for a tree entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntryMode {
    /// Normal file (0o100644).
    Regular,
    /// Executable file (0o100755).
    Executable,
    /// Symbolic link (0o120000).
    Symlink,
    /// Subtree / directory (0o040000).
    Directory,
}

impl EntryMode {
    /// Octal mode value.
    pub fn mode_bits(&self) -> u32 {
        match self {
            Self::Regular => 0o100644,
            Self::Executable => 0o100755,
            Self::Symlink => 0o120000,
            Self::Directory => 0o040000,
        }
    }

    /// Parse from an octal mode value.
    pub fn from_mode_bits(bits: u32) -> Option<Self> {
        match bits {
            0o100644 => Some(Self::Regular),
            0o100755 => Some(Self::Executable),
            0o120000 => Some(Self::Symlink),
            0o040000 => Some(Self::Directory),
            _ => None,
        }
    }

    /// Object kind an entry of this mode refers to.
    pub fn object_kind(&self) -> ObjectKind {
        match self {
            Self::Directory => ObjectKind::Tree,
            _ => ObjectKind::Blob,
        }
    }
}

impl std::fmt::Display for EntryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Tree encoding writes modes without a leading zero.
        write!(f, "{:o}", self.mode_bits())
    }
}

/// A single entry in a tree object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeEntry {
    /// File mode (regular, executable, symlink, directory).
    pub mode: EntryMode,
    /// Entry name: a single path component.
    pub name: String,
    /// Content-addressed ID of the referenced object.
    pub object_id: ObjectId,
}

impl TreeEntry {
    /// Create a new tree entry.
    pub fn new(mode: EntryMode, name: impl Into<String>, object_id: ObjectId) -> Self {
        Self {
            mode,
            name: name.into(),
            object_id,
        }
    }

    /// Git orders directories as if their name ended with `/`.
    fn sort_key(&self) -> Vec<u8> {
        let mut key = self.name.as_bytes().to_vec();
        if self.mode == EntryMode::Directory {
            key.push(b'/');
        }
        key
    }
}

impl PartialOrd for TreeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TreeEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key()
            .cmp(&other.sort_key())
            .then(self.mode.cmp(&other.mode))
            .then(self.object_id.cmp(&other.object_id))
    }
}

/// Directory listing object (analogous to git tree).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tree {
    /// Sorted entries in this directory.
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    /// Create a new tree with the given entries.
    ///
    /// Entries are sorted for deterministic hashing.
    pub fn new(mut entries: Vec<TreeEntry>) -> Self {
        entries.sort();
        Self { entries }
    }

    /// Look up an entry by name.
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the tree has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ObjectCodec for Tree {
    const KIND: ObjectKind = ObjectKind::Tree;

    fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for entry in &self.entries {
            out.extend_from_slice(format!("{} {}", entry.mode, entry.name).as_bytes());
            out.push(0);
            out.extend_from_slice(entry.object_id.as_bytes());
        }
        out
    }

    fn decode(data: &[u8], algorithm: HashAlgorithm) -> Result<Self, String> {
        let width = algorithm.digest_len();
        let mut entries = Vec::new();
        let mut rest = data;

        while !rest.is_empty() {
            let space = rest
                .iter()
                .position(|b| *b == b' ')
                .ok_or("entry is missing its mode separator")?;
            let mode_str =
                std::str::from_utf8(&rest[..space]).map_err(|_| "entry mode is not UTF-8")?;
            let bits = u32::from_str_radix(mode_str, 8)
                .map_err(|_| format!("entry mode is not octal: {mode_str:?}"))?;
            let mode = EntryMode::from_mode_bits(bits)
                .ok_or_else(|| format!("unknown entry mode {mode_str}"))?;
            rest = &rest[space + 1..];

            let nul = rest
                .iter()
                .position(|b| *b == 0)
                .ok_or("entry name is not NUL-terminated")?;
            let name = std::str::from_utf8(&rest[..nul]).map_err(|_| "entry name is not UTF-8")?;
            if name.is_empty() || name.contains('/') {
                return Err(format!("invalid entry name {name:?}"));
            }
            rest = &rest[nul + 1..];

            if rest.len() < width {
                return Err(format!("entry {name:?} has a truncated object id"));
            }
            let object_id = ObjectId::from_slice(&rest[..width]).map_err(|e| e.to_string())?;
            rest = &rest[width..];

            entries.push(TreeEntry::new(mode, name, object_id));
        }

        Ok(Self::new(entries))
    }
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// Commit object content (analogous to git commit).
///
/// The identity of a commit is not part of its content; pair it with one
/// through [`CommitSnapshot`](crate::CommitSnapshot).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commit {
    /// Root tree of the committed content.
    pub tree: ObjectId,
    /// Parent commits. Empty only for a root commit.
    pub parents: Vec<ObjectId>,
    pub author: PersonIdent,
    pub committer: PersonIdent,
    /// Full commit message, stored verbatim.
    pub message: String,
}

impl Commit {
    /// Returns `true` if this commit has no parents.
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// First parent, following the mainline.
    pub fn first_parent(&self) -> Option<&ObjectId> {
        self.parents.first()
    }

    /// First line of the message.
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

impl ObjectCodec for Commit {
    const KIND: ObjectKind = ObjectKind::Commit;

    fn encode(&self) -> Vec<u8> {
        let mut out = format!("tree {}\n", self.tree);
        for parent in &self.parents {
            out.push_str(&format!("parent {parent}\n"));
        }
        out.push_str(&format!("author {}\n", self.author.to_git_string()));
        out.push_str(&format!("committer {}\n", self.committer.to_git_string()));
        out.push('\n');
        out.push_str(&self.message);
        out.into_bytes()
    }

    fn decode(data: &[u8], algorithm: HashAlgorithm) -> Result<Self, String> {
        let text = std::str::from_utf8(data).map_err(|_| "commit is not UTF-8")?;
        let (headers, message) = text.split_once("\n\n").unwrap_or((text, ""));

        let parse_id = |hex: &str| -> Result<ObjectId, String> {
            let id = ObjectId::from_hex(hex).map_err(|e| e.to_string())?;
            if id.width() != algorithm.digest_len() {
                return Err(format!("id {hex} does not match {algorithm}"));
            }
            Ok(id)
        };

        let mut tree = None;
        let mut parents = Vec::new();
        let mut author = None;
        let mut committer = None;

        for line in headers.lines() {
            if let Some(value) = line.strip_prefix("tree ") {
                if tree.replace(parse_id(value)?).is_some() {
                    return Err("duplicate tree header".into());
                }
            } else if let Some(value) = line.strip_prefix("parent ") {
                parents.push(parse_id(value)?);
            } else if let Some(value) = line.strip_prefix("author ") {
                author = Some(PersonIdent::parse(value).map_err(|e| e.to_string())?);
            } else if let Some(value) = line.strip_prefix("committer ") {
                committer = Some(PersonIdent::parse(value).map_err(|e| e.to_string())?);
            }
            // Other headers (gpgsig, encoding, continuation lines) are ignored.
        }

        Ok(Self {
            tree: tree.ok_or("missing tree header")?,
            parents,
            author: author.ok_or("missing author header")?,
            committer: committer.ok_or("missing committer header")?,
            message: message.to_string(),
        })
    }
}
