use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use pgit_crypto::object_header;
use pgit_types::{HashAlgorithm, ObjectId, ObjectKind};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::object::StoredObject;
use crate::traits::ObjectStore;

/// zstd level for object files.
const COMPRESSION_LEVEL: i32 = 3;

/// Directory-backed store with one compressed file per object.
///
/// Objects live at `<root>/<first two hex chars>/<remaining hex chars>`, like
/// git's `.git/objects`. Each file holds the zstd-compressed canonical form
/// `"<type> <len>\0<content>"`. Files are written to a temporary file in the
/// fan-out directory and renamed into place, so readers never observe a
/// partial object.
#[derive(Debug)]
pub struct LooseObjectStore {
    root: PathBuf,
    algorithm: HashAlgorithm,
}

impl LooseObjectStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>, algorithm: HashAlgorithm) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root, algorithm })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, id: &ObjectId) -> PathBuf {
        let hex = id.to_hex();
        self.root.join(&hex[..2]).join(&hex[2..])
    }

    fn decode_file(id: &ObjectId, raw: &[u8]) -> StoreResult<StoredObject> {
        let corrupt = |reason: String| StoreError::CorruptObject { id: *id, reason };

        let bytes = zstd::decode_all(raw).map_err(|e| corrupt(format!("decompression failed: {e}")))?;
        let nul = bytes
            .iter()
            .position(|b| *b == 0)
            .ok_or_else(|| corrupt("missing header terminator".into()))?;
        let header =
            std::str::from_utf8(&bytes[..nul]).map_err(|_| corrupt("header is not UTF-8".into()))?;
        let (tag, len) = header
            .split_once(' ')
            .ok_or_else(|| corrupt(format!("malformed header {header:?}")))?;
        let kind = ObjectKind::from_tag(tag).map_err(|e| corrupt(e.to_string()))?;
        let len: usize = len
            .parse()
            .map_err(|_| corrupt(format!("bad length in header {header:?}")))?;

        let data = &bytes[nul + 1..];
        if data.len() != len {
            return Err(corrupt(format!(
                "size mismatch: header says {len}, found {}",
                data.len()
            )));
        }
        Ok(StoredObject::new(kind, data.to_vec()))
    }
}

impl ObjectStore for LooseObjectStore {
    fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        let raw = match fs::read(self.object_path(id)) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Self::decode_file(id, &raw).map(Some)
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let id = object.compute_id(&self.hasher());
        if id.is_null() {
            return Err(StoreError::NullObjectId);
        }

        let path = self.object_path(&id);
        if path.exists() {
            return Ok(id);
        }

        let mut canonical = object_header(object.kind, object.data.len());
        canonical.extend_from_slice(&object.data);
        let compressed = zstd::encode_all(canonical.as_slice(), COMPRESSION_LEVEL)?;

        let dir = path.parent().unwrap_or(&self.root);
        fs::create_dir_all(dir)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&compressed)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;

        debug!(id = %id.short_hex(), kind = %object.kind, size = object.size, "wrote loose object");
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.object_path(id).is_file())
    }

    fn delete(&self, id: &ObjectId) -> StoreResult<bool> {
        match fs::remove_file(self.object_path(id)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
