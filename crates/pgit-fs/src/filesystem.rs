//! The [`GitFileSystem`] staged view.
//!
//! The view keeps a flat `BTreeMap` of every file path in the checked-out
//! state. Writes and deletes edit that map directly and store blobs right
//! away; [`persist`](GitFileSystem::persist) folds the map back into nested
//! tree objects. Directories exist only implicitly, through the files below
//! them, so an emptied directory disappears from the next tree.

use std::collections::BTreeMap;
use std::sync::Arc;

use pgit_store::{
    Blob, BlobSnapshot, CommitSnapshot, EntryMode, ObjectCodec, ObjectStore, Tree, TreeEntry,
    TreeSnapshot,
};
use pgit_types::ObjectId;
use tracing::debug;

use crate::entry::StagedChange;
use crate::error::{FsError, FsResult};

/// Mode and blob id of one file.
type FileEntry = (EntryMode, ObjectId);

/// A branch checked out into memory, with staged edits on top.
pub struct GitFileSystem {
    store: Arc<dyn ObjectStore>,
    branch: Option<String>,
    head: Option<CommitSnapshot>,
    /// Every file in the current state, keyed by normalized path.
    files: BTreeMap<String, FileEntry>,
    /// Edits made since `head`, keyed by normalized path.
    staged: BTreeMap<String, StagedChange>,
    /// Tree id of `files`, if known.
    tree_cache: Option<ObjectId>,
}

impl std::fmt::Debug for GitFileSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitFileSystem")
            .field("branch", &self.branch)
            .field("head", &self.head.as_ref().map(|c| c.id()))
            .field("files", &self.files.len())
            .field("staged", &self.staged.len())
            .field("tree_cache", &self.tree_cache)
            .finish()
    }
}

impl GitFileSystem {
    /// Open a view of `branch` at `head`.
    ///
    /// `branch` is `None` for a detached view. `head` is `None` for an unborn
    /// branch, which starts out empty.
    pub fn open(
        store: Arc<dyn ObjectStore>,
        branch: Option<String>,
        head: Option<CommitSnapshot>,
    ) -> FsResult<Self> {
        let mut files = BTreeMap::new();
        if let Some(commit) = &head {
            flatten(store.as_ref(), commit.tree, "", &mut files)?;
        }
        let tree_cache = head.as_ref().map(|c| c.tree);
        Ok(Self {
            store,
            branch,
            head,
            files,
            staged: BTreeMap::new(),
            tree_cache,
        })
    }

    /// Branch this view commits to, `None` when detached.
    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    /// Commit the view is based on, `None` on an unborn branch.
    pub fn head(&self) -> Option<&CommitSnapshot> {
        self.head.as_ref()
    }

    /// The backing object store.
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Returns `true` if edits were made since the head commit.
    pub fn is_dirty(&self) -> bool {
        !self.staged.is_empty()
    }

    /// Edits made since the head commit.
    pub fn staged_changes(&self) -> &BTreeMap<String, StagedChange> {
        &self.staged
    }

    /// All file paths in the current state, sorted.
    pub fn list_files(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    // ---------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------

    /// Returns `true` if a file or a non-empty directory exists at `path`.
    pub fn exists(&self, path: &str) -> FsResult<bool> {
        let path = normalize_path(path)?;
        Ok(self.files.contains_key(&path) || self.is_dir(&path))
    }

    /// Read the content of the file at `path`.
    pub fn read_file(&self, path: &str) -> FsResult<Vec<u8>> {
        let path = normalize_path(path)?;
        match self.files.get(&path) {
            Some((_, id)) => Ok(BlobSnapshot::load(*id, self.store.as_ref())?.into_data().data),
            None if self.is_dir(&path) => Err(FsError::NotAFile(path)),
            None => Err(FsError::NotFound(path)),
        }
    }

    /// Mode of the file at `path`, if any.
    pub fn file_mode(&self, path: &str) -> FsResult<Option<EntryMode>> {
        let path = normalize_path(path)?;
        Ok(self.files.get(&path).map(|(mode, _)| *mode))
    }

    fn is_dir(&self, path: &str) -> bool {
        let prefix = format!("{path}/");
        self.files
            .range(prefix.clone()..)
            .next()
            .is_some_and(|(k, _)| k.starts_with(&prefix))
    }

    // ---------------------------------------------------------------
    // Edits
    // ---------------------------------------------------------------

    /// Write a file, keeping the mode of any file already at `path`. New
    /// files are regular. Returns the blob id.
    pub fn write_file(&mut self, path: &str, content: &[u8]) -> FsResult<ObjectId> {
        let mode = self.file_mode(path)?.unwrap_or(EntryMode::Regular);
        self.write_file_with_mode(path, content, mode)
    }

    /// Write a file with an explicit mode. Returns the blob id.
    ///
    /// A file replaces any directory at `path`, and any file at one of its
    /// ancestors becomes a directory.
    pub fn write_file_with_mode(
        &mut self,
        path: &str,
        content: &[u8],
        mode: EntryMode,
    ) -> FsResult<ObjectId> {
        let path = normalize_path(path)?;
        if mode == EntryMode::Directory {
            return Err(FsError::NotAFile(path));
        }

        let object_id = self.store.write(&Blob::new(content).to_stored_object())?;

        if self.files.get(&path) == Some(&(mode, object_id)) {
            return Ok(object_id);
        }

        remove_subtree(&mut self.files, &path);
        remove_subtree(&mut self.staged, &path);
        for ancestor in ancestors(&path) {
            self.files.remove(ancestor);
            if matches!(self.staged.get(ancestor), Some(StagedChange::Write { .. })) {
                self.staged.remove(ancestor);
            }
        }

        self.files.insert(path.clone(), (mode, object_id));
        self.staged.insert(
            path,
            StagedChange::Write {
                object_id,
                mode,
                size: content.len() as u64,
            },
        );
        self.tree_cache = None;
        Ok(object_id)
    }

    /// Delete the file or directory at `path`.
    ///
    /// Returns `false` if nothing existed there.
    pub fn delete(&mut self, path: &str) -> FsResult<bool> {
        let path = normalize_path(path)?;
        if !self.files.contains_key(&path) && !self.is_dir(&path) {
            return Ok(false);
        }
        remove_subtree(&mut self.files, &path);
        remove_subtree(&mut self.staged, &path);
        self.staged.insert(path, StagedChange::Delete);
        self.tree_cache = None;
        Ok(true)
    }

    // ---------------------------------------------------------------
    // Tree building
    // ---------------------------------------------------------------

    /// Store the current state as nested trees and return the root tree id.
    ///
    /// Repeated calls without edits in between return the cached id.
    pub fn persist(&mut self) -> FsResult<ObjectId> {
        if let Some(id) = self.tree_cache {
            return Ok(id);
        }

        let mut root = Dir::default();
        for (path, (mode, id)) in &self.files {
            let (parent, name) = path.rsplit_once('/').unwrap_or(("", path.as_str()));
            let mut dir = &mut root;
            if !parent.is_empty() {
                for component in parent.split('/') {
                    dir = dir.dirs.entry(component.to_string()).or_default();
                }
            }
            dir.files.push(TreeEntry::new(*mode, name, *id));
        }

        let tree_id = self.write_dir(root)?;
        debug!(
            branch = ?self.branch,
            tree = %tree_id.short_hex(),
            files = self.files.len(),
            "materialized tree"
        );
        self.tree_cache = Some(tree_id);
        Ok(tree_id)
    }

    fn write_dir(&self, dir: Dir) -> FsResult<ObjectId> {
        let mut entries = dir.files;
        for (name, sub) in dir.dirs {
            let id = self.write_dir(sub)?;
            entries.push(TreeEntry::new(EntryMode::Directory, name, id));
        }
        let snapshot = TreeSnapshot::capture(Tree::new(entries), self.store.algorithm());
        Ok(snapshot.save(self.store.as_ref())?)
    }

    /// Move the view onto `commit`.
    ///
    /// When the commit's tree is the one last materialized from this view,
    /// the staged edits are exactly what the commit recorded and are cleared.
    /// Otherwise the view is reloaded from the commit's tree.
    pub fn set_current_commit(&mut self, commit: CommitSnapshot) -> FsResult<()> {
        if self.tree_cache != Some(commit.tree) {
            let mut files = BTreeMap::new();
            flatten(self.store.as_ref(), commit.tree, "", &mut files)?;
            self.files = files;
            self.tree_cache = Some(commit.tree);
        }
        self.staged.clear();
        debug!(branch = ?self.branch, commit = %commit.id().short_hex(), "moved view to commit");
        self.head = Some(commit);
        Ok(())
    }
}

/// Directory under construction in [`GitFileSystem::persist`].
#[derive(Default)]
struct Dir {
    files: Vec<TreeEntry>,
    dirs: BTreeMap<String, Dir>,
}

/// Read a tree recursively into `out`, keyed by slash-joined path.
fn flatten(
    store: &dyn ObjectStore,
    tree_id: ObjectId,
    prefix: &str,
    out: &mut BTreeMap<String, FileEntry>,
) -> FsResult<()> {
    let tree = TreeSnapshot::load(tree_id, store)?;
    for entry in &tree.entries {
        let path = if prefix.is_empty() {
            entry.name.clone()
        } else {
            format!("{prefix}/{}", entry.name)
        };
        match entry.mode {
            EntryMode::Directory => flatten(store, entry.object_id, &path, out)?,
            mode => {
                out.insert(path, (mode, entry.object_id));
            }
        }
    }
    Ok(())
}

/// Remove `path` and everything below it.
fn remove_subtree<V>(map: &mut BTreeMap<String, V>, path: &str) {
    let prefix = format!("{path}/");
    map.retain(|k, _| k != path && !k.starts_with(&prefix));
}

/// Proper ancestors of a normalized path: `a/b/c` yields `a`, `a/b`.
fn ancestors(path: &str) -> impl Iterator<Item = &str> {
    path.match_indices('/').map(move |(i, _)| &path[..i])
}

/// Normalize a slash-separated path.
///
/// Leading and trailing slashes are dropped. Empty paths and paths with
/// empty, `.`, `..` or NUL-bearing components are rejected.
pub fn normalize_path(path: &str) -> FsResult<String> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Err(FsError::InvalidPath(path.to_string()));
    }
    for component in trimmed.split('/') {
        if component.is_empty() || component == "." || component == ".." || component.contains('\0')
        {
            return Err(FsError::InvalidPath(path.to_string()));
        }
    }
    Ok(trimmed.to_string())
}
