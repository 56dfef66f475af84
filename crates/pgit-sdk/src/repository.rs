use std::path::Path;
use std::sync::Arc;

use pgit_commit::{
    CommitContext, CommitOutcome, CommitRequest, ConfigIdentityProvider, IdentityProvider,
    RepoConfig,
};
use pgit_fs::{normalize_path, GitFileSystem};
use pgit_refs::{
    branch_ref_name, validate_branch_name, InMemoryRefStore, RefLogEntry, RefStore,
};
use pgit_store::{
    Blob, CommitSnapshot, EntryMode, InMemoryObjectStore, LooseObjectStore, ObjectCodec,
    ObjectStore, Tree, TreeSnapshot,
};
use pgit_types::{ObjectId, PersonIdent};
use tracing::debug;

use crate::commit::CommitSummary;
use crate::error::{SdkError, SdkResult};

/// File name of the configuration inside an on-disk repository.
pub const CONFIG_FILE: &str = "config.toml";

/// Directory holding loose objects inside an on-disk repository.
pub const OBJECTS_DIR: &str = "objects";

/// High-level pgit repository API.
pub struct Repository {
    config: RepoConfig,
    store: Arc<dyn ObjectStore>,
    refs: Arc<dyn RefStore>,
    identity: Arc<dyn IdentityProvider>,
}

impl Repository {
    /// Initialize an in-memory repository.
    pub fn init(config: RepoConfig) -> SdkResult<Self> {
        let store = Arc::new(InMemoryObjectStore::with_algorithm(config.core.hash_algorithm));
        Self::init_with_store(config, store)
    }

    /// Initialize over an existing object store, e.g. a shared one.
    ///
    /// The store's digest algorithm wins over the configured one.
    pub fn init_with_store(
        mut config: RepoConfig,
        store: Arc<dyn ObjectStore>,
    ) -> SdkResult<Self> {
        validate_branch_name(&config.core.default_branch)?;
        config.core.hash_algorithm = store.algorithm();

        let refs = InMemoryRefStore::new();
        refs.set_head(&config.core.default_branch)?;
        let identity = Arc::new(ConfigIdentityProvider::new(&config));

        debug!(
            algorithm = %config.core.hash_algorithm,
            branch = %config.core.default_branch,
            "initialized repository"
        );
        Ok(Self {
            config,
            store,
            refs: Arc::new(refs),
            identity,
        })
    }

    /// Open or create a repository directory with loose objects.
    ///
    /// `config.toml` is read if present and written otherwise. Refs live in
    /// memory for the lifetime of the returned value.
    pub fn init_at(root: &Path) -> SdkResult<Self> {
        let config_path = root.join(CONFIG_FILE);
        let config = if config_path.exists() {
            RepoConfig::load(&config_path)?
        } else {
            std::fs::create_dir_all(root)?;
            let config = RepoConfig::default();
            config.save(&config_path)?;
            config
        };
        let store = LooseObjectStore::open(root.join(OBJECTS_DIR), config.core.hash_algorithm)?;
        Self::init_with_store(config, Arc::new(store))
    }

    /// Replace the source of default identities and timestamps.
    pub fn with_identity(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = identity;
        self
    }

    // ---- Content operations ----

    pub fn write_blob(&self, data: &[u8]) -> SdkResult<ObjectId> {
        let id = self.store.write(&Blob::new(data).to_stored_object())?;
        Ok(id)
    }

    pub fn read_blob(&self, id: &ObjectId) -> SdkResult<Vec<u8>> {
        let obj = self.store.open(id)?;
        let blob = Blob::from_stored_object(*id, &obj, self.store.algorithm())?;
        Ok(blob.data)
    }

    pub fn read_tree(&self, id: &ObjectId) -> SdkResult<Tree> {
        Ok(TreeSnapshot::load(*id, self.store.as_ref())?.into_data())
    }

    pub fn read_commit(&self, id: &ObjectId) -> SdkResult<CommitSnapshot> {
        Ok(self.store.read_commit(id)?)
    }

    /// Content of the file at `path` in `commit`, `None` if there is none.
    pub fn read_path(&self, commit: &ObjectId, path: &str) -> SdkResult<Option<Vec<u8>>> {
        let path = normalize_path(path)?;
        let mut tree = self.read_tree(&self.store.read_commit(commit)?.tree)?;
        let mut components = path.split('/').peekable();
        while let Some(name) = components.next() {
            let Some(entry) = tree.get(name) else {
                return Ok(None);
            };
            let (mode, id) = (entry.mode, entry.object_id);
            match (mode, components.peek()) {
                (EntryMode::Directory, Some(_)) => tree = self.read_tree(&id)?,
                (EntryMode::Directory, None) | (_, Some(_)) => return Ok(None),
                (_, None) => return self.read_blob(&id).map(Some),
            }
        }
        Ok(None)
    }

    // ---- Commit operations ----

    /// A request carrying this repository's commit defaults.
    pub fn commit_request(&self) -> CommitRequest {
        CommitRequest::from_config(&self.config)
    }

    /// Execute `request` against `view`.
    pub fn commit(
        &self,
        view: &mut GitFileSystem,
        request: CommitRequest,
    ) -> SdkResult<CommitOutcome> {
        let ctx = CommitContext {
            store: self.store.as_ref(),
            refs: self.refs.as_ref(),
            identity: self.identity.as_ref(),
        };
        Ok(request.execute(view, &ctx)?)
    }

    /// First-parent history of `branch`, newest first.
    pub fn log(&self, branch: &str, limit: usize) -> SdkResult<Vec<CommitSummary>> {
        let mut next = self.branch_tip(branch)?;
        let mut entries = Vec::new();
        while let Some(id) = next {
            if entries.len() >= limit {
                break;
            }
            let commit = self.store.read_commit(&id)?;
            next = commit.first_parent().copied();
            entries.push(CommitSummary::from(&commit));
        }
        Ok(entries)
    }

    pub fn reflog(&self, branch: &str) -> SdkResult<Vec<RefLogEntry>> {
        Ok(self.refs.reflog(&branch_ref_name(branch))?)
    }

    // ---- Branch operations ----

    /// Open a staged view of `branch`. An unborn branch gives an empty view.
    pub fn checkout(&self, branch: &str) -> SdkResult<GitFileSystem> {
        validate_branch_name(branch)?;
        let head = match self.branch_tip(branch)? {
            Some(id) => Some(self.store.read_commit(&id)?),
            None => None,
        };
        Ok(GitFileSystem::open(
            Arc::clone(&self.store),
            Some(branch.to_string()),
            head,
        )?)
    }

    /// Open a staged view of the branch HEAD points at.
    pub fn checkout_head(&self) -> SdkResult<GitFileSystem> {
        let branch = self.current_branch()?;
        self.checkout(&branch)
    }

    /// Open a read-only view at `commit`. It has no branch, so commits
    /// from it fail.
    pub fn checkout_detached(&self, commit: &ObjectId) -> SdkResult<GitFileSystem> {
        let head = self.store.read_commit(commit)?;
        Ok(GitFileSystem::open(Arc::clone(&self.store), None, Some(head))?)
    }

    /// Commit a branch points at, `None` while unborn.
    pub fn branch_tip(&self, branch: &str) -> SdkResult<Option<ObjectId>> {
        Ok(self
            .refs
            .read_ref(&branch_ref_name(branch))?
            .map(|r| r.target))
    }

    /// Create `name` pointing at `start`.
    pub fn create_branch(&self, name: &str, start: &ObjectId) -> SdkResult<()> {
        validate_branch_name(name)?;
        let commit = self.store.read_commit(start)?;
        let actor = self.actor()?;
        self.refs.create_ref(
            &branch_ref_name(name),
            commit.id(),
            &actor,
            &format!("branch: Created from {}", commit.id().short_hex()),
        )?;
        Ok(())
    }

    pub fn delete_branch(&self, name: &str) -> SdkResult<()> {
        if !self.refs.delete_ref(&branch_ref_name(name))? {
            return Err(SdkError::BranchNotFound(name.into()));
        }
        Ok(())
    }

    pub fn switch_branch(&self, name: &str) -> SdkResult<()> {
        if self.branch_tip(name)?.is_none() {
            return Err(SdkError::BranchNotFound(name.into()));
        }
        self.refs.set_head(name)?;
        Ok(())
    }

    pub fn current_branch(&self) -> SdkResult<String> {
        self.refs
            .current_branch()?
            .ok_or_else(|| SdkError::InvalidOperation("HEAD is not on a branch".into()))
    }

    pub fn list_branches(&self) -> SdkResult<Vec<String>> {
        let branches = self.refs.branches()?;
        Ok(branches
            .iter()
            .map(|r| r.short_name().to_string())
            .collect())
    }

    // ---- Accessors ----

    pub fn config(&self) -> &RepoConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    pub fn refs(&self) -> &Arc<dyn RefStore> {
        &self.refs
    }

    /// Identity recorded in ref-logs for non-commit ref changes.
    fn actor(&self) -> SdkResult<PersonIdent> {
        let (name, email) = self
            .identity
            .ambient_identity()
            .ok_or(pgit_commit::CommitError::NoAmbientIdentity)?;
        let actor = PersonIdent::new(name, email, self.identity.now())
            .map_err(pgit_commit::CommitError::from)?;
        Ok(actor)
    }
}
