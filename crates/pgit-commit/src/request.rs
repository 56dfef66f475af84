//! The commit builder.

use chrono::{DateTime, FixedOffset};
use pgit_refs::{branch_ref_name, validate_branch_name, RefStore};
use pgit_store::{Commit, CommitSnapshot, ObjectStore};
use pgit_types::{ObjectId, PersonIdent};
use tracing::debug;

use crate::config::RepoConfig;
use crate::error::{CommitError, CommitResult};
use crate::gate::{GateRequest, RefUpdateGate};
use crate::identity::{IdentityProvider, IdentityInput, Role};
use crate::view::FileSystemView;

/// Shared collaborators of a commit.
#[derive(Clone, Copy)]
pub struct CommitContext<'a> {
    pub store: &'a dyn ObjectStore,
    pub refs: &'a dyn RefStore,
    pub identity: &'a dyn IdentityProvider,
}

/// Result of a successful [`CommitRequest::execute`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommitOutcome {
    /// A new commit now heads the branch.
    Committed(CommitSnapshot),
    /// The staged tree equals the base commit's tree; nothing was written.
    NoOp,
}

impl CommitOutcome {
    pub fn commit(&self) -> Option<&CommitSnapshot> {
        match self {
            Self::Committed(commit) => Some(commit),
            Self::NoOp => None,
        }
    }

    pub fn into_commit(self) -> Option<CommitSnapshot> {
        match self {
            Self::Committed(commit) => Some(commit),
            Self::NoOp => None,
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NoOp)
    }
}

/// Configuration for one commit, consumed by [`execute`](Self::execute).
///
/// ```ignore
/// let outcome = CommitRequest::new()
///     .committer_name("Ada")
///     .committer_email("ada@example.com")
///     .message("add notes")
///     .execute(&mut view, &ctx)?;
/// ```
#[derive(Clone, Debug, Default)]
#[must_use = "a commit request does nothing until executed"]
pub struct CommitRequest {
    author: IdentityInput,
    committer: IdentityInput,
    message: String,
    parents: Option<Vec<ObjectId>>,
    amend: bool,
    allow_empty: bool,
    ref_log: Option<String>,
}

impl CommitRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// A request carrying the `[commit]` defaults of `config`.
    pub fn from_config(config: &RepoConfig) -> Self {
        Self::new().allow_empty(config.commit.allow_empty)
    }

    pub fn author(mut self, ident: PersonIdent) -> Self {
        self.author = IdentityInput::Full(ident);
        self
    }

    pub fn author_name(mut self, name: impl Into<String>) -> Self {
        self.author = self.author.with_name(name);
        self
    }

    pub fn author_email(mut self, email: impl Into<String>) -> Self {
        self.author = self.author.with_email(email);
        self
    }

    pub fn committer(mut self, ident: PersonIdent) -> Self {
        self.committer = IdentityInput::Full(ident);
        self
    }

    pub fn committer_name(mut self, name: impl Into<String>) -> Self {
        self.committer = self.committer.with_name(name);
        self
    }

    pub fn committer_email(mut self, email: impl Into<String>) -> Self {
        self.committer = self.committer.with_email(email);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Use exactly these parents, e.g. to record a merge.
    pub fn parents(mut self, parents: Vec<ObjectId>) -> Self {
        self.parents = Some(parents);
        self
    }

    /// Replace the branch tip instead of building on it.
    pub fn amend(mut self, amend: bool) -> Self {
        self.amend = amend;
        self
    }

    /// Commit even when the tree is unchanged.
    pub fn allow_empty(mut self, allow_empty: bool) -> Self {
        self.allow_empty = allow_empty;
        self
    }

    /// Ref-log message recorded instead of the default one.
    pub fn ref_log(mut self, message: impl Into<String>) -> Self {
        self.ref_log = Some(message.into());
        self
    }

    /// Build the commit and move the view's branch to it.
    ///
    /// Configuration problems are reported before anything is written. On
    /// [`CommitError::RefUpdateConflict`] the branch is untouched and the
    /// new commit object is left in the store unreferenced.
    pub fn execute<V>(
        self,
        view: &mut V,
        ctx: &CommitContext<'_>,
    ) -> CommitResult<CommitOutcome>
    where
        V: FileSystemView + ?Sized,
    {
        let branch = view
            .current_branch()
            .ok_or(CommitError::DetachedHead)?
            .to_string();
        validate_branch_name(&branch)?;
        let base = view.current_commit().cloned();

        let now = ctx.identity.now();
        let committer = self.resolve_committer(ctx.identity, now)?;
        let author = self.resolve_author(&committer, base.as_ref(), now)?;
        let parents = self.resolve_parents(base.as_ref());

        let tree = view.materialize_tree()?;
        if let Some(base) = &base {
            if !self.allow_empty && !self.amend && base.tree == tree {
                debug!(branch = %branch, tree = %tree.short_hex(), "nothing to commit");
                return Ok(CommitOutcome::NoOp);
            }
        }

        let commit = Commit {
            tree,
            parents,
            author,
            committer,
            message: self.message,
        };
        let id = ctx.store.create_commit(&commit)?;
        let snapshot = ctx.store.read_commit(&id)?;

        let ref_name = branch_ref_name(&branch);
        let mode = RefUpdateGate::new(ctx.refs).apply(&GateRequest {
            ref_name: &ref_name,
            new_commit: id,
            subject: snapshot.subject(),
            base: base.as_ref().map(|b| b.id()),
            amend: self.amend,
            ref_log: self.ref_log.as_deref(),
            committer: &snapshot.committer,
        })?;

        view.set_current_commit(snapshot.clone())?;
        debug!(
            branch = %branch,
            mode = %mode,
            tree = %tree.short_hex(),
            commit = %id.short_hex(),
            "committed"
        );
        Ok(CommitOutcome::Committed(snapshot))
    }

    fn resolve_committer(
        &self,
        provider: &dyn IdentityProvider,
        now: DateTime<FixedOffset>,
    ) -> CommitResult<PersonIdent> {
        match &self.committer {
            IdentityInput::Full(ident) => Ok(ident.clone()),
            IdentityInput::NameEmail { name, email } => {
                Ok(PersonIdent::new(name.as_str(), email.as_str(), now)?)
            }
            IdentityInput::Unset => {
                let (name, email) = provider
                    .ambient_identity()
                    .ok_or(CommitError::NoAmbientIdentity)?;
                Ok(PersonIdent::new(name, email, now)?)
            }
            IdentityInput::NameOnly(_) | IdentityInput::EmailOnly(_) => {
                Err(CommitError::IncompleteIdentity {
                    role: Role::Committer,
                })
            }
        }
    }

    fn resolve_author(
        &self,
        committer: &PersonIdent,
        base: Option<&CommitSnapshot>,
        now: DateTime<FixedOffset>,
    ) -> CommitResult<PersonIdent> {
        if self.amend {
            let original = &base.ok_or(CommitError::NoCommitToAmend)?.author;
            return Ok(match &self.author {
                IdentityInput::Full(ident) => ident.clone(),
                IdentityInput::NameOnly(name) => original.with_name(name.as_str())?,
                IdentityInput::EmailOnly(email) => original.with_email(email.as_str())?,
                IdentityInput::NameEmail { name, email } => {
                    original.with_name(name.as_str())?.with_email(email.as_str())?
                }
                IdentityInput::Unset => original.clone(),
            });
        }

        match &self.author {
            IdentityInput::Full(ident) => Ok(ident.clone()),
            IdentityInput::NameEmail { name, email } => {
                Ok(PersonIdent::new(name.as_str(), email.as_str(), now)?)
            }
            IdentityInput::Unset => Ok(committer.clone()),
            IdentityInput::NameOnly(_) | IdentityInput::EmailOnly(_) => {
                Err(CommitError::IncompleteIdentity { role: Role::Author })
            }
        }
    }

    fn resolve_parents(&self, base: Option<&CommitSnapshot>) -> Vec<ObjectId> {
        match (&self.parents, base) {
            (Some(parents), _) => parents.clone(),
            (None, Some(base)) if self.amend => base.parents.clone(),
            (None, Some(base)) => vec![base.id()],
            (None, None) => Vec::new(),
        }
    }
}
