//! Core reference types.
//!
//! A ref is a name bound to a commit id. Updates are described by a
//! [`RefUpdate`], which carries the expected previous value and the ref-log
//! record for the change.

use std::fmt;

use pgit_types::{ObjectId, PersonIdent};
use serde::{Deserialize, Serialize};

use crate::names::BRANCH_PREFIX;

/// A named reference and the commit it points at.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ref {
    /// Canonical name (e.g. "refs/heads/main").
    pub name: String,
    /// Commit the ref points at.
    pub target: ObjectId,
}

impl Ref {
    pub fn new(name: impl Into<String>, target: ObjectId) -> Self {
        Self {
            name: name.into(),
            target,
        }
    }

    /// Returns `true` if this ref lives under `refs/heads/`.
    pub fn is_branch(&self) -> bool {
        self.name.starts_with(BRANCH_PREFIX)
    }

    /// Name without the `refs/heads/` prefix, for branches.
    pub fn short_name(&self) -> &str {
        self.name.strip_prefix(BRANCH_PREFIX).unwrap_or(&self.name)
    }
}

/// The state of HEAD: either symbolic (pointing to a branch) or detached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Head {
    /// HEAD points to a branch by short name.
    Symbolic(String),
    /// HEAD is detached, pointing directly at a commit.
    Detached(ObjectId),
}

/// What an update expects the ref's current value to be.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefExpectation {
    /// No check; overwrite whatever is there.
    Any,
    /// The ref must not exist yet.
    Absent,
    /// The ref must currently point at this id.
    Value(ObjectId),
}

impl RefExpectation {
    /// `Value(base)` when there is a base, `Absent` otherwise.
    pub fn from_base(base: Option<ObjectId>) -> Self {
        match base {
            Some(id) => Self::Value(id),
            None => Self::Absent,
        }
    }

    /// Does `current` satisfy this expectation?
    pub fn matches(&self, current: Option<ObjectId>) -> bool {
        match self {
            Self::Any => true,
            Self::Absent => current.is_none(),
            Self::Value(expected) => current == Some(*expected),
        }
    }
}

impl fmt::Display for RefExpectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any value"),
            Self::Absent => f.write_str("no value"),
            Self::Value(id) => write!(f, "{id}"),
        }
    }
}

/// A single compare-and-swap update of one ref.
#[derive(Clone, Debug)]
pub struct RefUpdate {
    /// Canonical ref name.
    pub name: String,
    /// Value the ref must hold for the update to apply.
    pub expected: RefExpectation,
    /// Value the ref will hold afterwards.
    pub new_target: ObjectId,
    /// Who made the change, for the ref-log.
    pub committer: PersonIdent,
    /// Ref-log message.
    pub message: String,
}

impl RefUpdate {
    pub fn new(
        name: impl Into<String>,
        expected: RefExpectation,
        new_target: ObjectId,
        committer: PersonIdent,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            expected,
            new_target,
            committer,
            message: message.into(),
        }
    }
}

/// One entry in a ref's update history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefLogEntry {
    /// Value before the update, `None` when the ref was created.
    pub old: Option<ObjectId>,
    /// Value after the update.
    pub new: ObjectId,
    pub committer: PersonIdent,
    pub message: String,
}
