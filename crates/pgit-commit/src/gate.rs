//! The ref-update gate: the single point where a commit becomes visible.
//!
//! Every mode performs a compare-and-swap against the branch value the view
//! was opened at, so a writer that lost a race gets
//! [`CommitError::RefUpdateConflict`] instead of silently discarding the
//! winner's commit.

use std::fmt;

use pgit_refs::{RefExpectation, RefStore};
use pgit_types::{ObjectId, PersonIdent};
use tracing::debug;

use crate::error::{CommitError, CommitResult};

/// How the branch ref is moved to a new commit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UpdateMode {
    /// Set with a caller-supplied ref-log message.
    Logged,
    /// Replace the current tip.
    Amend,
    /// Advance from the current tip.
    FastForward,
    /// Create the branch.
    Create,
}

impl UpdateMode {
    /// First match wins: an explicit ref-log message, then amend, then an
    /// existing base, then creation.
    pub fn select(ref_log: bool, amend: bool, has_base: bool) -> Self {
        if ref_log {
            Self::Logged
        } else if amend {
            Self::Amend
        } else if has_base {
            Self::FastForward
        } else {
            Self::Create
        }
    }

    /// Ref-log message for a commit with this subject line.
    pub fn default_message(&self, subject: &str) -> String {
        match self {
            Self::Create => format!("commit (initial): {subject}"),
            Self::Amend => format!("commit (amend): {subject}"),
            Self::FastForward | Self::Logged => format!("commit: {subject}"),
        }
    }
}

impl fmt::Display for UpdateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Logged => f.write_str("logged"),
            Self::Amend => f.write_str("amend"),
            Self::FastForward => f.write_str("fast-forward"),
            Self::Create => f.write_str("create"),
        }
    }
}

/// One ref movement to apply.
#[derive(Clone, Debug)]
pub struct GateRequest<'a> {
    /// Canonical branch ref name.
    pub ref_name: &'a str,
    /// Commit the branch should point at.
    pub new_commit: ObjectId,
    /// Subject line of the new commit, for default ref-log messages.
    pub subject: &'a str,
    /// Branch value the view was opened at.
    pub base: Option<ObjectId>,
    pub amend: bool,
    /// Explicit ref-log message.
    pub ref_log: Option<&'a str>,
    pub committer: &'a PersonIdent,
}

/// Applies [`GateRequest`]s to a [`RefStore`].
pub struct RefUpdateGate<'a> {
    refs: &'a dyn RefStore,
}

impl<'a> RefUpdateGate<'a> {
    pub fn new(refs: &'a dyn RefStore) -> Self {
        Self { refs }
    }

    /// Move the ref and report which mode was used.
    pub fn apply(&self, request: &GateRequest<'_>) -> CommitResult<UpdateMode> {
        let mode = UpdateMode::select(
            request.ref_log.is_some(),
            request.amend,
            request.base.is_some(),
        );
        let message = match request.ref_log {
            Some(text) => text.to_string(),
            None => mode.default_message(request.subject),
        };
        let name = request.ref_name;
        let target = request.new_commit;
        let committer = request.committer;

        match (mode, request.base) {
            (UpdateMode::Logged, base) => self.refs.force_set_ref(
                name,
                target,
                RefExpectation::from_base(base),
                committer,
                &message,
            )?,
            (UpdateMode::Amend, Some(base)) => {
                self.refs.amend_ref(name, base, target, committer, &message)?
            }
            (UpdateMode::Amend, None) => return Err(CommitError::NoCommitToAmend),
            (UpdateMode::FastForward, Some(base)) => {
                self.refs.fast_forward_ref(name, base, target, committer, &message)?
            }
            (UpdateMode::Create, _) | (UpdateMode::FastForward, None) => {
                self.refs.create_ref(name, target, committer, &message)?
            }
        }

        debug!(
            name,
            mode = %mode,
            old = ?request.base.map(|id| id.short_hex()),
            new = %target.short_hex(),
            "moved branch"
        );
        Ok(mode)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone};
    use pgit_refs::InMemoryRefStore;

    use super::*;

    const MAIN: &str = "refs/heads/main";

    fn oid(n: u8) -> ObjectId {
        ObjectId::from_sha1([n; 20])
    }

    fn committer() -> PersonIdent {
        let when = FixedOffset::east_opt(0)
            .unwrap()
            .timestamp_opt(1_700_000_000, 0)
            .unwrap();
        PersonIdent::new("Gate Tester", "gate@example.com", when).unwrap()
    }

    fn request<'a>(
        committer: &'a PersonIdent,
        new_commit: ObjectId,
        base: Option<ObjectId>,
    ) -> GateRequest<'a> {
        GateRequest {
            ref_name: MAIN,
            new_commit,
            subject: "subject",
            base,
            amend: false,
            ref_log: None,
            committer,
        }
    }

    // ---- Test 1: mode selection precedence ----

    #[test]
    fn select_first_match_wins() {
        assert_eq!(UpdateMode::select(true, true, true), UpdateMode::Logged);
        assert_eq!(UpdateMode::select(true, false, false), UpdateMode::Logged);
        assert_eq!(UpdateMode::select(false, true, true), UpdateMode::Amend);
        assert_eq!(UpdateMode::select(false, false, true), UpdateMode::FastForward);
        assert_eq!(UpdateMode::select(false, false, false), UpdateMode::Create);
    }

    // ---- Test 2: default ref-log messages ----

    #[test]
    fn default_messages() {
        assert_eq!(
            UpdateMode::Create.default_message("init"),
            "commit (initial): init"
        );
        assert_eq!(
            UpdateMode::FastForward.default_message("next"),
            "commit: next"
        );
        assert_eq!(
            UpdateMode::Amend.default_message("fix"),
            "commit (amend): fix"
        );
    }

    // ---- Test 3: create then fast-forward ----

    #[test]
    fn create_then_fast_forward() {
        let refs = InMemoryRefStore::new();
        let who = committer();
        let gate = RefUpdateGate::new(&refs);

        assert_eq!(gate.apply(&request(&who, oid(1), None)).unwrap(), UpdateMode::Create);
        assert_eq!(
            gate.apply(&request(&who, oid(2), Some(oid(1)))).unwrap(),
            UpdateMode::FastForward
        );

        assert_eq!(refs.read_ref(MAIN).unwrap().unwrap().target, oid(2));
        let log = refs.reflog(MAIN).unwrap();
        assert_eq!(log[0].message, "commit (initial): subject");
        assert_eq!(log[1].message, "commit: subject");
        assert_eq!(log[1].old, Some(oid(1)));
    }

    // ---- Test 4: create on an existing branch conflicts ----

    #[test]
    fn create_when_branch_exists_conflicts() {
        let refs = InMemoryRefStore::new();
        let who = committer();
        refs.create_ref(MAIN, oid(1), &who, "seed").unwrap();

        let err = RefUpdateGate::new(&refs)
            .apply(&request(&who, oid(2), None))
            .unwrap_err();
        match err {
            CommitError::RefUpdateConflict {
                branch,
                expected,
                actual,
            } => {
                assert_eq!(branch, MAIN);
                assert_eq!(expected, RefExpectation::Absent);
                assert_eq!(actual, Some(oid(1)));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(refs.read_ref(MAIN).unwrap().unwrap().target, oid(1));
    }

    // ---- Test 5: stale base conflicts ----

    #[test]
    fn fast_forward_from_stale_base_conflicts() {
        let refs = InMemoryRefStore::new();
        let who = committer();
        refs.create_ref(MAIN, oid(1), &who, "seed").unwrap();
        refs.fast_forward_ref(MAIN, oid(1), oid(2), &who, "moved").unwrap();

        let err = RefUpdateGate::new(&refs)
            .apply(&request(&who, oid(3), Some(oid(1))))
            .unwrap_err();
        assert!(matches!(err, CommitError::RefUpdateConflict { .. }));
        assert_eq!(refs.read_ref(MAIN).unwrap().unwrap().target, oid(2));
    }

    // ---- Test 6: logged mode uses the caller's message and still checks ----

    #[test]
    fn logged_mode_uses_caller_message() {
        let refs = InMemoryRefStore::new();
        let who = committer();
        refs.create_ref(MAIN, oid(1), &who, "seed").unwrap();
        let gate = RefUpdateGate::new(&refs);

        let mut req = request(&who, oid(2), Some(oid(1)));
        req.amend = true;
        req.ref_log = Some("rebase: pick 2");
        assert_eq!(gate.apply(&req).unwrap(), UpdateMode::Logged);
        assert_eq!(refs.reflog(MAIN).unwrap()[1].message, "rebase: pick 2");

        let err = gate.apply(&req).unwrap_err();
        assert!(matches!(err, CommitError::RefUpdateConflict { .. }));
    }

    // ---- Test 7: amend ----

    #[test]
    fn amend_replaces_tip() {
        let refs = InMemoryRefStore::new();
        let who = committer();
        refs.create_ref(MAIN, oid(1), &who, "seed").unwrap();

        let mut req = request(&who, oid(9), Some(oid(1)));
        req.amend = true;
        assert_eq!(RefUpdateGate::new(&refs).apply(&req).unwrap(), UpdateMode::Amend);
        assert_eq!(refs.read_ref(MAIN).unwrap().unwrap().target, oid(9));
        assert_eq!(refs.reflog(MAIN).unwrap()[1].message, "commit (amend): subject");
    }

    #[test]
    fn amend_without_base_fails() {
        let refs = InMemoryRefStore::new();
        let who = committer();
        let mut req = request(&who, oid(1), None);
        req.amend = true;

        let err = RefUpdateGate::new(&refs).apply(&req).unwrap_err();
        assert!(matches!(err, CommitError::NoCommitToAmend));
        assert!(refs.read_ref(MAIN).unwrap().is_none());
    }
}
