//! In-memory reference store for testing and ephemeral use.
//!
//! [`InMemoryRefStore`] stores all refs in a `HashMap` protected by a
//! `RwLock`. It implements the full [`RefStore`] trait and is suitable for
//! unit tests, embedding, and short-lived processes.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use pgit_types::ObjectId;
use tracing::debug;

use crate::error::{RefError, Result};
use crate::names::{branch_ref_name, validate_branch_name, validate_ref_name};
use crate::traits::RefStore;
use crate::types::{Head, Ref, RefLogEntry, RefUpdate};

/// An in-memory implementation of [`RefStore`].
///
/// All data lives in maps behind `RwLock`s and is lost when the store is
/// dropped. Locks are always taken in the order refs, logs, head.
#[derive(Debug, Default)]
pub struct InMemoryRefStore {
    refs: RwLock<HashMap<String, ObjectId>>,
    logs: RwLock<HashMap<String, Vec<RefLogEntry>>>,
    head: RwLock<Option<Head>>,
}

impl InMemoryRefStore {
    /// Create a new empty ref store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(e: PoisonError<T>) -> RefError {
    RefError::LockPoisoned(e.to_string())
}

impl RefStore for InMemoryRefStore {
    fn read_ref(&self, name: &str) -> Result<Option<Ref>> {
        let refs = self.refs.read().map_err(poisoned)?;
        Ok(refs.get(name).map(|target| Ref::new(name, *target)))
    }

    fn update_ref(&self, update: RefUpdate) -> Result<Option<ObjectId>> {
        validate_ref_name(&update.name)?;

        let mut refs = self.refs.write().map_err(poisoned)?;
        let old = refs.get(&update.name).copied();
        if !update.expected.matches(old) {
            return Err(RefError::Conflict {
                name: update.name,
                expected: update.expected,
                actual: old,
            });
        }
        refs.insert(update.name.clone(), update.new_target);

        debug!(
            name = %update.name,
            old = ?old.map(|id| id.short_hex()),
            new = %update.new_target.short_hex(),
            "updated ref"
        );

        let mut logs = self.logs.write().map_err(poisoned)?;
        logs.entry(update.name).or_default().push(RefLogEntry {
            old,
            new: update.new_target,
            committer: update.committer,
            message: update.message,
        });
        Ok(old)
    }

    fn delete_ref(&self, name: &str) -> Result<bool> {
        // Prevent deleting the current branch.
        {
            let head = self.head.read().map_err(poisoned)?;
            if let Some(Head::Symbolic(current)) = head.as_ref() {
                if name == branch_ref_name(current) {
                    return Err(RefError::DeleteCurrentBranch {
                        name: current.clone(),
                    });
                }
            }
        }

        let mut refs = self.refs.write().map_err(poisoned)?;
        let existed = refs.remove(name).is_some();
        self.logs.write().map_err(poisoned)?.remove(name);
        Ok(existed)
    }

    fn list_refs(&self, prefix: &str) -> Result<Vec<Ref>> {
        let refs = self.refs.read().map_err(poisoned)?;
        let mut result: Vec<Ref> = refs
            .iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| Ref::new(k.clone(), *v))
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(result)
    }

    fn reflog(&self, name: &str) -> Result<Vec<RefLogEntry>> {
        let logs = self.logs.read().map_err(poisoned)?;
        Ok(logs.get(name).cloned().unwrap_or_default())
    }

    fn head(&self) -> Result<Option<Head>> {
        let head = self.head.read().map_err(poisoned)?;
        Ok(head.clone())
    }

    fn set_head(&self, branch: &str) -> Result<()> {
        validate_branch_name(branch)?;

        let mut head = self.head.write().map_err(poisoned)?;
        *head = Some(Head::Symbolic(branch.to_string()));
        Ok(())
    }

    fn set_head_detached(&self, target: ObjectId) -> Result<()> {
        let mut head = self.head.write().map_err(poisoned)?;
        *head = Some(Head::Detached(target));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Barrier};
    use std::thread;

    use chrono::{FixedOffset, TimeZone};
    use pgit_types::{HashAlgorithm, PersonIdent};

    use super::*;
    use crate::types::RefExpectation;

    /// Helper to create a distinct test commit id.
    fn commit_id(fill: u8) -> ObjectId {
        ObjectId::from_sha1([fill; 20])
    }

    fn committer() -> PersonIdent {
        let when = FixedOffset::east_opt(0)
            .unwrap()
            .timestamp_opt(1_700_000_000, 0)
            .unwrap();
        PersonIdent::new("Ref Tester", "refs@example.com", when).unwrap()
    }

    // ---- Test 1: Create and read a branch ref ----
    #[test]
    fn create_and_read_branch_ref() {
        let store = InMemoryRefStore::new();
        store
            .create_ref("refs/heads/main", commit_id(10), &committer(), "init")
            .unwrap();

        let read = store.read_ref("refs/heads/main").unwrap().unwrap();
        assert!(read.is_branch());
        assert_eq!(read.short_name(), "main");
        assert_eq!(read.target, commit_id(10));
    }

    // ---- Test 2: Read non-existent ref returns None ----
    #[test]
    fn read_nonexistent_ref_returns_none() {
        let store = InMemoryRefStore::new();
        assert!(store.read_ref("refs/heads/nope").unwrap().is_none());
    }

    // ---- Test 3: Create fails when the ref already exists ----
    #[test]
    fn create_existing_ref_conflicts() {
        let store = InMemoryRefStore::new();
        store
            .create_ref("refs/heads/main", commit_id(1), &committer(), "first")
            .unwrap();
        let err = store
            .create_ref("refs/heads/main", commit_id(2), &committer(), "second")
            .unwrap_err();
        match err {
            RefError::Conflict {
                name,
                expected,
                actual,
            } => {
                assert_eq!(name, "refs/heads/main");
                assert_eq!(expected, RefExpectation::Absent);
                assert_eq!(actual, Some(commit_id(1)));
            }
            other => panic!("expected Conflict, got: {other}"),
        }
        assert_eq!(
            store.read_ref("refs/heads/main").unwrap().unwrap().target,
            commit_id(1)
        );
    }

    // ---- Test 4: Fast-forward checks the expected old value ----
    #[test]
    fn fast_forward_requires_expected_value() {
        let store = InMemoryRefStore::new();
        store
            .create_ref("refs/heads/main", commit_id(1), &committer(), "init")
            .unwrap();
        store
            .fast_forward_ref("refs/heads/main", commit_id(1), commit_id(2), &committer(), "ff")
            .unwrap();

        // Stale expectation.
        let err = store
            .fast_forward_ref("refs/heads/main", commit_id(1), commit_id(3), &committer(), "ff")
            .unwrap_err();
        assert!(matches!(err, RefError::Conflict { .. }));
        assert_eq!(
            store.read_ref("refs/heads/main").unwrap().unwrap().target,
            commit_id(2)
        );
    }

    // ---- Test 5: Fast-forward of a missing ref conflicts ----
    #[test]
    fn fast_forward_missing_ref_conflicts() {
        let store = InMemoryRefStore::new();
        let err = store
            .fast_forward_ref("refs/heads/ghost", commit_id(1), commit_id(2), &committer(), "ff")
            .unwrap_err();
        assert!(matches!(err, RefError::Conflict { actual: None, .. }));
    }

    // ---- Test 6: Amend replaces the tip ----
    #[test]
    fn amend_replaces_tip() {
        let store = InMemoryRefStore::new();
        store
            .create_ref("refs/heads/main", commit_id(1), &committer(), "init")
            .unwrap();
        store
            .amend_ref("refs/heads/main", commit_id(1), commit_id(9), &committer(), "amend")
            .unwrap();
        assert_eq!(
            store.read_ref("refs/heads/main").unwrap().unwrap().target,
            commit_id(9)
        );
    }

    // ---- Test 7: Force-set with Any overwrites ----
    #[test]
    fn force_set_any_overwrites() {
        let store = InMemoryRefStore::new();
        store
            .create_ref("refs/heads/main", commit_id(1), &committer(), "init")
            .unwrap();
        store
            .force_set_ref(
                "refs/heads/main",
                commit_id(5),
                RefExpectation::Any,
                &committer(),
                "reset: moving to 0505",
            )
            .unwrap();
        assert_eq!(
            store.read_ref("refs/heads/main").unwrap().unwrap().target,
            commit_id(5)
        );
    }

    // ---- Test 8: Ref-log records one entry per update ----
    #[test]
    fn reflog_records_updates() {
        let store = InMemoryRefStore::new();
        store
            .create_ref("refs/heads/main", commit_id(1), &committer(), "commit (initial): a")
            .unwrap();
        store
            .fast_forward_ref("refs/heads/main", commit_id(1), commit_id(2), &committer(), "commit: b")
            .unwrap();
        // A rejected update leaves no trace.
        let _ = store.create_ref("refs/heads/main", commit_id(3), &committer(), "nope");

        let log = store.reflog("refs/heads/main").unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].old, None);
        assert_eq!(log[0].new, commit_id(1));
        assert_eq!(log[0].message, "commit (initial): a");
        assert_eq!(log[1].old, Some(commit_id(1)));
        assert_eq!(log[1].new, commit_id(2));
        assert_eq!(log[1].committer, committer());
    }

    // ---- Test 9: Delete a branch ref ----
    #[test]
    fn delete_branch_ref() {
        let store = InMemoryRefStore::new();
        store
            .create_ref("refs/heads/feature", commit_id(20), &committer(), "init")
            .unwrap();
        assert!(store.delete_ref("refs/heads/feature").unwrap());
        assert!(store.read_ref("refs/heads/feature").unwrap().is_none());
        assert!(store.reflog("refs/heads/feature").unwrap().is_empty());
        assert!(!store.delete_ref("refs/heads/feature").unwrap());
    }

    // ---- Test 10: HEAD symbolic and detached ----
    #[test]
    fn head_states() {
        let store = InMemoryRefStore::new();
        assert!(store.head().unwrap().is_none());
        assert!(store.current_branch().unwrap().is_none());

        store.set_head("main").unwrap();
        assert_eq!(
            store.head().unwrap().unwrap(),
            Head::Symbolic("main".to_string())
        );
        assert_eq!(store.current_branch().unwrap().as_deref(), Some("main"));

        store.set_head_detached(commit_id(42)).unwrap();
        assert_eq!(store.head().unwrap().unwrap(), Head::Detached(commit_id(42)));
        assert!(store.current_branch().unwrap().is_none());
    }

    // ---- Test 11: List branches ----
    #[test]
    fn list_branches_sorted() {
        let store = InMemoryRefStore::new();
        for (name, fill) in [("main", 1), ("develop", 2), ("feature/x", 3)] {
            store
                .create_ref(&branch_ref_name(name), commit_id(fill), &committer(), "init")
                .unwrap();
        }
        let names: Vec<String> = store
            .branches()
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(
            names,
            vec!["refs/heads/develop", "refs/heads/feature/x", "refs/heads/main"]
        );
    }

    // ---- Test 12: Name validation rejects invalid names ----
    #[test]
    fn reject_invalid_names() {
        let store = InMemoryRefStore::new();
        assert!(store
            .create_ref("refs/heads/bad..name", commit_id(0), &committer(), "x")
            .is_err());
        assert!(store
            .create_ref("main", commit_id(0), &committer(), "x")
            .is_err());
        assert!(store.set_head("bad name").is_err());
    }

    // ---- Test 13: Cannot delete current branch ----
    #[test]
    fn cannot_delete_current_branch() {
        let store = InMemoryRefStore::new();
        store
            .create_ref("refs/heads/main", commit_id(10), &committer(), "init")
            .unwrap();
        store.set_head("main").unwrap();

        let err = store.delete_ref("refs/heads/main").unwrap_err();
        assert!(matches!(err, RefError::DeleteCurrentBranch { .. }));
    }

    // ---- Test 14: Racing fast-forwards from one base: exactly one wins ----
    #[test]
    fn concurrent_fast_forward_one_winner() {
        let store = Arc::new(InMemoryRefStore::new());
        let base = commit_id(1);
        store
            .create_ref("refs/heads/main", base, &committer(), "init")
            .unwrap();

        let writers = 8;
        let barrier = Arc::new(Barrier::new(writers));
        let handles: Vec<_> = (0..writers)
            .map(|i| {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    store.fast_forward_ref(
                        "refs/heads/main",
                        base,
                        commit_id(100 + i as u8),
                        &committer(),
                        "commit: race",
                    )
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let wins = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, 1);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, RefError::Conflict { .. })));
        assert_eq!(store.reflog("refs/heads/main").unwrap().len(), 2);
    }

    // ---- Test 15: Conflict message names both values ----
    #[test]
    fn conflict_display() {
        let err = RefError::Conflict {
            name: "refs/heads/main".into(),
            expected: RefExpectation::Value(commit_id(1)),
            actual: None,
        };
        let msg = err.to_string();
        assert!(msg.contains("refs/heads/main"));
        assert!(msg.contains(&commit_id(1).to_hex()));
        assert!(msg.contains("no value"));
    }

    // ---- Test 16: Refs serialize with hex targets ----
    #[test]
    fn ref_serde_uses_hex() {
        let r = Ref::new("refs/heads/main", ObjectId::null(HashAlgorithm::Sha1));
        let json = serde_json::to_string(&r).unwrap();
        assert!(json.contains(&"0".repeat(40)));
        let back: Ref = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }
}
