use pgit_store::CommitSnapshot;
use pgit_types::ObjectId;
use serde::{Deserialize, Serialize};

/// One line of history for log display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitSummary {
    pub id: ObjectId,
    pub parents: Vec<ObjectId>,
    pub subject: String,
    pub author: String,
    /// Author time, seconds since the Unix epoch.
    pub timestamp: i64,
}

impl From<&CommitSnapshot> for CommitSummary {
    fn from(commit: &CommitSnapshot) -> Self {
        Self {
            id: commit.id(),
            parents: commit.parents.clone(),
            subject: commit.subject().to_string(),
            author: commit.author.to_string(),
            timestamp: commit.author.when().timestamp(),
        }
    }
}

impl CommitSummary {
    /// `<short id> <subject>`, as in a one-line log.
    pub fn oneline(&self) -> String {
        format!("{} {}", self.id.short_hex(), self.subject)
    }

    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}
