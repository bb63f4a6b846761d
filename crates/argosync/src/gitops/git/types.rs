//! Pure data types for git operations.

use serde::{Deserialize, Serialize};

/// Result of staging and (maybe) committing placed files.
///
/// "Nothing to commit" is a terminal state of its own, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum CommitOutcome {
    /// The staged diff was empty; no commit was created.
    NoChangesSkipped,
    /// A commit was created.
    #[serde(rename_all = "camelCase")]
    Committed { commit_hash: String },
    /// The commit command itself failed.
    Failed { reason: String },
}

impl CommitOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, CommitOutcome::Committed { .. })
    }
}

/// Whether the index differs from `HEAD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagedState {
    Clean,
    HasChanges,
}

/// How the working copy's branch relates to the remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BranchCheckout {
    /// The branch existed upstream and was checked out.
    Existing,
    /// The branch was absent upstream and was created locally.
    Created,
}

/// Result of a successful push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushReport {
    /// Ref that was pushed (`HEAD` when no branch was given).
    pub target: String,
    /// Attempts used, including the successful one.
    pub attempts: u32,
}
