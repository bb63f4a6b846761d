//! GitOps-specific error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while publishing to the GitOps repository.
#[derive(Error, Debug)]
pub enum GitOpsError {
    #[error("Failed to clone GitOps repository: {0}")]
    CloneFailed(String),

    #[error("Failed to prepare working copy '{path}': {source}")]
    WorkingCopy {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to place manifests at '{path}': {source}")]
    PlacementFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Git operation failed: {0}")]
    GitOperation(String),

    #[error("Git network error: {0}")]
    GitNetworkError(String),

    #[error("Git authentication failed: {0}")]
    GitAuthFailed(String),

    #[error("Push rejected by remote: {0}")]
    PushRejected(String),

    #[error("Commit failed: {0}")]
    CommitFailed(String),

    #[error("Git repository not initialized")]
    GitNotInitialized,

    #[error("commit and push failed after {attempts} attempts: {last}")]
    PushFailed {
        attempts: u32,
        #[source]
        last: Box<GitOpsError>,
    },
}

impl GitOpsError {
    /// Returns true if the error is likely transient and the operation can be retried.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GitOpsError::GitNetworkError(_)
                | GitOpsError::PushRejected(_)
                | GitOpsError::GitOperation(_)
        )
    }
}

/// Classifies a git stderr string into a more specific error variant.
pub fn classify_git_error(stderr: &str) -> GitOpsError {
    let lower = stderr.to_lowercase();

    if lower.contains("could not resolve host")
        || lower.contains("connection refused")
        || lower.contains("connection timed out")
        || lower.contains("network is unreachable")
        || lower.contains("failed to connect")
        || lower.contains("couldn't connect to server")
        || lower.contains("the remote end hung up unexpectedly")
    {
        return GitOpsError::GitNetworkError(stderr.trim().to_string());
    }

    if lower.contains("[rejected]")
        || lower.contains("non-fast-forward")
        || lower.contains("failed to push some refs")
    {
        return GitOpsError::PushRejected(stderr.trim().to_string());
    }

    if lower.contains("authentication failed")
        || lower.contains("permission denied")
        || lower.contains("invalid credentials")
        || lower.contains("returned error: 403")
    {
        return GitOpsError::GitAuthFailed(stderr.trim().to_string());
    }

    GitOpsError::GitOperation(stderr.trim().to_string())
}

/// Result type for GitOps operations.
pub type Result<T> = std::result::Result<T, GitOpsError>;
