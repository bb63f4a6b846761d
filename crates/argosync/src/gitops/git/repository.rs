//! Git repository operations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};

use super::auth::{non_interactive_env, RemoteRepository};
use super::parse::format_git_error;
use super::types::{BranchCheckout, StagedState};
use crate::gitops::error::{classify_git_error, GitOpsError, Result};
use crate::process::{CommandOutput, CommandRequest, CommandRunner};
use crate::sanitize::redact_secret;

/// Commit identity configured in the working copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitIdentity {
    pub name: String,
    pub email: String,
}

impl Default for CommitIdentity {
    fn default() -> Self {
        Self {
            name: "github-actions[bot]".to_string(),
            email: "41898282+github-actions[bot]@users.noreply.github.com".to_string(),
        }
    }
}

/// Git operations on a local working copy, driven through a [`CommandRunner`].
pub struct GitRepository {
    /// Path to the working copy.
    repo_path: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl GitRepository {
    /// Creates a handle for an existing working copy.
    pub fn new(repo_path: impl Into<PathBuf>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            repo_path: repo_path.into(),
            runner,
        }
    }

    /// Clones `remote` into `path` and checks out `branch`, creating the
    /// branch locally when it does not exist upstream.
    ///
    /// Every failure is reported as [`GitOpsError::CloneFailed`] with the
    /// token scrubbed from the message.
    pub async fn clone_into(
        runner: Arc<dyn CommandRunner>,
        remote: &RemoteRepository,
        token: &SecretString,
        path: &Path,
        branch: &str,
        identity: &CommitIdentity,
    ) -> Result<(Self, BranchCheckout)> {
        let url = remote.authenticated_url(token);
        let scrub = |text: &str| redact_secret(text, token.expose_secret());

        let mut request = CommandRequest::new("git")
            .arg("clone")
            .arg("--quiet")
            .arg(url)
            .arg(path.to_string_lossy());
        for (key, value) in non_interactive_env() {
            request = request.env(key, value);
        }

        log::info!("Cloning {} into {}", remote.public_url(), path.display());

        let output = runner
            .run(request)
            .await
            .map_err(|e| GitOpsError::CloneFailed(scrub(&e.to_string())))?;
        if !output.success() {
            return Err(GitOpsError::CloneFailed(scrub(&format_git_error(&output))));
        }

        let repo = Self::new(path, runner);
        let checkout = repo
            .checkout_branch(branch)
            .await
            .map_err(|e| GitOpsError::CloneFailed(scrub(&e.to_string())))?;
        repo.configure_identity(identity)
            .await
            .map_err(|e| GitOpsError::CloneFailed(scrub(&e.to_string())))?;

        Ok((repo, checkout))
    }

    /// Returns the repository path.
    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    /// Checks if the directory is a git repository.
    pub fn is_git_repo(&self) -> bool {
        self.repo_path.join(".git").exists()
    }

    /// Checks out `branch` if `origin` has it, otherwise creates it.
    pub async fn checkout_branch(&self, branch: &str) -> Result<BranchCheckout> {
        if !self.is_git_repo() {
            return Err(GitOpsError::GitNotInitialized);
        }

        // --exit-code: 0 when the ref exists, 2 when it does not
        let lookup = self
            .run_git(&["ls-remote", "--exit-code", "--heads", "origin", branch])
            .await?;

        match lookup.exit_code {
            Some(0) => {
                let output = self.run_git(&["checkout", branch]).await?;
                if output.success() {
                    Ok(BranchCheckout::Existing)
                } else {
                    Err(GitOpsError::GitOperation(format_git_error(&output)))
                }
            }
            Some(2) => {
                log::info!("Branch '{}' not found upstream, creating it", branch);
                let output = self.run_git(&["checkout", "-b", branch]).await?;
                if output.success() {
                    Ok(BranchCheckout::Created)
                } else {
                    Err(GitOpsError::GitOperation(format_git_error(&output)))
                }
            }
            _ => Err(classify_git_error(&format_git_error(&lookup))),
        }
    }

    /// Sets `user.name` / `user.email` for commits in this working copy.
    pub async fn configure_identity(&self, identity: &CommitIdentity) -> Result<()> {
        for (key, value) in [("user.name", &identity.name), ("user.email", &identity.email)] {
            let output = self.run_git(&["config", key, value]).await?;
            if !output.success() {
                return Err(GitOpsError::GitOperation(format_git_error(&output)));
            }
        }
        Ok(())
    }

    /// Stages exactly the given paths (relative to the repository root),
    /// including deletions beneath them.
    pub async fn stage(&self, paths: &[PathBuf]) -> Result<()> {
        if !self.is_git_repo() {
            return Err(GitOpsError::GitNotInitialized);
        }
        if paths.is_empty() {
            return Ok(());
        }

        let mut args: Vec<String> = vec!["add".into(), "--all".into(), "--".into()];
        args.extend(paths.iter().map(|p| p.to_string_lossy().into_owned()));
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        let output = self.run_git(&args).await?;
        if output.success() {
            Ok(())
        } else {
            Err(GitOpsError::GitOperation(format_git_error(&output)))
        }
    }

    /// Compares the index against `HEAD`.
    ///
    /// Uses `git diff --cached --quiet`: exit 0 means the index matches
    /// `HEAD`, exit 1 means it differs. Any other status is an error, never
    /// read as "has changes".
    pub async fn staged_state(&self) -> Result<StagedState> {
        let output = self.run_git(&["diff", "--cached", "--quiet"]).await?;
        match output.exit_code {
            Some(0) => Ok(StagedState::Clean),
            Some(1) => Ok(StagedState::HasChanges),
            _ => Err(GitOpsError::GitOperation(format!(
                "Could not determine staged changes: {}",
                format_git_error(&output)
            ))),
        }
    }

    /// Creates a commit from the index. Returns the raw command output so
    /// the caller can decide how to treat a failure.
    pub async fn commit(&self, message: &str) -> Result<CommandOutput> {
        self.run_git(&["commit", "--quiet", "--message", message])
            .await
    }

    /// Short hash of `HEAD`.
    pub async fn head_short_hash(&self) -> Result<String> {
        let output = self.run_git(&["rev-parse", "--short", "HEAD"]).await?;
        if !output.success() {
            return Err(GitOpsError::GitOperation(format_git_error(&output)));
        }
        Ok(output.stdout.trim().to_string())
    }

    /// Pushes `target` to `origin` once.
    pub async fn push(&self, target: &str) -> Result<()> {
        if !self.is_git_repo() {
            return Err(GitOpsError::GitNotInitialized);
        }

        let output = self.run_git(&["push", "origin", target]).await?;
        if output.success() {
            Ok(())
        } else {
            Err(classify_git_error(&format_git_error(&output)))
        }
    }

    /// Runs a git command in the repository directory.
    async fn run_git(&self, args: &[&str]) -> Result<CommandOutput> {
        let mut request = CommandRequest::new("git")
            .args(args.iter().copied())
            .current_dir(&self.repo_path);
        for (key, value) in non_interactive_env() {
            request = request.env(key, value);
        }

        self.runner
            .run(request)
            .await
            .map_err(|e| GitOpsError::GitOperation(format!("failed to run git: {}", e)))
    }
}
