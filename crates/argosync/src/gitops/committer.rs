//! Stages the placed paths and commits them when the index changed.

use std::path::{Path, PathBuf};

use super::error::Result;
use super::git::parse::format_git_error;
use super::git::{CommitOutcome, GitRepository, StagedState};
use super::layout::{path_to_slash, GitOpsLayout, POINTER_DIR};
use crate::sanitize::redact_path;

/// Builds the commit message. The first line always names the application
/// and the environment.
pub fn commit_message(layout: &GitOpsLayout, manifests_source: &Path) -> String {
    let app = layout.application_name();
    let env = layout.environment();

    format!(
        "deploy({app}): update {env} environment\n\n\
         - {POINTER_DIR}/{app}/{env}.yaml\n\
         - {app}/{env}/ from {}",
        source_basename(manifests_source)
    )
}

fn source_basename(path: &Path) -> String {
    if let Some(name) = path.file_name() {
        return name.to_string_lossy().into_owned();
    }
    path.canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| path_to_slash(path))
}

/// Stages the layout's paths and commits if anything changed.
///
/// Only `<gitops_path>/argocd-apps` and `<gitops_path>/<application>` are
/// staged, and only those present on disk. A clean index yields
/// [`CommitOutcome::NoChangesSkipped`]; a failing `git commit` yields
/// [`CommitOutcome::Failed`].
pub async fn commit_changes(
    repo: &GitRepository,
    layout: &GitOpsLayout,
    manifests_source: &Path,
) -> Result<CommitOutcome> {
    let paths: Vec<PathBuf> = layout
        .stage_paths()
        .into_iter()
        .filter(|p| repo.repo_path().join(p).exists())
        .collect();

    repo.stage(&paths).await?;

    match repo.staged_state().await? {
        StagedState::Clean => {
            log::info!(
                "No changes for {} in {}, skipping commit",
                layout.application_name(),
                layout.environment()
            );
            Ok(CommitOutcome::NoChangesSkipped)
        }
        StagedState::HasChanges => {
            let message = commit_message(layout, manifests_source);
            let output = repo.commit(&message).await?;
            if !output.success() {
                let reason = format_git_error(&output);
                log::error!(
                    "Commit failed in {}: {}",
                    redact_path(repo.repo_path()),
                    reason
                );
                return Ok(CommitOutcome::Failed { reason });
            }

            let commit_hash = repo.head_short_hash().await?;
            log::info!("Created commit {}", commit_hash);
            Ok(CommitOutcome::Committed { commit_hash })
        }
    }
}
