use std::sync::Arc;

use chrono::Utc;
use tracing::{info, info_span, warn, Instrument};

use crate::config::DeploymentRequest;
use crate::error::{DeployError, Result};
use crate::gitops::{
    commit_changes, place, push_with_retry, BranchCheckout, CommitOutcome, GitOpsError,
    GitRepository, PlacementRequest, WorkingCopy,
};
use crate::process::CommandRunner;
use crate::render::ManifestRenderer;
use crate::sanitize::redact_path;
use crate::tools::HelmTool;
use crate::values;

use super::config::PipelineConfig;
use super::context::PipelineContext;
use super::error::PipelineWarning;
use super::progress::{DeployPhase, ProgressEvent, ProgressReporter};
use super::report::DeployReport;

/// Runs one deployment: values, render, clone, place, commit, push.
pub struct DeployPipeline {
    config: Arc<PipelineConfig>,
    runner: Arc<dyn CommandRunner>,
}

impl DeployPipeline {
    pub fn new(config: PipelineConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            config: Arc::new(config),
            runner,
        }
    }

    /// Runs every step in order; the first error ends the run.
    ///
    /// The working copy is removed before this returns, whatever the
    /// outcome.
    pub async fn run(
        &self,
        request: &DeploymentRequest,
        progress: &dyn ProgressReporter,
    ) -> Result<DeployReport> {
        let span = info_span!(
            "deploy",
            application = %request.application_name,
            environment = %request.environment,
            repository = %request.gitops_repository,
        );

        let result = self.run_steps(request, progress).instrument(span).await;

        match result {
            Ok(report) => {
                progress.report(ProgressEvent::Completed {
                    summary: report.summary(),
                });
                Ok(report)
            }
            Err(e) => {
                progress.report(ProgressEvent::Failed {
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn run_steps(
        &self,
        request: &DeploymentRequest,
        progress: &dyn ProgressReporter,
    ) -> Result<DeployReport> {
        let mut ctx = PipelineContext::default();

        // Step 1: Compose values and check the chart
        progress.report(ProgressEvent::Phase {
            phase: DeployPhase::ComposingValues,
            message: "Composing chart values".to_string(),
        });
        let values = values::compose(&request.values_input())?;
        request.chart.verify()?;

        // Step 2: Resolve helm
        progress.report(ProgressEvent::Phase {
            phase: DeployPhase::ResolvingTools,
            message: format!("Resolving helm {}", request.helm_version),
        });
        let helm = HelmTool::new(&request.helm_version)
            .with_explicit_path(request.helm_path.clone())
            .with_download_base(&self.config.helm_download_base)
            .ensure(&self.config.tool_cache, self.runner.as_ref())
            .await?;

        // Step 3: Render
        progress.report(ProgressEvent::Phase {
            phase: DeployPhase::Rendering,
            message: format!("Rendering {}", redact_path(&request.chart.dir())),
        });
        let manifest = ManifestRenderer::new(helm, self.runner.clone())
            .with_temp_dir(&self.config.temp_dir)
            .render(&request.chart, &request.release_name(), &values)
            .await?;

        // Step 4: Clone
        progress.report(ProgressEvent::Phase {
            phase: DeployPhase::Cloning,
            message: format!(
                "Cloning {} ({})",
                request.gitops_repository.public_url(),
                request.gitops_branch
            ),
        });
        let working_copy = WorkingCopy::create(&request.working_copy)?;
        let (repo, checkout) = GitRepository::clone_into(
            self.runner.clone(),
            &request.gitops_repository,
            &request.token,
            working_copy.path(),
            &request.gitops_branch,
            &request.identity,
        )
        .instrument(info_span!("clone"))
        .await?;
        ctx.checkout = Some(checkout);

        // Step 5: Place manifests
        progress.report(ProgressEvent::Phase {
            phase: DeployPhase::Placing,
            message: "Placing manifests".to_string(),
        });
        let layout = request.layout();
        let placement = {
            let _step = info_span!("place").entered();
            place(&PlacementRequest {
                working_copy: working_copy.path(),
                layout: &layout,
                manifest: &manifest,
                manifests_source: &request.manifests_source,
            })?
        };
        ctx.warnings.extend(
            placement
                .warnings
                .iter()
                .cloned()
                .map(|warning| PipelineWarning::Placement { warning }),
        );
        ctx.placement = Some(placement);

        // Step 6: Commit
        progress.report(ProgressEvent::Phase {
            phase: DeployPhase::Committing,
            message: "Committing changes".to_string(),
        });
        let outcome = commit_changes(&repo, &layout, &request.manifests_source)
            .instrument(info_span!("commit"))
            .await?;

        // Step 7: Push
        match &outcome {
            CommitOutcome::Committed { commit_hash } => {
                progress.report(ProgressEvent::Phase {
                    phase: DeployPhase::Pushing,
                    message: format!("Pushing {} to {}", commit_hash, request.gitops_branch),
                });
                let pushed = push_with_retry(
                    &repo,
                    Some(&request.gitops_branch),
                    &self.config.push_policy,
                )
                .instrument(info_span!("push"))
                .await?;
                if pushed.attempts > 1 {
                    ctx.warnings.push(PipelineWarning::PushRetried {
                        attempts: pushed.attempts,
                    });
                }
                ctx.push = Some(pushed);
            }
            CommitOutcome::NoChangesSkipped => {
                info!("Nothing to push");
            }
            CommitOutcome::Failed { reason } => {
                return Err(DeployError::GitOps(GitOpsError::CommitFailed(reason.clone())));
            }
        }

        for warning in &ctx.warnings {
            warn!("{}", warning);
        }

        drop(repo);
        drop(working_copy);

        Ok(DeployReport {
            application_name: request.application_name.clone(),
            environment: request.environment.clone(),
            branch_created: ctx.checkout == Some(BranchCheckout::Created),
            files_copied: ctx.placement.map(|p| p.files_copied).unwrap_or_default(),
            commit: outcome,
            push: ctx.push,
            warnings: ctx.warnings,
            completed_at: Utc::now(),
        })
    }
}
