use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::gitops::{CommitOutcome, PushReport};

use super::error::PipelineWarning;

/// Summary of a successful run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployReport {
    pub application_name: String,
    pub environment: String,
    /// The target branch did not exist and was created by this run.
    pub branch_created: bool,
    pub files_copied: usize,
    /// Never `Failed`: a failed commit ends the run with an error.
    pub commit: CommitOutcome,
    /// Absent when nothing was committed.
    pub push: Option<PushReport>,
    pub warnings: Vec<PipelineWarning>,
    pub completed_at: DateTime<Utc>,
}

impl DeployReport {
    /// Completion time as published in the `time` step output.
    pub fn completed_at_rfc3339(&self) -> String {
        self.completed_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn summary(&self) -> String {
        if let CommitOutcome::Committed { commit_hash } = &self.commit {
            format!(
                "Deployed {} to {} ({})",
                self.application_name, self.environment, commit_hash
            )
        } else {
            format!(
                "{} in {} is already up to date",
                self.application_name, self.environment
            )
        }
    }
}
