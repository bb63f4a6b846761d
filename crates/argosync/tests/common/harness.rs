//! Test harness for isolated pipeline runs.
//!
//! The `TestHarness` struct provides:
//! - A fake invoking repository (the working directory) with manifests
//! - A minimal chart and a placeholder `helm` binary path
//! - A scratch directory for values files and working copies

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::TempDir;

use argosync::config::{ActionInputs, DeploymentRequest, InvocationContext};
use argosync::gitops::PushPolicy;
use argosync::pipeline::{DeployPipeline, PipelineConfig};
use argosync::process::{ok_output, CommandOutput, ScriptedRunner};
use argosync::tools::{ToolCache, HELM_DOWNLOAD_BASE};
use argosync::CommandRunner;

use super::InputsBuilder;

/// Rendered output prefix produced by the scripted `helm`.
pub const RENDERED_PREFIX: &str = "kind: Application";

pub struct TestHarness {
    temp_dir: TempDir,
    /// Directory the action is "invoked" from.
    pub workspace: PathBuf,
    pub chart_dir: PathBuf,
    /// Placeholder file standing in for the helm binary.
    pub helm: PathBuf,
    pub scratch: PathBuf,
}

impl TestHarness {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let base = temp_dir.path();

        let workspace = base.join("web");
        let chart_dir = base.join("chart");
        let scratch = base.join("scratch");
        let helm = base.join("bin/helm");

        for dir in [&workspace, &chart_dir, &scratch] {
            std::fs::create_dir_all(dir).expect("Failed to create dir");
        }
        std::fs::create_dir_all(helm.parent().unwrap()).expect("Failed to create bin dir");
        std::fs::write(&helm, "").expect("Failed to write helm placeholder");
        std::fs::write(
            chart_dir.join("Chart.yaml"),
            "apiVersion: v2\nname: argocd-application\nversion: 0.1.0\n",
        )
        .expect("Failed to write Chart.yaml");

        Self {
            temp_dir,
            workspace,
            chart_dir,
            helm,
            scratch,
        }
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes a manifest below the workspace.
    pub fn write_manifest(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.workspace.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).expect("Failed to create manifest dir");
        std::fs::write(&path, content).expect("Failed to write manifest");
        path
    }

    pub fn context(&self) -> InvocationContext {
        InvocationContext {
            repository: Some("acme/web".to_string()),
            repository_owner: Some("acme".to_string()),
            working_dir: self.workspace.clone(),
            temp_dir: self.scratch.clone(),
            ..Default::default()
        }
    }

    /// Inputs pointing at this harness' chart and helm placeholder.
    pub fn inputs(&self) -> InputsBuilder {
        InputsBuilder::new()
            .chart(&self.chart_dir.to_string_lossy())
            .helm_path(&self.helm.to_string_lossy())
    }

    pub fn request(&self, inputs: &ActionInputs) -> DeploymentRequest {
        DeploymentRequest::from_inputs(inputs, &self.context()).expect("Invalid inputs")
    }

    pub fn pipeline(&self, runner: Arc<dyn CommandRunner>) -> DeployPipeline {
        self.pipeline_with_policy(runner, PushPolicy::default())
    }

    pub fn pipeline_with_policy(
        &self,
        runner: Arc<dyn CommandRunner>,
        push_policy: PushPolicy,
    ) -> DeployPipeline {
        DeployPipeline::new(self.pipeline_config(push_policy), runner)
    }

    /// Pipeline settings with the tool cache inside the harness.
    pub fn pipeline_config(&self, push_policy: PushPolicy) -> PipelineConfig {
        PipelineConfig {
            tool_cache: ToolCache::new(self.temp_path().join("tools")),
            helm_download_base: HELM_DOWNLOAD_BASE.to_string(),
            temp_dir: self.scratch.clone(),
            push_policy,
        }
    }

    /// `<helm> template`, the key scripted helm responses are registered under.
    pub fn helm_key(&self) -> String {
        format!("{} template", self.helm.display())
    }

    /// Scripts `helm template` to echo the values file after a fixed header.
    pub fn script_helm(&self, runner: &ScriptedRunner) {
        runner.respond_with(&self.helm_key(), |request| {
            let values = std::fs::read_to_string(&request.args[4])?;
            Ok(ok_output(&format!("{}\n---\n{}\n\n", RENDERED_PREFIX, values)))
        });
    }

    /// Scripts a `git` that clones into an empty repository and reports
    /// `abc1234` as the new commit.
    pub fn script_git(&self, runner: &ScriptedRunner) {
        runner.respond_with("git clone", |request| {
            let target = PathBuf::from(request.args.last().unwrap());
            std::fs::create_dir_all(target.join(".git"))?;
            Ok(ok_output(""))
        });
        runner.script("git rev-parse", vec![ok_output("abc1234\n")]);
    }

    /// Records the pointer manifest as seen at staging time.
    pub fn capture_pointer(
        &self,
        runner: &ScriptedRunner,
        relative: &str,
    ) -> Arc<Mutex<Option<String>>> {
        let captured = Arc::new(Mutex::new(None));
        let slot = captured.clone();
        let relative = relative.to_string();
        runner.respond_with("git add", move |request| {
            if let Some(dir) = &request.working_dir {
                *slot.lock().unwrap() = std::fs::read_to_string(dir.join(&relative)).ok();
            }
            Ok(ok_output(""))
        });
        captured
    }
}

/// No wait between push attempts.
pub fn instant_push_policy() -> PushPolicy {
    PushPolicy {
        max_attempts: 5,
        base_delay: Duration::ZERO,
    }
}

/// Whether a usable `git` is on the PATH.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Runs git synchronously, panicking on failure.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Converts a finished `std::process` run into a [`CommandOutput`].
pub fn to_output(output: std::process::Output) -> CommandOutput {
    CommandOutput {
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
}
