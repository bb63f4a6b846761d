use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use argosync::actions::{error_annotation, set_output, warning_annotation};
use argosync::config::{ActionInputs, DeploymentRequest, InvocationContext};
use argosync::pipeline::{DeployPipeline, LogProgress, PipelineConfig};
use argosync::{telemetry, DeployError, TokioCommandRunner};

#[derive(Parser)]
#[command(
    name = "argosync",
    version,
    about = "Render an ArgoCD Application with Helm and publish it to a GitOps repository"
)]
struct Cli {
    /// GitOps repository as owner/repo (or bare repo name)
    #[arg(long, env = "INPUT_GITOPS_REPOSITORY")]
    gitops_repository: Option<String>,

    /// Token with push access to the GitOps repository
    #[arg(long, env = "INPUT_GITOPS_TOKEN", hide_env_values = true)]
    gitops_token: Option<String>,

    /// File containing the token
    #[arg(long, env = "INPUT_GITOPS_TOKEN_FILE")]
    gitops_token_file: Option<String>,

    /// Branch of the GitOps repository to publish to (default: main)
    #[arg(long, env = "INPUT_GITOPS_BRANCH")]
    gitops_branch: Option<String>,

    /// Directory inside the GitOps repository (default: repository root)
    #[arg(long, env = "INPUT_GITOPS_PATH")]
    gitops_path: Option<String>,

    /// Target environment, e.g. staging
    #[arg(long, env = "INPUT_ENVIRONMENT")]
    environment: Option<String>,

    /// Application name (default: name of the invoking repository)
    #[arg(long, env = "INPUT_APPLICATION_NAME")]
    application_name: Option<String>,

    /// Local directory with plain Kubernetes manifests (default: .)
    #[arg(long, env = "INPUT_APPLICATION_MANIFESTS_PATH")]
    application_manifests_path: Option<String>,

    /// Chart directory (default: bundled chart)
    #[arg(long, env = "INPUT_CHART")]
    chart: Option<String>,

    /// YAML document merged over the default chart values
    #[arg(long, env = "INPUT_CUSTOM_VALUES")]
    custom_values: Option<String>,

    /// Helm release to download when no binary is configured (default: v3.14.4)
    #[arg(long, env = "INPUT_HELM_VERSION")]
    helm_version: Option<String>,

    /// Use this helm binary instead of downloading one
    #[arg(long, env = "INPUT_HELM_PATH")]
    helm_path: Option<String>,

    /// Commit author name
    #[arg(long, env = "INPUT_GIT_USER_NAME")]
    git_user_name: Option<String>,

    /// Commit author email
    #[arg(long, env = "INPUT_GIT_USER_EMAIL")]
    git_user_email: Option<String>,

    /// Directory to clone the GitOps repository into (default: fresh temp dir)
    #[arg(long, env = "INPUT_WORKING_COPY")]
    working_copy: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, env = "ARGOSYNC_LOG_JSON")]
    log_json: bool,
}

impl Cli {
    fn into_inputs(self) -> ActionInputs {
        ActionInputs {
            gitops_repository: self.gitops_repository,
            gitops_token: self.gitops_token,
            gitops_token_file: self.gitops_token_file,
            gitops_branch: self.gitops_branch,
            gitops_path: self.gitops_path,
            environment: self.environment,
            application_name: self.application_name,
            application_manifests_path: self.application_manifests_path,
            chart: self.chart,
            custom_values: self.custom_values,
            helm_version: self.helm_version,
            helm_path: self.helm_path,
            git_user_name: self.git_user_name,
            git_user_email: self.git_user_email,
            working_copy: self.working_copy,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    telemetry::init(cli.log_json);

    match run(cli.into_inputs()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("{}", error_annotation(&e.to_string()));
            ExitCode::FAILURE
        }
    }
}

async fn run(inputs: ActionInputs) -> Result<(), DeployError> {
    let ctx = InvocationContext::from_env()?;
    tracing::debug!("Inputs: {}", inputs);

    let request = DeploymentRequest::from_inputs(&inputs, &ctx)?;
    let pipeline = DeployPipeline::new(
        PipelineConfig::from_context(&ctx),
        Arc::new(TokioCommandRunner),
    );

    let report = pipeline.run(&request, &LogProgress).await?;

    for warning in &report.warnings {
        println!("{}", warning_annotation(&warning.to_string()));
    }

    set_output(
        ctx.output_file.as_deref(),
        "time",
        &report.completed_at_rfc3339(),
    )
    .map_err(DeployError::Output)
}
