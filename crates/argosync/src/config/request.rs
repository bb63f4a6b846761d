use std::path::{Path, PathBuf};

use secrecy::SecretString;

use super::context::InvocationContext;
use super::inputs::ActionInputs;
use super::validation;
use crate::error::ConfigError;
use crate::gitops::git::auth::RemoteRepository;
use crate::gitops::{CommitIdentity, GitOpsLayout};
use crate::render::ChartLocation;
use crate::secrets::{resolve_secret, SecretError, DEFAULT_TOKEN_ENV_VAR};
use crate::values::ValuesInput;

pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_MANIFESTS_PATH: &str = ".";
pub const DEFAULT_HELM_VERSION: &str = "v3.14.4";

/// A validated, immutable deployment request.
#[derive(Debug)]
pub struct DeploymentRequest {
    pub application_name: String,
    pub environment: String,
    pub gitops_repository: RemoteRepository,
    pub gitops_branch: String,
    /// Subdirectory inside the GitOps repository; empty for the root.
    pub gitops_path: String,
    /// Manifests path as it appears inside the GitOps layout.
    pub application_manifests_path: PathBuf,
    /// Local directory the manifests are copied from.
    pub manifests_source: PathBuf,
    pub custom_values: Option<String>,
    pub chart: ChartLocation,
    pub token: SecretString,
    pub identity: CommitIdentity,
    pub helm_version: String,
    pub helm_path: Option<PathBuf>,
    pub working_copy: PathBuf,
}

impl DeploymentRequest {
    /// Validates `inputs` against the invocation context.
    ///
    /// Missing required inputs are reported before anything else is
    /// checked, in the order repository, token, environment.
    pub fn from_inputs(
        inputs: &ActionInputs,
        ctx: &InvocationContext,
    ) -> Result<Self, ConfigError> {
        let repository = required(&inputs.gitops_repository, "gitops-repository")?;

        let token = resolve_secret(
            ActionInputs::get(&inputs.gitops_token),
            ActionInputs::get(&inputs.gitops_token_file),
            DEFAULT_TOKEN_ENV_VAR,
        )
        .map_err(|e| match e {
            SecretError::NoSourceProvided(_) => ConfigError::MissingInput {
                name: "gitops-token",
            },
            other => ConfigError::Secret(other),
        })?;

        let environment = required(&inputs.environment, "environment")?.to_string();
        validation::path_segment("environment", &environment)?;

        let (owner, repo_name) = validation::repository(repository)?;
        let Some(owner) = owner.or_else(|| ctx.owner()) else {
            return Err(ConfigError::InvalidInput {
                name: "gitops-repository",
                reason: format!(
                    "'{}' has no owner and GITHUB_REPOSITORY_OWNER is not set",
                    repository
                ),
            });
        };

        let application_name = match ActionInputs::get(&inputs.application_name) {
            Some(name) => name.to_string(),
            None => ctx.repository_name().ok_or(ConfigError::MissingInput {
                name: "application-name",
            })?,
        };
        validation::path_segment("application-name", &application_name)?;

        let gitops_branch = ActionInputs::get(&inputs.gitops_branch)
            .unwrap_or(DEFAULT_BRANCH)
            .to_string();
        validation::branch(&gitops_branch)?;

        let gitops_path = ActionInputs::get(&inputs.gitops_path)
            .unwrap_or_default()
            .trim_matches('/')
            .to_string();
        validation::no_traversal("gitops-path", Path::new(&gitops_path))?;

        let manifests_input = ActionInputs::get(&inputs.application_manifests_path)
            .unwrap_or(DEFAULT_MANIFESTS_PATH);
        let (application_manifests_path, manifests_source) =
            manifests_paths(Path::new(manifests_input), &ctx.working_dir);
        validation::no_traversal("application-manifests-path", &application_manifests_path)?;

        let helm_version = ActionInputs::get(&inputs.helm_version)
            .unwrap_or(DEFAULT_HELM_VERSION)
            .to_string();
        validation::helm_version(&helm_version)?;

        let defaults = CommitIdentity::default();
        let identity = CommitIdentity {
            name: ActionInputs::get(&inputs.git_user_name)
                .map(str::to_string)
                .unwrap_or(defaults.name),
            email: ActionInputs::get(&inputs.git_user_email)
                .map(str::to_string)
                .unwrap_or(defaults.email),
        };

        let working_copy = match ActionInputs::get(&inputs.working_copy) {
            Some(path) => ctx.working_dir.join(path),
            None => ctx
                .temp_dir
                .join(format!("argosync-{}", uuid::Uuid::new_v4().simple())),
        };
        if working_copy == ctx.working_dir || ctx.working_dir.starts_with(&working_copy) {
            return Err(ConfigError::InvalidInput {
                name: "working-copy",
                reason: "must not contain the current working directory".to_string(),
            });
        }

        Ok(Self {
            application_name,
            environment,
            gitops_repository: RemoteRepository::new(owner, repo_name),
            gitops_branch,
            gitops_path,
            application_manifests_path,
            manifests_source,
            custom_values: ActionInputs::get_raw(&inputs.custom_values).map(str::to_string),
            chart: ChartLocation::resolve(
                ActionInputs::get(&inputs.chart),
                &ctx.working_dir,
                &ctx.action_root(),
            ),
            token,
            identity,
            helm_version,
            helm_path: ActionInputs::get(&inputs.helm_path).map(|p| ctx.working_dir.join(p)),
            working_copy,
        })
    }

    /// Helm release name, `<application>-<environment>`.
    pub fn release_name(&self) -> String {
        format!("{}-{}", self.application_name, self.environment)
    }

    pub fn layout(&self) -> GitOpsLayout {
        GitOpsLayout::new(
            &self.gitops_path,
            &self.application_name,
            &self.environment,
            &self.application_manifests_path,
        )
    }

    /// The pointer manifest refers back to the GitOps repository itself.
    pub fn values_input(&self) -> ValuesInput {
        ValuesInput {
            application_name: self.application_name.clone(),
            environment: self.environment.clone(),
            source_org: self.gitops_repository.owner.clone(),
            source_repo: self.gitops_repository.name.clone(),
            source_branch: self.gitops_branch.clone(),
            gitops_path: self.gitops_path.clone(),
            custom_values: self.custom_values.clone().unwrap_or_default(),
            application_manifests_path: self.application_manifests_path.clone(),
        }
    }
}

fn required<'a>(value: &'a Option<String>, name: &'static str) -> Result<&'a str, ConfigError> {
    ActionInputs::get(value).ok_or(ConfigError::MissingInput { name })
}

/// Returns the in-repository manifests path and the local source directory.
///
/// An absolute path below the working directory is made relative to it.
fn manifests_paths(input: &Path, working_dir: &Path) -> (PathBuf, PathBuf) {
    if input.is_absolute() {
        let relative = input
            .strip_prefix(working_dir)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| input.to_path_buf());
        (relative, input.to_path_buf())
    } else {
        (input.to_path_buf(), working_dir.join(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;

    fn ctx() -> InvocationContext {
        InvocationContext {
            repository: Some("acme/web".to_string()),
            repository_owner: Some("acme".to_string()),
            working_dir: PathBuf::from("/work/web"),
            temp_dir: PathBuf::from("/tmp"),
            ..Default::default()
        }
    }

    fn inputs() -> ActionInputs {
        ActionInputs {
            gitops_repository: Some("acme/gitops".to_string()),
            gitops_token: Some("ghp_token".to_string()),
            environment: Some("dev".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_defaults() {
        let request = DeploymentRequest::from_inputs(&inputs(), &ctx()).unwrap();

        assert_eq!(request.application_name, "web");
        assert_eq!(
            request.gitops_repository,
            RemoteRepository::new("acme", "gitops")
        );
        assert_eq!(request.gitops_branch, "main");
        assert_eq!(request.gitops_path, "");
        assert_eq!(request.application_manifests_path, PathBuf::from("."));
        assert_eq!(request.manifests_source, PathBuf::from("/work/web/."));
        assert_eq!(request.helm_version, DEFAULT_HELM_VERSION);
        assert_eq!(request.identity, CommitIdentity::default());
        assert_eq!(request.token.expose_secret(), "ghp_token");
        assert_eq!(request.release_name(), "web-dev");
        assert!(request.working_copy.starts_with("/tmp"));
        assert!(matches!(request.chart, ChartLocation::Bundled { .. }));
    }

    #[test]
    #[serial]
    fn test_missing_inputs_are_named_in_order() {
        std::env::remove_var(DEFAULT_TOKEN_ENV_VAR);

        let mut missing = inputs();
        missing.gitops_repository = Some("  ".to_string());
        let err = DeploymentRequest::from_inputs(&missing, &ctx()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required input 'gitops-repository'"
        );

        let mut missing = inputs();
        missing.gitops_token = None;
        let err = DeploymentRequest::from_inputs(&missing, &ctx()).unwrap_err();
        assert_eq!(err.to_string(), "Missing required input 'gitops-token'");

        let mut missing = inputs();
        missing.environment = None;
        let err = DeploymentRequest::from_inputs(&missing, &ctx()).unwrap_err();
        assert_eq!(err.to_string(), "Missing required input 'environment'");
    }

    #[test]
    fn test_bare_repository_takes_owner_from_context() {
        let mut input = inputs();
        input.gitops_repository = Some("gitops".to_string());
        let request = DeploymentRequest::from_inputs(&input, &ctx()).unwrap();
        assert_eq!(request.gitops_repository.to_string(), "acme/gitops");
    }

    #[test]
    fn test_absolute_manifests_path_inside_working_dir() {
        let mut input = inputs();
        input.application_manifests_path = Some("/work/web/deploy/k8s".to_string());
        let request = DeploymentRequest::from_inputs(&input, &ctx()).unwrap();

        assert_eq!(
            request.application_manifests_path,
            PathBuf::from("deploy/k8s")
        );
        assert_eq!(
            request.manifests_source,
            PathBuf::from("/work/web/deploy/k8s")
        );
        assert_eq!(request.layout().source_path(), "web/dev/deploy/k8s/");
    }

    #[test]
    fn test_traversal_is_rejected() {
        let mut input = inputs();
        input.gitops_path = Some("../elsewhere".to_string());
        assert!(matches!(
            DeploymentRequest::from_inputs(&input, &ctx()).unwrap_err(),
            ConfigError::InvalidInput {
                name: "gitops-path",
                ..
            }
        ));

        let mut input = inputs();
        input.application_manifests_path = Some("../sibling".to_string());
        assert!(DeploymentRequest::from_inputs(&input, &ctx()).is_err());
    }

    #[test]
    fn test_working_copy_must_not_swallow_working_dir() {
        let mut input = inputs();
        input.working_copy = Some("/work".to_string());
        assert!(matches!(
            DeploymentRequest::from_inputs(&input, &ctx()).unwrap_err(),
            ConfigError::InvalidInput {
                name: "working-copy",
                ..
            }
        ));
    }

    #[test]
    fn test_values_input_points_at_gitops_repository() {
        let mut input = inputs();
        input.gitops_branch = Some("deploy".to_string());
        input.gitops_path = Some("/clusters/prod/".to_string());
        let values = DeploymentRequest::from_inputs(&input, &ctx())
            .unwrap()
            .values_input();

        assert_eq!(values.source_org, "acme");
        assert_eq!(values.source_repo, "gitops");
        assert_eq!(values.source_branch, "deploy");
        assert_eq!(values.gitops_path, "clusters/prod");
    }

    const INDENTED: &str = "  project: platform\n  argocdNamespace: gitops\n";

    #[test]
    fn test_indented_custom_values_are_kept_verbatim() {
        let mut input = inputs();
        input.custom_values = Some(INDENTED.to_string());
        let request = DeploymentRequest::from_inputs(&input, &ctx()).unwrap();

        assert_eq!(request.custom_values.as_deref(), Some(INDENTED));
        let composed = crate::values::compose(&request.values_input()).unwrap();
        let composed: serde_yaml::Value = serde_yaml::from_str(&composed).unwrap();
        assert_eq!(composed["project"], serde_yaml::Value::from("platform"));
        assert_eq!(
            composed["argocdNamespace"],
            serde_yaml::Value::from("gitops")
        );
    }

    #[test]
    fn test_blank_custom_values_are_absent() {
        let mut input = inputs();
        input.custom_values = Some("  \n".to_string());
        let request = DeploymentRequest::from_inputs(&input, &ctx()).unwrap();
        assert_eq!(request.custom_values, None);
    }
}
