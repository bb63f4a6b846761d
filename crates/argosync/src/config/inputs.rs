/// Raw action inputs, as the workflow supplied them.
///
/// Workflow runners pass unset inputs as empty strings, so every field is
/// normalised with [`ActionInputs::get`] before use.
#[derive(Debug, Clone, Default)]
pub struct ActionInputs {
    pub gitops_repository: Option<String>,
    pub gitops_token: Option<String>,
    pub gitops_token_file: Option<String>,
    pub gitops_branch: Option<String>,
    pub gitops_path: Option<String>,
    pub environment: Option<String>,
    pub application_name: Option<String>,
    pub application_manifests_path: Option<String>,
    pub chart: Option<String>,
    pub custom_values: Option<String>,
    pub helm_version: Option<String>,
    /// Use this `helm` binary instead of the tool cache.
    pub helm_path: Option<String>,
    pub git_user_name: Option<String>,
    pub git_user_email: Option<String>,
    pub working_copy: Option<String>,
}

impl ActionInputs {
    /// Trimmed value, `None` when absent or blank.
    pub fn get(value: &Option<String>) -> Option<&str> {
        value.as_deref().map(str::trim).filter(|v| !v.is_empty())
    }

    /// Untouched value, `None` when absent or blank. For documents, where
    /// leading indentation is significant.
    pub fn get_raw(value: &Option<String>) -> Option<&str> {
        value.as_deref().filter(|v| !v.trim().is_empty())
    }
}

impl std::fmt::Display for ActionInputs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "repository={} branch={} path={} environment={} application={}",
            Self::get(&self.gitops_repository).unwrap_or("-"),
            Self::get(&self.gitops_branch).unwrap_or("-"),
            Self::get(&self.gitops_path).unwrap_or("-"),
            Self::get(&self.environment).unwrap_or("-"),
            Self::get(&self.application_name).unwrap_or("-"),
        )
    }
}
