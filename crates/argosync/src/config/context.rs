use std::path::PathBuf;

use crate::error::ConfigError;

/// Facts about the environment the action runs in, captured once.
#[derive(Debug, Clone, Default)]
pub struct InvocationContext {
    /// `owner/repo` of the repository that triggered the workflow.
    pub repository: Option<String>,
    pub repository_owner: Option<String>,
    /// Directory the action's own files were checked out to.
    pub action_path: Option<PathBuf>,
    pub tool_cache: Option<PathBuf>,
    /// File step outputs are appended to.
    pub output_file: Option<PathBuf>,
    pub working_dir: PathBuf,
    pub temp_dir: PathBuf,
}

impl InvocationContext {
    /// Reads `GITHUB_REPOSITORY`, `GITHUB_REPOSITORY_OWNER`,
    /// `GITHUB_ACTION_PATH`, `RUNNER_TOOL_CACHE` and `GITHUB_OUTPUT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        Ok(Self {
            repository: var("GITHUB_REPOSITORY"),
            repository_owner: var("GITHUB_REPOSITORY_OWNER"),
            action_path: var("GITHUB_ACTION_PATH").map(PathBuf::from),
            tool_cache: var("RUNNER_TOOL_CACHE").map(PathBuf::from),
            output_file: var("GITHUB_OUTPUT").map(PathBuf::from),
            working_dir: std::env::current_dir().map_err(ConfigError::WorkingDir)?,
            temp_dir: std::env::temp_dir(),
        })
    }

    /// Root the bundled chart is looked up under.
    pub fn action_root(&self) -> PathBuf {
        self.action_path
            .clone()
            .unwrap_or_else(|| self.working_dir.clone())
    }

    /// Owner of the invoking repository, from `GITHUB_REPOSITORY_OWNER`
    /// or the owner half of `GITHUB_REPOSITORY`.
    pub fn owner(&self) -> Option<String> {
        self.repository_owner.clone().or_else(|| {
            self.repository
                .as_deref()
                .and_then(|r| r.split_once('/'))
                .map(|(owner, _)| owner.to_string())
        })
    }

    /// Name half of `GITHUB_REPOSITORY`.
    pub fn repository_name(&self) -> Option<String> {
        self.repository
            .as_deref()
            .map(crate::gitops::git::parse::repository_name)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
    }

    /// Root of the tool cache: `RUNNER_TOOL_CACHE`, else the user cache
    /// directory, else the temp directory.
    pub fn tool_cache_dir(&self) -> PathBuf {
        if let Some(dir) = &self.tool_cache {
            return dir.join("argosync");
        }
        dirs::cache_dir()
            .map(|dir| dir.join("argosync").join("tools"))
            .unwrap_or_else(|| self.temp_dir.join("argosync-tools"))
    }
}
