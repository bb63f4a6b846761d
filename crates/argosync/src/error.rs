use std::path::PathBuf;
use thiserror::Error;

/// Terminal failure of one deployment run.
#[derive(Error, Debug)]
pub enum DeployError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error(transparent)]
    Values(#[from] crate::values::ValuesError),

    #[error(transparent)]
    Render(#[from] crate::render::RenderError),

    #[error(transparent)]
    GitOps(#[from] crate::gitops::GitOpsError),

    #[error("Failed to write step output: {0}")]
    Output(#[source] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required input '{name}'")]
    MissingInput { name: &'static str },

    #[error("Invalid input '{name}': {reason}")]
    InvalidInput { name: &'static str, reason: String },

    #[error("Failed to resolve gitops token: {0}")]
    Secret(#[from] crate::secrets::SecretError),

    #[error("Failed to determine working directory: {0}")]
    WorkingDir(#[source] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Unsupported platform for {tool}: {os}/{arch}")]
    UnsupportedPlatform {
        tool: &'static str,
        os: &'static str,
        arch: &'static str,
    },

    #[error("Configured {tool} binary not found at '{path}'")]
    NotFound { tool: &'static str, path: PathBuf },

    #[error("Failed to download {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("Failed to unpack {archive}: {reason}")]
    Unpack { archive: PathBuf, reason: String },

    #[error("Tool cache I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, DeployError>;
