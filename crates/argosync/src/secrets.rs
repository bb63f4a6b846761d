//! GitOps access token resolution.
//!
//! The token can reach the action three ways, checked in order:
//!
//! 1. **Input value** - `gitops-token` passed by the workflow
//! 2. **File reference** - `gitops-token-file`, for runners that mount secrets
//! 3. **Environment variable** - `GITOPS_TOKEN` (or a configured name)
//!
//! The value is wrapped in [`SecretString`] as soon as it is read and is only
//! exposed when the authenticated clone URL is built.

use secrecy::SecretString;
use std::fs;

/// Environment variable consulted when no token input is given.
pub const DEFAULT_TOKEN_ENV_VAR: &str = "GITOPS_TOKEN";

/// Error type for secret resolution failures.
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("No token source provided (need one of: gitops-token, gitops-token-file, or ${0})")]
    NoSourceProvided(String),

    #[error("Failed to read token from file '{path}': {source}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Token file '{path}' is empty")]
    EmptyFile { path: String },

    #[error("Environment variable '{name}' contains invalid UTF-8")]
    EnvVarNotUnicode { name: String },
}

/// Result type for secret resolution.
pub type Result<T> = std::result::Result<T, SecretError>;

/// Resolves the token from the first non-empty source.
///
/// An unset or empty environment variable counts as "not provided".
pub fn resolve_secret(
    direct: Option<&str>,
    file_path: Option<&str>,
    env_var: &str,
) -> Result<SecretString> {
    if let Some(value) = direct.map(str::trim).filter(|v| !v.is_empty()) {
        return Ok(SecretString::from(value.to_string()));
    }

    if let Some(path) = file_path.filter(|p| !p.is_empty()) {
        let expanded = expand_home(path);
        let content = fs::read_to_string(&expanded).map_err(|e| SecretError::FileReadError {
            path: expanded.clone(),
            source: e,
        })?;
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(SecretError::EmptyFile { path: expanded });
        }
        return Ok(SecretString::from(trimmed.to_string()));
    }

    match std::env::var(env_var) {
        Ok(value) if !value.trim().is_empty() => Ok(SecretString::from(value.trim().to_string())),
        Ok(_) | Err(std::env::VarError::NotPresent) => {
            Err(SecretError::NoSourceProvided(env_var.to_string()))
        }
        Err(std::env::VarError::NotUnicode(_)) => Err(SecretError::EnvVarNotUnicode {
            name: env_var.to_string(),
        }),
    }
}

/// Expands a leading `~` to the user's home directory.
fn expand_home(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            if path == "~" {
                return home.to_string_lossy().into_owned();
            }
            return path.replacen('~', &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}
