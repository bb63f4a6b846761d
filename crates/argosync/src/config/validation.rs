//! Input validators.
//!
//! Application name and environment end up as path segments and in the
//! commit subject, so they are restricted to a conservative character set.

use std::path::{Component, Path};
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ConfigError;

static RE_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$").unwrap());
static RE_REPOSITORY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:(?P<owner>[A-Za-z0-9][A-Za-z0-9-]*)/)?(?P<name>[A-Za-z0-9._-]+)$").unwrap()
});
static RE_BRANCH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._/-]*$").unwrap());
static RE_HELM_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^v\d+\.\d+\.\d+(?:-[0-9A-Za-z.]+)?$").unwrap());

/// Validates a value used as a single path segment.
pub fn path_segment(name: &'static str, value: &str) -> Result<(), ConfigError> {
    if value == "." || value == ".." || !RE_SEGMENT.is_match(value) {
        return Err(ConfigError::InvalidInput {
            name,
            reason: format!(
                "'{}' must start with a letter or digit and contain only \
                 letters, digits, '.', '_' or '-'",
                value
            ),
        });
    }
    Ok(())
}

/// Splits `owner/repo` (or bare `repo`) into its parts.
pub fn repository(value: &str) -> Result<(Option<String>, String), ConfigError> {
    let caps = RE_REPOSITORY
        .captures(value)
        .ok_or_else(|| ConfigError::InvalidInput {
            name: "gitops-repository",
            reason: format!("'{}' is not of the form owner/repo", value),
        })?;

    let owner = caps.name("owner").map(|m| m.as_str().to_string());
    let name = caps
        .name("name")
        .map(|m| m.as_str().trim_end_matches(".git").to_string())
        .unwrap_or_default();

    if name.is_empty() || name == "." || name == ".." {
        return Err(ConfigError::InvalidInput {
            name: "gitops-repository",
            reason: format!("'{}' has no repository name", value),
        });
    }

    Ok((owner, name))
}

/// Validates a branch name; a subset of what `git check-ref-format` accepts.
pub fn branch(value: &str) -> Result<(), ConfigError> {
    if !RE_BRANCH.is_match(value)
        || value.contains("..")
        || value.contains("//")
        || value.ends_with('/')
        || value.ends_with(".lock")
    {
        return Err(ConfigError::InvalidInput {
            name: "gitops-branch",
            reason: format!("'{}' is not a valid branch name", value),
        });
    }
    Ok(())
}

pub fn helm_version(value: &str) -> Result<(), ConfigError> {
    if !RE_HELM_VERSION.is_match(value) {
        return Err(ConfigError::InvalidInput {
            name: "helm-version",
            reason: format!("'{}' is not a version like v3.14.4", value),
        });
    }
    Ok(())
}

/// Rejects paths that climb out of their root with `..`.
pub fn no_traversal(name: &'static str, path: &Path) -> Result<(), ConfigError> {
    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(ConfigError::InvalidInput {
            name,
            reason: format!("'{}' must not contain '..'", path.display()),
        });
    }
    Ok(())
}
