//! Helm values for the ArgoCD Application chart.
//!
//! The default document is derived from the deployment identity; a
//! user-supplied YAML document is deep-merged over it with override
//! precedence (see [`merge::deep_merge`]).

pub mod merge;

use std::path::PathBuf;

use serde_yaml::{Mapping, Value};
use thiserror::Error;

use crate::gitops::layout::GitOpsLayout;

pub use merge::deep_merge;

#[derive(Error, Debug)]
pub enum ValuesError {
    #[error("Invalid custom values: {0}")]
    InvalidOverrideDocument(String),

    #[error("Failed to serialize values: {0}")]
    Serialize(String),
}

pub type Result<T> = std::result::Result<T, ValuesError>;

/// Everything the values document is derived from.
#[derive(Debug, Clone, Default)]
pub struct ValuesInput {
    pub application_name: String,
    pub environment: String,
    pub source_org: String,
    pub source_repo: String,
    pub source_branch: String,
    pub gitops_path: String,
    pub custom_values: String,
    pub application_manifests_path: PathBuf,
}

impl ValuesInput {
    fn layout(&self) -> GitOpsLayout {
        GitOpsLayout::new(
            &self.gitops_path,
            &self.application_name,
            &self.environment,
            &self.application_manifests_path,
        )
    }
}

/// Builds the default values tree.
pub fn default_values(input: &ValuesInput) -> Value {
    let mut destination = Mapping::new();
    destination.insert("namespace".into(), input.application_name.clone().into());

    let mut source = Mapping::new();
    source.insert(
        "repoURL".into(),
        format!(
            "https://github.com/{}/{}.git",
            input.source_org, input.source_repo
        )
        .into(),
    );
    source.insert("targetRevision".into(), input.source_branch.clone().into());
    source.insert("path".into(), input.layout().source_path().into());

    let mut application = Mapping::new();
    application.insert("destination".into(), Value::Mapping(destination));
    application.insert("source".into(), Value::Mapping(source));

    let mut root = Mapping::new();
    root.insert(
        "applicationName".into(),
        format!("{}-{}", input.application_name, input.environment).into(),
    );
    root.insert("application".into(), Value::Mapping(application));

    Value::Mapping(root)
}

/// Produces the values document text handed to the renderer.
pub fn compose(input: &ValuesInput) -> Result<String> {
    let defaults = default_values(input);

    let merged = match parse_override(&input.custom_values)? {
        Some(overlay) => deep_merge(defaults, overlay),
        None => defaults,
    };

    serde_yaml::to_string(&merged).map_err(|e| ValuesError::Serialize(e.to_string()))
}

/// Parses the custom values document. Blank or comment-only input yields `None`.
fn parse_override(text: &str) -> Result<Option<Value>> {
    if text.trim().is_empty() {
        return Ok(None);
    }

    let value: Value = serde_yaml::from_str(text)
        .map_err(|e| ValuesError::InvalidOverrideDocument(e.to_string()))?;

    match value {
        Value::Null => Ok(None),
        Value::Mapping(_) => Ok(Some(value)),
        other => Err(ValuesError::InvalidOverrideDocument(format!(
            "expected a mapping at the document root, found {}",
            kind_name(&other)
        ))),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
