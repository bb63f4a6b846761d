//! Path layout inside the GitOps repository.
//!
//! ```text
//! <gitops_path>/argocd-apps/<application>/<environment>.yaml
//! <gitops_path>/<application>/<environment>/<manifests_path>/...
//! ```

use std::path::{Component, Path, PathBuf};

/// Directory grouping the pointer manifests of every application.
pub const POINTER_DIR: &str = "argocd-apps";

/// Computes where an application's files live in the GitOps repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitOpsLayout {
    gitops_path: PathBuf,
    application_name: String,
    environment: String,
    manifests_segment: PathBuf,
}

impl GitOpsLayout {
    pub fn new(
        gitops_path: &str,
        application_name: &str,
        environment: &str,
        manifests_path: &Path,
    ) -> Self {
        Self {
            gitops_path: repo_relative(Path::new(gitops_path)),
            application_name: application_name.to_string(),
            environment: environment.to_string(),
            manifests_segment: repo_relative(manifests_path),
        }
    }

    pub fn application_name(&self) -> &str {
        &self.application_name
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// `<gitops_path>/argocd-apps/<application>` relative to the repository root.
    pub fn pointer_dir(&self) -> PathBuf {
        self.gitops_path
            .join(POINTER_DIR)
            .join(&self.application_name)
    }

    /// `<gitops_path>/argocd-apps/<application>/<environment>.yaml`.
    pub fn pointer_manifest(&self) -> PathBuf {
        self.pointer_dir()
            .join(format!("{}.yaml", self.environment))
    }

    /// `<gitops_path>/<application>/<environment>/<manifests_path>`.
    pub fn manifests_dir(&self) -> PathBuf {
        self.gitops_path
            .join(&self.application_name)
            .join(&self.environment)
            .join(&self.manifests_segment)
    }

    /// The two top-level paths placement writes to; the only paths staged.
    pub fn stage_paths(&self) -> Vec<PathBuf> {
        vec![
            self.gitops_path.join(POINTER_DIR),
            self.gitops_path.join(&self.application_name),
        ]
    }

    /// Forward-slash path the ArgoCD Application points at, with a trailing `/`.
    pub fn source_path(&self) -> String {
        let mut joined = path_to_slash(&self.manifests_dir());
        joined.push('/');
        joined
    }
}

/// Strips root, prefix, `.` and `..` components so a path can be joined
/// under the repository root.
pub fn repo_relative(path: &Path) -> PathBuf {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect()
}

/// Joins the normal components of `path` with `/` on every platform.
pub fn path_to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
