//! Writes the rendered pointer manifest and copies the application's
//! plain manifests into the working copy.

use std::path::{Path, PathBuf};

use serde::Serialize;
use walkdir::WalkDir;

use super::error::{GitOpsError, Result};
use super::layout::GitOpsLayout;

/// Everything placement needs.
#[derive(Debug, Clone)]
pub struct PlacementRequest<'a> {
    /// Root of the cloned GitOps repository.
    pub working_copy: &'a Path,
    pub layout: &'a GitOpsLayout,
    /// Rendered ArgoCD `Application` manifest.
    pub manifest: &'a str,
    /// Local directory holding the application's plain manifests.
    pub manifests_source: &'a Path,
}

/// Non-fatal conditions met while placing files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PlacementWarning {
    ManifestsPathMissing { path: PathBuf },
}

impl std::fmt::Display for PlacementWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlacementWarning::ManifestsPathMissing { path } => write!(
                f,
                "application manifests path '{}' does not exist, skipping copy",
                path.display()
            ),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementReport {
    /// Absolute path of the written pointer manifest.
    pub pointer_manifest: PathBuf,
    /// Number of regular files copied from the manifests path.
    pub files_copied: usize,
    pub warnings: Vec<PlacementWarning>,
}

/// Places the pointer manifest and the application manifests.
pub fn place(request: &PlacementRequest<'_>) -> Result<PlacementReport> {
    let pointer_manifest = request.working_copy.join(request.layout.pointer_manifest());
    if let Some(parent) = pointer_manifest.parent() {
        create_dir(parent)?;
    }
    std::fs::write(&pointer_manifest, request.manifest).map_err(|source| {
        GitOpsError::PlacementFailed {
            path: pointer_manifest.clone(),
            source,
        }
    })?;
    log::info!("Wrote {}", request.layout.pointer_manifest().display());

    let target = request.working_copy.join(request.layout.manifests_dir());
    create_dir(&target)?;

    let mut report = PlacementReport {
        pointer_manifest,
        ..Default::default()
    };

    if !request.manifests_source.exists() {
        let warning = PlacementWarning::ManifestsPathMissing {
            path: request.manifests_source.to_path_buf(),
        };
        log::warn!("{}", warning);
        report.warnings.push(warning);
        return Ok(report);
    }

    report.files_copied = copy_tree(request.manifests_source, &target, request.working_copy)?;
    log::info!(
        "Copied {} file(s) into {}",
        report.files_copied,
        request.layout.manifests_dir().display()
    );

    Ok(report)
}

/// Copies the contents of `source` into `target`. `.git` directories and
/// `exclude` (the working copy, when it lives below `source`) are skipped.
fn copy_tree(source: &Path, target: &Path, exclude: &Path) -> Result<usize> {
    let exclude = exclude
        .canonicalize()
        .unwrap_or_else(|_| exclude.to_path_buf());
    let mut copied = 0;

    let walker = WalkDir::new(source)
        .min_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| {
            if entry.file_type().is_dir() && entry.file_name() == ".git" {
                return false;
            }
            let path = entry
                .path()
                .canonicalize()
                .unwrap_or_else(|_| entry.path().to_path_buf());
            path != exclude
        });

    for entry in walker {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(source).to_path_buf();
            GitOpsError::PlacementFailed {
                path,
                source: e.into(),
            }
        })?;

        let relative = match entry.path().strip_prefix(source) {
            Ok(relative) => relative,
            Err(_) => continue,
        };
        let destination = target.join(relative);

        if entry.file_type().is_dir() {
            create_dir(&destination)?;
        } else if entry.file_type().is_file() {
            std::fs::copy(entry.path(), &destination).map_err(|source| {
                GitOpsError::PlacementFailed {
                    path: destination.clone(),
                    source,
                }
            })?;
            copied += 1;
        }
    }

    Ok(copied)
}

fn create_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|source| GitOpsError::PlacementFailed {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_place_writes_pointer_and_copies_manifests() {
        let wc = TempDir::new().unwrap();
        let src = TempDir::new().unwrap();
        write(&src.path().join("deployment.yaml"), "kind: Deployment\n");
        write(&src.path().join("base/service.yaml"), "kind: Service\n");

        let layout = GitOpsLayout::new("clusters", "api", "dev", Path::new("k8s"));
        let report = place(&PlacementRequest {
            working_copy: wc.path(),
            layout: &layout,
            manifest: "kind: Application\n",
            manifests_source: src.path(),
        })
        .unwrap();

        assert_eq!(
            fs::read_to_string(wc.path().join("clusters/argocd-apps/api/dev.yaml")).unwrap(),
            "kind: Application\n"
        );
        let dest = wc.path().join("clusters/api/dev/k8s");
        assert!(dest.join("deployment.yaml").is_file());
        assert_eq!(
            fs::read_to_string(dest.join("base/service.yaml")).unwrap(),
            "kind: Service\n"
        );
        assert_eq!(report.files_copied, 2);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_missing_manifests_path_is_a_warning() {
        let wc = TempDir::new().unwrap();
        let layout = GitOpsLayout::new("", "api", "dev", Path::new("missing"));
        let missing = wc.path().join("does-not-exist");

        let report = place(&PlacementRequest {
            working_copy: wc.path(),
            layout: &layout,
            manifest: "kind: Application\n",
            manifests_source: &missing,
        })
        .unwrap();

        assert!(wc.path().join("argocd-apps/api/dev.yaml").is_file());
        assert!(wc.path().join("api/dev/missing").is_dir());
        assert_eq!(
            report.warnings,
            vec![PlacementWarning::ManifestsPathMissing { path: missing }]
        );
    }

    #[test]
    fn test_git_dir_and_working_copy_are_not_copied() {
        let src = TempDir::new().unwrap();
        write(&src.path().join("app.yaml"), "a");
        write(&src.path().join(".git/HEAD"), "ref: refs/heads/main");
        let wc = src.path().join("gitops-clone");
        write(&wc.join("README.md"), "clone");

        let layout = GitOpsLayout::new("", "api", "dev", Path::new("."));
        let report = place(&PlacementRequest {
            working_copy: &wc,
            layout: &layout,
            manifest: "kind: Application\n",
            manifests_source: src.path(),
        })
        .unwrap();

        let dest = wc.join("api/dev");
        assert!(dest.join("app.yaml").is_file());
        assert!(!dest.join(".git").exists());
        assert!(!dest.join("gitops-clone").exists());
        assert_eq!(report.files_copied, 1);
    }

    #[test]
    fn test_replacing_pointer_manifest_overwrites() {
        let wc = TempDir::new().unwrap();
        let src = TempDir::new().unwrap();
        let layout = GitOpsLayout::new("", "api", "dev", Path::new("."));

        for manifest in ["first", "second"] {
            place(&PlacementRequest {
                working_copy: wc.path(),
                layout: &layout,
                manifest,
                manifests_source: src.path(),
            })
            .unwrap();
        }

        assert_eq!(
            fs::read_to_string(wc.path().join("argocd-apps/api/dev.yaml")).unwrap(),
            "second"
        );
    }

    #[test]
    fn test_copy_failure_is_fatal() {
        let wc = TempDir::new().unwrap();
        let src = TempDir::new().unwrap();
        write(&src.path().join("deployment.yaml"), "kind: Deployment\n");
        // A directory where the copied file has to go
        write(&wc.path().join("api/dev/deployment.yaml/keep"), "");

        let layout = GitOpsLayout::new("", "api", "dev", Path::new("."));
        let err = place(&PlacementRequest {
            working_copy: wc.path(),
            layout: &layout,
            manifest: "kind: Application\n",
            manifests_source: src.path(),
        })
        .unwrap_err();

        match err {
            GitOpsError::PlacementFailed { path, .. } => {
                assert_eq!(path, wc.path().join("api/dev/deployment.yaml"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_existing_target_files_are_left_in_place() {
        let wc = TempDir::new().unwrap();
        let src = TempDir::new().unwrap();
        write(&src.path().join("deployment.yaml"), "kind: Deployment\n");
        let kept = wc.path().join("api/dev/configmap.yaml");
        write(&kept, "kind: ConfigMap\n");

        let layout = GitOpsLayout::new("", "api", "dev", Path::new("."));
        place(&PlacementRequest {
            working_copy: wc.path(),
            layout: &layout,
            manifest: "kind: Application\n",
            manifests_source: src.path(),
        })
        .unwrap();

        assert!(wc.path().join("api/dev/deployment.yaml").is_file());
        assert!(kept.is_file());
    }
}
