use std::path::{Path, PathBuf};

use super::{RenderError, Result};

/// File whose presence marks a directory as a Helm chart.
pub const CHART_DESCRIPTOR: &str = "Chart.yaml";

/// Chart shipped with the action, relative to the action root.
pub const DEFAULT_CHART_DIR: &str = "charts/argocd-application";

/// Where the ArgoCD Application chart lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartLocation {
    /// The chart bundled with the action, under the given action root.
    Bundled { action_root: PathBuf },
    /// A chart directory that has already been resolved.
    Path(PathBuf),
}

impl ChartLocation {
    /// Resolves the `chart` input.
    ///
    /// Absolute paths are used as-is; relative paths are resolved against
    /// `working_dir` (the directory the action was invoked from). No input
    /// selects the bundled chart under `action_root`.
    pub fn resolve(input: Option<&str>, working_dir: &Path, action_root: &Path) -> Self {
        match input.map(str::trim).filter(|s| !s.is_empty()) {
            None => ChartLocation::Bundled {
                action_root: action_root.to_path_buf(),
            },
            Some(chart) => {
                let path = Path::new(chart);
                if path.is_absolute() {
                    ChartLocation::Path(path.to_path_buf())
                } else {
                    ChartLocation::Path(working_dir.join(path))
                }
            }
        }
    }

    /// The chart directory this location points at.
    pub fn dir(&self) -> PathBuf {
        match self {
            ChartLocation::Bundled { action_root } => action_root.join(DEFAULT_CHART_DIR),
            ChartLocation::Path(path) => path.clone(),
        }
    }

    /// Returns the chart directory if it contains a chart descriptor.
    pub fn verify(&self) -> Result<PathBuf> {
        let dir = self.dir();
        if dir.join(CHART_DESCRIPTOR).is_file() {
            Ok(dir)
        } else {
            Err(RenderError::ChartNotFound { path: dir })
        }
    }
}
