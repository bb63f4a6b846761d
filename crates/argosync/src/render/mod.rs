//! Renders the ArgoCD Application manifest with `helm template`.

pub mod chart;
pub mod values_file;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info_span, Instrument};

use crate::process::{CommandRequest, CommandRunner};

pub use chart::{ChartLocation, CHART_DESCRIPTOR, DEFAULT_CHART_DIR};
pub use values_file::ValuesFile;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Chart not found: no Chart.yaml in '{path}'")]
    ChartNotFound { path: PathBuf },

    #[error("Failed to write values file '{path}': {source}")]
    ValuesFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("helm template failed with exit code {exit_code}: {stderr}")]
    RenderFailed { exit_code: i32, stderr: String },
}

pub type Result<T> = std::result::Result<T, RenderError>;

/// Runs the external templating tool against a chart.
pub struct ManifestRenderer {
    helm: PathBuf,
    temp_dir: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl ManifestRenderer {
    pub fn new(helm: impl Into<PathBuf>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            helm: helm.into(),
            temp_dir: std::env::temp_dir(),
            runner,
        }
    }

    /// Writes values files somewhere other than the system temp directory.
    pub fn with_temp_dir(mut self, temp_dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = temp_dir.into();
        self
    }

    /// Renders `chart` with the given values document, returning the
    /// trimmed manifest text.
    ///
    /// The chart must already be resolved; it is checked for a
    /// `Chart.yaml` before the renderer is started.
    pub async fn render(
        &self,
        chart: &ChartLocation,
        release: &str,
        values: &str,
    ) -> Result<String> {
        let chart_dir = chart.verify()?;
        let values_file = ValuesFile::create(&self.temp_dir, values)?;

        let program = self.helm.to_string_lossy().into_owned();
        let request = CommandRequest::new(program.clone())
            .arg("template")
            .arg(release)
            .arg(chart_dir.to_string_lossy())
            .arg("--values")
            .arg(values_file.path().to_string_lossy());

        debug!(chart = %chart_dir.display(), release, "Rendering manifest");

        let output = self
            .runner
            .run(request)
            .instrument(info_span!("render.helm", release))
            .await
            .map_err(|source| RenderError::Spawn { program, source })?;

        // Values file is removed here on every path.
        drop(values_file);

        if !output.success() {
            return Err(RenderError::RenderFailed {
                exit_code: output.code(),
                stderr: output.stderr.trim().to_string(),
            });
        }

        Ok(output.stdout.trim().to_string())
    }
}
