use std::path::{Path, PathBuf};

use super::error::{GitOpsError, Result};

/// Scoped ownership of the clone directory.
///
/// `create` clears anything left behind by an earlier run. Dropping the
/// guard removes the directory on every exit path; a cleanup failure is
/// only logged so it never replaces the error that ended the run.
#[derive(Debug)]
pub struct WorkingCopy {
    path: PathBuf,
}

impl WorkingCopy {
    /// Claims `path`. The directory itself is left absent so `git clone`
    /// can create it; only its parent is ensured.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if path.exists() {
            log::debug!("Removing stale working copy {}", path.display());
            std::fs::remove_dir_all(&path).map_err(|source| GitOpsError::WorkingCopy {
                path: path.clone(),
                source,
            })?;
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| GitOpsError::WorkingCopy {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WorkingCopy {
    fn drop(&mut self) {
        match std::fs::remove_dir_all(&self.path) {
            Ok(()) => log::debug!("Removed working copy {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::debug!(
                "Failed to remove working copy {}: {}",
                self.path.display(),
                e
            ),
        }
    }
}
