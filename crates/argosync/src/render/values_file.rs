use std::path::{Path, PathBuf};

use super::{RenderError, Result};

/// Temporary values file handed to `helm template`.
///
/// The name carries a timestamp and a random suffix so concurrent
/// invocations never collide. The file is deleted when the guard drops.
#[derive(Debug)]
pub struct ValuesFile {
    path: PathBuf,
}

impl ValuesFile {
    /// Writes `contents` to a new file under `dir`.
    pub fn create(dir: &Path, contents: &str) -> Result<Self> {
        let name = format!(
            "argosync-values-{}-{}.yaml",
            chrono::Utc::now().format("%Y%m%dT%H%M%S%3f"),
            uuid::Uuid::new_v4().simple()
        );
        let path = dir.join(name);

        write_private(&path, contents).map_err(|source| RenderError::ValuesFile {
            path: path.clone(),
            source,
        })?;

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ValuesFile {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!(
                    "Failed to remove values file {}: {}",
                    self.path.display(),
                    e
                );
            }
        }
    }
}

/// Creates the file exclusively, owner read/write only on Unix.
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    use std::io::Write;

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create_new(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(contents.as_bytes())
}
