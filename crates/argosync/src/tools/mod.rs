//! Locates or fetches the `helm` binary.
//!
//! Lookup order:
//! 1. An explicitly configured binary
//! 2. `<cache>/helm/<version>/<os>-<arch>/helm`
//! 3. The release archive from `get.helm.sh`, unpacked into the cache
//!
//! The cache root is always passed in; nothing here reads the environment.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, info, info_span, Instrument};

use crate::error::ToolError;
use crate::process::{CommandRequest, CommandRunner};

const HELM: &str = "helm";
pub const HELM_DOWNLOAD_BASE: &str = "https://get.helm.sh";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

pub type Result<T> = std::result::Result<T, ToolError>;

/// Root directory for downloaded tools.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCache {
    root: PathBuf,
}

impl ToolCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<tool>/<version>/<os>-<arch>`.
    pub fn tool_dir(&self, tool: &str, version: &str, platform: &Platform) -> PathBuf {
        self.root
            .join(tool)
            .join(version)
            .join(platform.to_string())
    }
}

/// Operating system and architecture in release-archive naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub os: &'static str,
    pub arch: &'static str,
}

impl Platform {
    pub fn current() -> Result<Self> {
        Self::from_consts(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Maps Rust's `std::env::consts` names to the names Helm publishes.
    pub fn from_consts(os: &'static str, arch: &'static str) -> Result<Self> {
        let mapped_os = match os {
            "linux" => "linux",
            "macos" => "darwin",
            _ => {
                return Err(ToolError::UnsupportedPlatform {
                    tool: HELM,
                    os,
                    arch,
                })
            }
        };
        let mapped_arch = match arch {
            "x86_64" => "amd64",
            "aarch64" => "arm64",
            "x86" => "386",
            "arm" => "arm",
            "powerpc64" => "ppc64le",
            "s390x" => "s390x",
            _ => {
                return Err(ToolError::UnsupportedPlatform {
                    tool: HELM,
                    os,
                    arch,
                })
            }
        };
        Ok(Self {
            os: mapped_os,
            arch: mapped_arch,
        })
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

/// A pinned `helm` release.
#[derive(Debug, Clone)]
pub struct HelmTool {
    version: String,
    explicit: Option<PathBuf>,
    download_base: String,
}

impl HelmTool {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            explicit: None,
            download_base: HELM_DOWNLOAD_BASE.to_string(),
        }
    }

    /// Uses `path` instead of the cache when set.
    pub fn with_explicit_path(mut self, path: Option<PathBuf>) -> Self {
        self.explicit = path;
        self
    }

    pub fn with_download_base(mut self, base: impl Into<String>) -> Self {
        self.download_base = base.into();
        self
    }

    /// `<base>/helm-<version>-<os>-<arch>.tar.gz`.
    pub fn archive_url(&self, platform: &Platform) -> String {
        format!(
            "{}/helm-{}-{}.tar.gz",
            self.download_base.trim_end_matches('/'),
            self.version,
            platform
        )
    }

    pub fn cached_binary(&self, cache: &ToolCache, platform: &Platform) -> PathBuf {
        cache.tool_dir(HELM, &self.version, platform).join(HELM)
    }

    /// Returns a usable `helm` path, downloading it on a cache miss.
    pub async fn ensure(&self, cache: &ToolCache, runner: &dyn CommandRunner) -> Result<PathBuf> {
        if let Some(path) = &self.explicit {
            if path.is_file() {
                debug!(path = %path.display(), "Using configured helm binary");
                return Ok(path.clone());
            }
            return Err(ToolError::NotFound {
                tool: HELM,
                path: path.clone(),
            });
        }

        let platform = Platform::current()?;
        let binary = self.cached_binary(cache, &platform);
        if binary.is_file() {
            debug!(path = %binary.display(), "Using cached helm");
            return Ok(binary);
        }

        let url = self.archive_url(&platform);
        let version_dir = cache.root().join(HELM).join(&self.version);
        create_dir(&version_dir)?;
        let archive = version_dir.join(format!("helm-{}-{}.tar.gz", self.version, platform));

        async {
            download(&url, &archive).await?;
            let installed = self
                .install_archive(&archive, cache, &platform, runner)
                .await;
            if let Err(e) = std::fs::remove_file(&archive) {
                debug!("Failed to remove {}: {}", archive.display(), e);
            }
            installed
        }
        .instrument(info_span!("tools.helm", version = %self.version, %platform))
        .await
    }

    /// Unpacks a release archive into the cache and returns the binary.
    ///
    /// The archive holds a single `<os>-<arch>/` directory; it is extracted
    /// to a staging directory and renamed into place.
    pub async fn install_archive(
        &self,
        archive: &Path,
        cache: &ToolCache,
        platform: &Platform,
        runner: &dyn CommandRunner,
    ) -> Result<PathBuf> {
        let target = cache.tool_dir(HELM, &self.version, platform);
        let version_dir = target
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| cache.root().to_path_buf());
        let staging = version_dir.join(format!(".staging-{}", uuid::Uuid::new_v4().simple()));
        create_dir(&staging)?;

        let request = CommandRequest::new("tar")
            .arg("-xzf")
            .arg(archive.to_string_lossy())
            .arg("-C")
            .arg(staging.to_string_lossy());
        let result = runner.run(request).await;

        let outcome = match result {
            Ok(output) if output.success() => {
                let unpacked = staging.join(platform.to_string());
                if target.exists() {
                    if let Err(e) = std::fs::remove_dir_all(&target) {
                        debug!("Failed to remove {}: {}", target.display(), e);
                    }
                }
                std::fs::rename(&unpacked, &target).map_err(|source| ToolError::Io {
                    path: target.clone(),
                    source,
                })
            }
            Ok(output) => Err(ToolError::Unpack {
                archive: archive.to_path_buf(),
                reason: format!(
                    "tar exited with {}: {}",
                    output.code(),
                    output.stderr.trim()
                ),
            }),
            Err(e) => Err(ToolError::Unpack {
                archive: archive.to_path_buf(),
                reason: e.to_string(),
            }),
        };

        if let Err(e) = std::fs::remove_dir_all(&staging) {
            debug!("Failed to remove {}: {}", staging.display(), e);
        }
        outcome?;

        let binary = target.join(HELM);
        if !binary.is_file() {
            return Err(ToolError::Unpack {
                archive: archive.to_path_buf(),
                reason: format!("archive did not contain {}", HELM),
            });
        }

        info!(path = %binary.display(), "Installed helm {}", self.version);
        Ok(binary)
    }
}

async fn download(url: &str, dest: &Path) -> Result<()> {
    let download_err = |reason: String| ToolError::Download {
        url: url.to_string(),
        reason,
    };

    let client = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(DOWNLOAD_TIMEOUT)
        .build()
        .map_err(|e| download_err(format!("failed to create HTTP client: {}", e)))?;

    info!("Downloading {}", url);
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| download_err(e.to_string()))?;

    if !response.status().is_success() {
        return Err(download_err(format!("HTTP {}", response.status())));
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| download_err(e.to_string()))?;

    tokio::fs::write(dest, &bytes)
        .await
        .map_err(|source| ToolError::Io {
            path: dest.to_path_buf(),
            source,
        })
}

fn create_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|source| ToolError::Io {
        path: path.to_path_buf(),
        source,
    })
}
