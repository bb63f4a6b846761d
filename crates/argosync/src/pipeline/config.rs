use std::path::PathBuf;

use crate::config::InvocationContext;
use crate::gitops::PushPolicy;
use crate::tools::{ToolCache, HELM_DOWNLOAD_BASE};

/// Runtime settings that are not part of the deployment request itself.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub tool_cache: ToolCache,
    /// Where helm release archives are fetched from on a cache miss.
    pub helm_download_base: String,
    /// Where the temporary values file is written.
    pub temp_dir: PathBuf,
    pub push_policy: PushPolicy,
}

impl PipelineConfig {
    pub fn from_context(ctx: &InvocationContext) -> Self {
        Self {
            tool_cache: ToolCache::new(ctx.tool_cache_dir()),
            helm_download_base: HELM_DOWNLOAD_BASE.to_string(),
            temp_dir: ctx.temp_dir.clone(),
            push_policy: PushPolicy::default(),
        }
    }
}
