//! Log output setup.
//!
//! Events go to stderr so stdout stays free for step outputs and workflow
//! commands. `log` records from the git layer are forwarded into `tracing`.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the filter directives.
pub const LOG_ENV_VAR: &str = "ARGOSYNC_LOG";

const DEFAULT_FILTER: &str = "info";

/// Builds the filter from [`LOG_ENV_VAR`], falling back to `info` when it
/// is unset or does not parse.
pub fn env_filter() -> EnvFilter {
    let directives = std::env::var(LOG_ENV_VAR).unwrap_or_else(|_| DEFAULT_FILTER.to_string());
    EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber. Calling it twice is harmless.
pub fn init(json: bool) {
    let _ = tracing_log::LogTracer::init();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = if json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    if installed.is_err() {
        tracing::debug!("Global subscriber already installed");
    }
}
