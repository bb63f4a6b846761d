//! Git output parsing helpers.

use crate::process::CommandOutput;

/// Formats a git error with both stdout and stderr for better debugging.
pub fn format_git_error(output: &CommandOutput) -> String {
    let stderr = output.stderr.trim();
    let stdout = output.stdout.trim();

    match (stderr.is_empty(), stdout.is_empty()) {
        (true, true) => format!("Command failed with exit code {}", output.code()),
        (true, false) => stdout.to_string(),
        (false, true) => stderr.to_string(),
        (false, false) => format!("{}\n{}", stderr, stdout),
    }
}

/// Extracts the repository name from `owner/repo`, `repo`, or a remote URL.
pub fn repository_name(coordinate: &str) -> &str {
    let trimmed = coordinate.trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
    trimmed.rsplit(['/', ':']).next().unwrap_or(trimmed)
}
