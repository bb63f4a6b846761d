//! Push with bounded exponential backoff.

use std::time::Duration;

use super::error::{GitOpsError, Result};
use super::git::{GitRepository, PushReport};

/// Maximum number of push attempts.
const MAX_ATTEMPTS: u32 = 5;

/// Base delay in seconds; doubles after every failed attempt.
const RETRY_BASE_DELAY_SECS: u64 = 2;

/// Retry schedule for [`push_with_retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for PushPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            base_delay: Duration::from_secs(RETRY_BASE_DELAY_SECS),
        }
    }
}

impl PushPolicy {
    /// Delay after the failed `attempt` (1-based): base, 2x base, 4x base...
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * (1u32 << (attempt.saturating_sub(1)).min(16))
    }
}

/// Pushes `branch` (or `HEAD`) to `origin`, retrying every failure until
/// the policy is exhausted.
///
/// No fetch or rebase happens between attempts, so a rejection caused by
/// a concurrent writer repeats until the attempts run out.
pub async fn push_with_retry(
    repo: &GitRepository,
    branch: Option<&str>,
    policy: &PushPolicy,
) -> Result<PushReport> {
    let target = branch.unwrap_or("HEAD");
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match repo.push(target).await {
            Ok(()) => {
                log::info!("Pushed {} on attempt {}", target, attempt);
                return Ok(PushReport {
                    target: target.to_string(),
                    attempts: attempt,
                });
            }
            Err(e) if attempt < max_attempts => {
                let delay = policy.delay_after(attempt);
                let kind = if e.is_retryable() {
                    "retryable"
                } else {
                    "possibly permanent"
                };
                log::warn!(
                    "Push attempt {}/{} failed ({}): {}. Retrying in {}s",
                    attempt,
                    max_attempts,
                    kind,
                    e,
                    delay.as_secs()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                log::error!("Push failed after {} attempts: {}", attempt, e);
                return Err(GitOpsError::PushFailed {
                    attempts: attempt,
                    last: Box::new(e),
                });
            }
        }
    }
}
