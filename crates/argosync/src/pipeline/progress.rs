use tracing::{debug, info};

/// Stages of a deployment run, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployPhase {
    ComposingValues,
    ResolvingTools,
    Rendering,
    Cloning,
    Placing,
    Committing,
    Pushing,
}

impl DeployPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeployPhase::ComposingValues => "compose_values",
            DeployPhase::ResolvingTools => "resolve_tools",
            DeployPhase::Rendering => "render",
            DeployPhase::Cloning => "clone",
            DeployPhase::Placing => "place",
            DeployPhase::Committing => "commit",
            DeployPhase::Pushing => "push",
        }
    }
}

/// Events emitted by the pipeline during a run.
pub enum ProgressEvent {
    Phase { phase: DeployPhase, message: String },
    Completed { summary: String },
    Failed { error: String },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// No-op reporter for unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Reports progress as log lines.
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Phase { phase, message } => info!(phase = phase.as_str(), "{}", message),
            ProgressEvent::Completed { summary } => info!("{}", summary),
            // The binary prints the terminal error itself
            ProgressEvent::Failed { error } => debug!("Deployment failed: {}", error),
        }
    }
}
