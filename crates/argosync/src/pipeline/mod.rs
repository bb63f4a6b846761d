pub mod config;
pub mod context;
pub mod error;
pub mod progress;
pub mod report;
pub mod runner;

pub use config::PipelineConfig;
pub use context::PipelineContext;
pub use error::PipelineWarning;
pub use progress::{DeployPhase, LogProgress, NoopProgress, ProgressEvent, ProgressReporter};
pub use report::DeployReport;
pub use runner::DeployPipeline;
