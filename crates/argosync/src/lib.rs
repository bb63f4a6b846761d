pub mod actions;
pub mod config;
pub mod error;
pub mod gitops;
pub mod pipeline;
pub mod process;
pub mod render;
pub mod sanitize;
pub mod secrets;
pub mod telemetry;
pub mod tools;
pub mod values;

pub use config::{ActionInputs, DeploymentRequest, InvocationContext};
pub use error::{ConfigError, DeployError, Result, ToolError};
pub use gitops::{CommitOutcome, GitOpsError, PushPolicy};
pub use pipeline::{DeployPipeline, DeployReport, PipelineConfig};
pub use process::{CommandOutput, CommandRequest, CommandRunner, TokioCommandRunner};
pub use render::{ChartLocation, ManifestRenderer, RenderError};
pub use secrets::{resolve_secret, SecretError};
pub use values::{compose, ValuesError, ValuesInput};
