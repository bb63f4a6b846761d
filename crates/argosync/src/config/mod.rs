//! Action inputs and their validation into a [`DeploymentRequest`].

pub mod context;
pub mod inputs;
pub mod request;
pub mod validation;

pub use context::InvocationContext;
pub use inputs::ActionInputs;
pub use request::{DeploymentRequest, DEFAULT_BRANCH, DEFAULT_HELM_VERSION, DEFAULT_MANIFESTS_PATH};
