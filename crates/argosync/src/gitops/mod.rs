//! Publishing to the GitOps repository.
//!
//! This module covers everything after rendering:
//! - Cloning the GitOps repository into an owned working copy
//! - Placing the pointer manifest and the application manifests
//! - Committing only when the staged diff is non-empty
//! - Pushing with bounded exponential backoff

pub mod committer;
pub mod error;
pub mod git;
pub mod layout;
pub mod placement;
pub mod push;
pub mod workspace;

pub use committer::{commit_changes, commit_message};
pub use error::{GitOpsError, Result};
pub use git::repository::CommitIdentity;
pub use git::types::*;
pub use git::GitRepository;
pub use layout::GitOpsLayout;
pub use placement::{place, PlacementReport, PlacementRequest, PlacementWarning};
pub use push::{push_with_retry, PushPolicy};
pub use workspace::WorkingCopy;
