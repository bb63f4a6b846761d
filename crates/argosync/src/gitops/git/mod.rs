//! Git operations against the GitOps working copy.

pub mod auth;
pub mod parse;
pub mod repository;
pub mod types;

pub use repository::GitRepository;
pub use types::*;
