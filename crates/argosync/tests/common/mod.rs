//! Shared test utilities for argosync integration tests.
//!
//! This module provides:
//! - `TestHarness` for isolated runs with temp directories and a fake chart
//! - `InputsBuilder` for assembling action inputs programmatically
//! - Helpers that script `git` and `helm` on a `ScriptedRunner`

pub mod builders;
pub mod harness;

pub use builders::*;
pub use harness::TestHarness;
