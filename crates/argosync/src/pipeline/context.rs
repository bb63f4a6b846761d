use crate::gitops::{BranchCheckout, PlacementReport, PushReport};

use super::error::PipelineWarning;

/// Results accumulated while a run progresses.
#[derive(Debug, Default)]
pub struct PipelineContext {
    pub checkout: Option<BranchCheckout>,
    pub placement: Option<PlacementReport>,
    pub push: Option<PushReport>,

    // Non-fatal warnings
    pub warnings: Vec<PipelineWarning>,
}
