use serde::Serialize;

use crate::gitops::PlacementWarning;

/// Non-fatal conditions collected during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PipelineWarning {
    Placement { warning: PlacementWarning },
    PushRetried { attempts: u32 },
}

impl std::fmt::Display for PipelineWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineWarning::Placement { warning } => write!(f, "{}", warning),
            PipelineWarning::PushRetried { attempts } => {
                write!(f, "push succeeded after {} attempts", attempts)
            }
        }
    }
}
