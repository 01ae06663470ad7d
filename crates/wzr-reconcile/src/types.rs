use serde::Serialize;
use wzr_schema::{CanonicalStepView, PatchEnvelope, Warning};

/// Result of hydrating one step.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Hydrated {
    pub view: CanonicalStepView,
    pub warnings: Vec<Warning>,
}

/// Result of persisting one step.
#[derive(Clone, Debug, PartialEq)]
pub struct Persisted {
    pub envelope: PatchEnvelope,
    pub warnings: Vec<Warning>,
}
