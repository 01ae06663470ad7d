use wzr_schema::{StepId, Warning};

/// Caller-side destination for recoverable anomalies.
pub trait WarningSink {
    fn emit(&mut self, step: &StepId, warning: &Warning);

    fn emit_all(&mut self, step: &StepId, warnings: &[Warning]) {
        for w in warnings {
            self.emit(step, w);
        }
    }
}

/// Forwards every warning to `tracing::warn!`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl WarningSink for TracingSink {
    fn emit(&mut self, step: &StepId, warning: &Warning) {
        tracing::warn!(
            step = %step,
            code = warning.code.as_str(),
            field = %warning.field,
            id = warning.id.as_deref().unwrap_or(""),
            "step data anomaly"
        );
    }
}

/// Buffers warnings in memory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CollectingSink {
    pub warnings: Vec<(StepId, Warning)>,
}

impl WarningSink for CollectingSink {
    fn emit(&mut self, step: &StepId, warning: &Warning) {
        self.warnings.push((step.clone(), warning.clone()));
    }
}
