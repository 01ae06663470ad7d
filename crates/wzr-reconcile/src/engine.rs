use serde_json::Value;
use tracing::debug;
use wzr_collect::collect;
use wzr_merge::merge_deep;
use wzr_normalize::{unwrap, view_to_ui};
use wzr_prune::prune;
use wzr_schema::{
    finalize_warnings, json_kind, AccumulatorShapeError, MalformedInputError, PatchEnvelope,
    ReferenceSet, StepData, StepSchema, StorageLayout,
};
use wzr_snapshot::build_patch;

use crate::{Hydrated, Persisted};

/// Orchestrates hydration and persistence over one storage layout.
///
/// Holds no state besides the layout; every call is independent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReconciliationEngine {
    layout: StorageLayout,
}

impl ReconciliationEngine {
    pub fn new(layout: StorageLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Reconcile one step of `raw` into its canonical UI view.
    ///
    /// # Errors
    /// [`MalformedInputError`] when `raw` (after envelope unwrapping) is not an
    /// object. Every other anomaly is reported in [`Hydrated::warnings`].
    pub fn hydrate(
        &self,
        schema: &StepSchema,
        raw: &Value,
        refs: &ReferenceSet,
    ) -> Result<Hydrated, MalformedInputError> {
        let record = unwrap(raw);
        if !record.is_object() {
            return Err(MalformedInputError {
                found: json_kind(record),
            });
        }

        let collected = collect(schema, record, &self.layout);
        let sources = collected.present_sources();
        let merged = merge_deep(&schema.fields, &collected.fragments);
        let (ui_view, normalize_warnings) =
            view_to_ui(&schema.fields, &merged, &self.layout.entity_id_key);
        let pruned = prune(&schema.fields, &ui_view, refs);

        let mut warnings = collected.warnings;
        warnings.extend(normalize_warnings);
        warnings.extend(pruned.warnings);
        let warnings = finalize_warnings(warnings);

        debug!(
            step = %schema.step_id,
            sources,
            fields = pruned.view.len(),
            warnings = warnings.len(),
            "hydrated step"
        );

        Ok(Hydrated {
            view: pruned.view,
            warnings,
        })
    }

    /// Build the outgoing envelope for one step, folded onto `accumulator`.
    pub fn persist(
        &self,
        schema: &StepSchema,
        view: &StepData,
        accumulator: Option<&PatchEnvelope>,
    ) -> Persisted {
        let (envelope, warnings) = build_patch(schema, view, accumulator);

        debug!(
            step = %schema.step_id,
            steps = envelope.steps().count(),
            top_level = envelope.top_level().len(),
            warnings = warnings.len(),
            "persisted step"
        );

        Persisted { envelope, warnings }
    }

    /// [`Self::persist`] with an accumulator in its wire form.
    ///
    /// # Errors
    /// [`AccumulatorShapeError`] when `accumulator` is not a well-formed envelope.
    pub fn persist_json(
        &self,
        schema: &StepSchema,
        view: &StepData,
        accumulator: Option<&Value>,
    ) -> Result<Persisted, AccumulatorShapeError> {
        let acc = accumulator
            .map(|v| PatchEnvelope::from_json(v, &self.layout))
            .transpose()?;
        Ok(self.persist(schema, view, acc.as_ref()))
    }
}
