//! wzr-snapshot
//!
//! Builds outgoing patch envelopes.
//!
//! - The step view is written unmodified (UI casing) under the current root and
//!   mirrored under the legacy root.
//! - Declared top-level columns receive backend-cased copies of their fields.
//! - An accumulator is folded with the new contribution: the same step
//!   deep-merges (newer wins where populated), other steps are untouched.
//!   Top-level columns fold by the same rule so they agree with the snapshots.
//!
//! Envelopes are values. The accumulator is read, never written.

use std::collections::BTreeMap;

use serde_json::Value;
use wzr_merge::{merge_json, merge_json_maps};
use wzr_normalize::to_backend;
use wzr_schema::{finalize_warnings, FieldValue, PatchEnvelope, StepData, StepSchema, Warning};

/// Backend-cased values for the step's declared top-level columns.
///
/// Fields absent from the view are skipped; an explicit null is written as
/// null so a cleared field also clears its column.
pub fn backend_scalars(schema: &StepSchema, view: &StepData) -> (BTreeMap<String, Value>, Vec<Warning>) {
    let mut warnings = Vec::new();
    let mut out = BTreeMap::new();
    for field in schema.top_level_fields() {
        let (Some(column), Some(value)) = (field.top_level.as_deref(), view.get(&field.name)) else {
            continue;
        };
        let backend = match value {
            FieldValue::Null => Value::Null,
            FieldValue::Scalar(v) => to_backend(v, field, &field.name, &mut warnings),
            other => other.to_json(),
        };
        out.insert(column.to_string(), backend);
    }
    (out, warnings)
}

/// Envelope holding this step's contribution, folded onto `accumulator`.
pub fn build_patch(
    schema: &StepSchema,
    view: &StepData,
    accumulator: Option<&PatchEnvelope>,
) -> (PatchEnvelope, Vec<Warning>) {
    let mut contribution = PatchEnvelope::new();
    contribution.put_step(schema.step_id.clone(), view.to_json_map());

    let (scalars, warnings) = backend_scalars(schema, view);
    for (column, value) in scalars {
        contribution.put_top_level(column, value);
    }

    let envelope = match accumulator {
        Some(acc) => merge_envelopes(acc, &contribution),
        None => contribution,
    };
    (envelope, finalize_warnings(warnings))
}

/// Fold `newer` onto `older`.
///
/// Steps present in both deep-merge with `newer` taking precedence where it is
/// populated. Top-level columns follow the same rule: an empty newer column
/// keeps the older value, matching the snapshot it was derived from.
pub fn merge_envelopes(older: &PatchEnvelope, newer: &PatchEnvelope) -> PatchEnvelope {
    let mut out = older.clone();
    for step in newer.steps() {
        let Some(snapshot) = newer.current(step) else {
            continue;
        };
        let merged = match older.current(step) {
            Some(previous) => merge_json_maps(snapshot, previous),
            None => snapshot.clone(),
        };
        out.put_step(step.clone(), merged);
    }
    for (column, value) in newer.top_level() {
        let merged = match older.top_level_value(column) {
            Some(previous) => merge_json(value, previous),
            None => value.clone(),
        };
        out.put_top_level(column.clone(), merged);
    }
    out
}
