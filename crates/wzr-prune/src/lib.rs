//! wzr-prune
//!
//! Drops stale relation references from a canonical step view.
//!
//! Rules, per declared field:
//! - `Reference`: an identifier missing from the reference set is removed,
//!   together with its embedded relation object (`STALE_REF`).
//! - `RelationList`: entries without an identifier (`MISSING_ID`) or with an
//!   unknown one (`STALE_REF`) are removed. A list left empty is removed.
//! - `Object`: pruned recursively. An object left empty is removed.
//! - Everything else is kept as is.
//!
//! Never fails. Each field is pruned independently of the others, so the
//! result does not depend on field order, and pruning a pruned view is a no-op.

use serde::Serialize;
use serde_json::Value;
use wzr_schema::{
    field_path, finalize_warnings, id_string, CanonicalStepView, FieldKind, FieldSpec, FieldValue,
    ReferenceSet, StepData, Warning,
};

/// Output of [`prune`].
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Pruned {
    pub view: CanonicalStepView,
    pub warnings: Vec<Warning>,
}

pub fn prune(fields: &[FieldSpec], view: &CanonicalStepView, refs: &ReferenceSet) -> Pruned {
    let mut warnings = Vec::new();
    let view = prune_data(fields, view, refs, "", &mut warnings);
    Pruned {
        view,
        warnings: finalize_warnings(warnings),
    }
}

fn prune_data(
    fields: &[FieldSpec],
    data: &StepData,
    refs: &ReferenceSet,
    prefix: &str,
    warnings: &mut Vec<Warning>,
) -> StepData {
    let mut out = data.clone();
    // Embedded siblings of stale references, dropped after every field is pruned.
    let mut dropped: Vec<&str> = Vec::new();
    for field in fields {
        let Some(value) = data.get(&field.name) else {
            continue;
        };
        let path = field_path(prefix, &field.name);

        match (&field.kind, value) {
            (FieldKind::Reference { embedded }, FieldValue::Scalar(v)) => {
                let Some(id) = id_string(v) else {
                    continue;
                };
                if !refs.contains(&id) {
                    warnings.push(Warning::stale_ref(&path, id));
                    out.remove(&field.name);
                    if let Some(embedded) = embedded {
                        dropped.push(embedded);
                    }
                }
            }
            (FieldKind::RelationList { id_key, .. }, FieldValue::List(items)) => {
                let kept: Vec<Value> = items
                    .iter()
                    .filter(|entry| keep_entry(entry, id_key, refs, &path, warnings))
                    .cloned()
                    .collect();
                if kept.is_empty() {
                    out.remove(&field.name);
                } else {
                    out.insert(field.name.clone(), FieldValue::List(kept));
                }
            }
            (FieldKind::Object { fields }, FieldValue::Object(nested)) => {
                let pruned = prune_data(fields, nested, refs, &path, warnings);
                if pruned.is_empty() {
                    out.remove(&field.name);
                } else {
                    out.insert(field.name.clone(), FieldValue::Object(pruned));
                }
            }
            _ => {}
        }
    }
    for name in dropped {
        out.remove(name);
    }
    out
}

fn keep_entry(
    entry: &Value,
    id_key: &str,
    refs: &ReferenceSet,
    path: &str,
    warnings: &mut Vec<Warning>,
) -> bool {
    match entry.get(id_key).and_then(id_string) {
        None => {
            warnings.push(Warning::missing_id(path));
            false
        }
        Some(id) if !refs.contains(&id) => {
            warnings.push(Warning::stale_ref(path, id));
            false
        }
        Some(_) => true,
    }
}
