//! wzr-merge
//!
//! Precedence-ordered, non-destructive merge of step fragments.
//!
//! Architectural decisions:
//! - Driven by the declared step schema, never by reflecting over input shapes
//! - Declared nested objects merge key by key; every other kind takes the
//!   value of the highest-precedence fragment where it is populated
//! - Empty values (`null`, `""`, `[]`, `{}`) fill no gap and erase nothing
//! - Fragments sharing a precedence tier keep their list order (first wins)
//!
//! Pure functions. Inputs are never mutated.

use serde_json::{Map, Value};
use wzr_schema::{value_is_populated, FieldKind, FieldSpec, FieldValue, Fragment, StepData};

/// Merge `fragments` into one step view.
///
/// Fragments are ordered by [`wzr_schema::Source::rank`] with a stable sort,
/// so declared list order breaks ties within a tier.
pub fn merge_deep(fields: &[FieldSpec], fragments: &[Fragment]) -> StepData {
    let mut ordered: Vec<&Fragment> = fragments.iter().collect();
    ordered.sort_by_key(|f| f.source.rank());
    let layers: Vec<&StepData> = ordered.iter().map(|f| &f.data).collect();
    merge_layers(fields, &layers)
}

/// Merge already-ordered layers (highest precedence first).
pub fn merge_layers(fields: &[FieldSpec], layers: &[&StepData]) -> StepData {
    let mut out = StepData::new();
    for field in fields {
        if let Some(v) = merge_field(field, layers) {
            out.insert(field.name.clone(), v);
        }
    }
    out
}

fn merge_field(field: &FieldSpec, layers: &[&StepData]) -> Option<FieldValue> {
    match &field.kind {
        FieldKind::Object { fields } => {
            let nested: Vec<&StepData> = layers
                .iter()
                .filter_map(|l| l.get(&field.name).and_then(FieldValue::as_object))
                .collect();
            let merged = merge_layers(fields, &nested);
            if merged.is_empty() {
                None
            } else {
                Some(FieldValue::Object(merged))
            }
        }
        _ => {
            let mut candidates = layers
                .iter()
                .filter_map(|l| l.get(&field.name))
                .filter(|v| v.is_populated());
            let first = candidates.next()?;
            match first {
                // Opaque structured scalar: union of sub-keys, same precedence.
                FieldValue::Scalar(Value::Object(_)) => {
                    let merged = candidates.fold(first.to_json(), |acc, lower| {
                        merge_json(&acc, &lower.to_json())
                    });
                    Some(FieldValue::Scalar(merged))
                }
                other => Some(other.clone()),
            }
        }
    }
}

/// Gap-filling merge of two JSON values, `higher` taking precedence.
///
/// Objects merge key by key. Otherwise `higher` wins when it is populated, or
/// when `lower` is not populated either.
pub fn merge_json(higher: &Value, lower: &Value) -> Value {
    match (higher, lower) {
        (Value::Object(h), Value::Object(l)) => Value::Object(merge_json_maps(h, l)),
        (h, l) => {
            if value_is_populated(h) || !value_is_populated(l) {
                h.clone()
            } else {
                l.clone()
            }
        }
    }
}

/// [`merge_json`] over two objects.
pub fn merge_json_maps(higher: &Map<String, Value>, lower: &Map<String, Value>) -> Map<String, Value> {
    let mut out = lower.clone();
    for (k, hv) in higher {
        let merged = match lower.get(k) {
            Some(lv) => merge_json(hv, lv),
            None => hv.clone(),
        };
        out.insert(k.clone(), merged);
    }
    out
}
