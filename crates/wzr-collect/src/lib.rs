//! wzr-collect
//!
//! Extracts one fragment per [`Source`] for a step from a raw record, and is
//! the only place untyped JSON is parsed into the step-data IR.
//!
//! Where each source lives in the record:
//! - `Current`: `<current_root>/<step_id>`
//! - `TopLevel`: `<field.top_level>` at the record root, per field
//! - `Legacy`: `<legacy_root>/<step_id>`
//! - `Derived`: `<field.derived_from>` pointer, per field
//!
//! Update envelopes (`{set: X}`) are unwrapped at every hop and every depth.
//! Missing sources give absent fragments. Undeclared keys are ignored. A value
//! whose shape contradicts its declared kind is skipped with `SHAPE_MISMATCH`.
//! The record is never mutated.

use serde_json::{Map, Value};
use wzr_normalize::{lookup, unwrap, unwrap_deep};
use wzr_schema::{
    field_path, json_kind, pointer_tokens, FieldKind, FieldSpec, FieldValue, Fragment,
    MalformedInputError, Source, StepData, StepSchema, StorageLayout, Warning,
};

/// Output of [`collect`]: fragments in precedence order, one per source.
#[derive(Clone, Debug, PartialEq)]
pub struct Collected {
    pub fragments: Vec<Fragment>,
    pub warnings: Vec<Warning>,
}

impl Collected {
    pub fn fragment(&self, source: Source) -> Option<&Fragment> {
        self.fragments.iter().find(|f| f.source == source)
    }

    /// Number of sources that contributed at least one field.
    pub fn present_sources(&self) -> usize {
        self.fragments.iter().filter(|f| !f.is_absent()).count()
    }
}

pub fn collect(schema: &StepSchema, raw: &Value, layout: &StorageLayout) -> Collected {
    let mut warnings = Vec::new();
    let fragments = Source::ALL
        .iter()
        .map(|&source| {
            let data = match source {
                Source::Current => snapshot_fragment(
                    schema,
                    raw,
                    &layout.current_root,
                    layout.current_tokens(),
                    &mut warnings,
                ),
                Source::Legacy => snapshot_fragment(
                    schema,
                    raw,
                    &layout.legacy_root,
                    layout.legacy_tokens(),
                    &mut warnings,
                ),
                Source::TopLevel => top_level_fragment(schema, raw, &mut warnings),
                Source::Derived => derived_fragment(schema, raw, &mut warnings),
            };
            Fragment::new(source, data)
        })
        .collect();

    Collected {
        fragments,
        warnings,
    }
}

/// Parse a caller-supplied step view (e.g. an edited form state) into the IR.
///
/// # Errors
/// [`MalformedInputError`] when `view` is not an object.
pub fn parse_view(schema: &StepSchema, view: &Value) -> Result<(StepData, Vec<Warning>), MalformedInputError> {
    let map = unwrap(view).as_object().ok_or(MalformedInputError {
        found: json_kind(view),
    })?;
    let mut warnings = Vec::new();
    let data = parse_step(&schema.fields, map, "", &mut warnings);
    Ok((data, warnings))
}

fn snapshot_fragment(
    schema: &StepSchema,
    raw: &Value,
    root: &str,
    mut tokens: Vec<String>,
    warnings: &mut Vec<Warning>,
) -> StepData {
    tokens.push(schema.step_id.to_string());
    match lookup(raw, &tokens) {
        None | Some(Value::Null) => StepData::new(),
        Some(Value::Object(map)) => parse_step(&schema.fields, map, "", warnings),
        Some(other) => {
            warnings.push(Warning::shape_mismatch(
                format!("{root}/{}", schema.step_id),
                json_kind(other),
            ));
            StepData::new()
        }
    }
}

fn top_level_fragment(schema: &StepSchema, raw: &Value, warnings: &mut Vec<Warning>) -> StepData {
    let Some(record) = unwrap(raw).as_object() else {
        return StepData::new();
    };
    let mut out = StepData::new();
    for field in &schema.fields {
        let Some(column) = field.top_level.as_deref() else {
            continue;
        };
        if let Some(v) = record.get(column) {
            if let Some(parsed) = parse_field(field, v, &field.name, warnings) {
                out.insert(field.name.clone(), parsed);
            }
        }
    }
    out
}

fn derived_fragment(schema: &StepSchema, raw: &Value, warnings: &mut Vec<Warning>) -> StepData {
    let mut out = StepData::new();
    for field in &schema.fields {
        let Some(pointer) = field.derived_from.as_deref() else {
            continue;
        };
        if let Some(v) = lookup(raw, &pointer_tokens(pointer)) {
            if let Some(parsed) = parse_field(field, v, &field.name, warnings) {
                out.insert(field.name.clone(), parsed);
            }
        }
    }
    out
}

fn parse_step(
    fields: &[FieldSpec],
    map: &Map<String, Value>,
    prefix: &str,
    warnings: &mut Vec<Warning>,
) -> StepData {
    let mut out = StepData::new();
    for field in fields {
        let Some(v) = map.get(&field.name) else {
            continue;
        };
        let path = field_path(prefix, &field.name);
        if let Some(parsed) = parse_field(field, v, &path, warnings) {
            out.insert(field.name.clone(), parsed);
        }
    }
    out
}

fn parse_field(
    field: &FieldSpec,
    v: &Value,
    path: &str,
    warnings: &mut Vec<Warning>,
) -> Option<FieldValue> {
    let v = unwrap(v);
    if v.is_null() {
        return Some(FieldValue::Null);
    }

    let mismatch = |warnings: &mut Vec<Warning>| -> Option<FieldValue> {
        warnings.push(Warning::shape_mismatch(path, json_kind(v)));
        None
    };

    match (&field.kind, v) {
        (FieldKind::Object { fields }, Value::Object(map)) => {
            Some(FieldValue::Object(parse_step(fields, map, path, warnings)))
        }
        (FieldKind::Object { .. }, _) => mismatch(warnings),
        (FieldKind::List | FieldKind::RelationList { .. }, Value::Array(items)) => {
            Some(FieldValue::List(items.iter().map(unwrap_deep).collect()))
        }
        (FieldKind::List | FieldKind::RelationList { .. }, _) => mismatch(warnings),
        (FieldKind::Reference { .. }, Value::Array(_)) => mismatch(warnings),
        _ => Some(FieldValue::Scalar(unwrap_deep(v))),
    }
}
