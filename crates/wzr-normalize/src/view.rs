use wzr_schema::{field_path, FieldKind, FieldSpec, FieldValue, StepData, Warning};

use crate::{align_reference, align_relation_entry, value_to_ui};

/// Normalize a merged step view for the UI: enum casing and ID aliasing for
/// every declared field, recursing into nested objects. Undeclared keys are
/// carried over untouched.
pub fn view_to_ui(
    fields: &[FieldSpec],
    data: &StepData,
    entity_id_key: &str,
) -> (StepData, Vec<Warning>) {
    let mut warnings = Vec::new();
    let out = data_to_ui(fields, data, "", entity_id_key, &mut warnings);
    (out, warnings)
}

fn data_to_ui(
    fields: &[FieldSpec],
    data: &StepData,
    prefix: &str,
    entity_id_key: &str,
    warnings: &mut Vec<Warning>,
) -> StepData {
    let mut out = data.clone();
    for field in fields {
        let path = field_path(prefix, &field.name);

        let value = match &field.kind {
            FieldKind::Reference { embedded } => {
                let embedded = embedded.as_deref().and_then(|e| data.get(e));
                align_reference(&path, data.get(&field.name), embedded, entity_id_key, warnings)
            }
            _ => data.get(&field.name).cloned(),
        };

        if let Some(v) = value {
            let normalized = field_to_ui(&v, field, &path, entity_id_key, warnings);
            out.insert(field.name.clone(), normalized);
        }
    }
    out
}

/// `to_ui` for a single field value.
pub fn field_to_ui(
    value: &FieldValue,
    field: &FieldSpec,
    path: &str,
    entity_id_key: &str,
    warnings: &mut Vec<Warning>,
) -> FieldValue {
    match (value, &field.kind) {
        (FieldValue::Null, _) => FieldValue::Null,
        (FieldValue::Object(data), FieldKind::Object { fields }) => {
            FieldValue::Object(data_to_ui(fields, data, path, entity_id_key, warnings))
        }
        (
            FieldValue::List(items),
            FieldKind::RelationList {
                id_key,
                embedded,
                aliases,
            },
        ) => FieldValue::List(
            items
                .iter()
                .map(|entry| {
                    align_relation_entry(
                        path,
                        entry,
                        id_key,
                        embedded.as_deref(),
                        aliases,
                        entity_id_key,
                        warnings,
                    )
                })
                .collect(),
        ),
        (FieldValue::List(items), _) => FieldValue::List(
            items
                .iter()
                .map(|item| value_to_ui(item, field, path, warnings))
                .collect(),
        ),
        (FieldValue::Scalar(v), _) => FieldValue::Scalar(value_to_ui(v, field, path, warnings)),
        (other, _) => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wzr_schema::EnumMapping;

    fn fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::scalar("priority")
                .with_enum_map(EnumMapping::new([("high", "HIGH"), ("low", "LOW")])),
            FieldSpec::reference("customerId", Some("customer")),
            FieldSpec::scalar("customer"),
            FieldSpec::object(
                "smes",
                vec![FieldSpec::scalar("tier")
                    .with_enum_map(EnumMapping::new([("gold", "GOLD")]))],
            ),
        ]
    }

    #[test]
    fn normalizes_nested_and_aliased_fields() {
        let data = StepData::new()
            .with("priority", FieldValue::scalar("HIGH"))
            .with("customer", FieldValue::scalar(json!({ "id": "c1" })))
            .with(
                "smes",
                FieldValue::Object(StepData::new().with("tier", FieldValue::scalar("GOLD"))),
            )
            .with("untracked", FieldValue::scalar("HIGH"));

        let (out, warnings) = view_to_ui(&fields(), &data, "id");
        assert!(warnings.is_empty());
        assert_eq!(
            out.to_json(),
            json!({
                "priority": "high",
                "customerId": "c1",
                "customer": { "id": "c1" },
                "smes": { "tier": "gold" },
                "untracked": "HIGH"
            })
        );
    }

    #[test]
    fn view_to_ui_is_idempotent() {
        let data = StepData::new()
            .with("priority", FieldValue::scalar("LOW"))
            .with("customerId", FieldValue::scalar("c0"))
            .with("customer", FieldValue::scalar(json!({ "id": "c1" })));

        let (once, first) = view_to_ui(&fields(), &data, "id");
        let (twice, second) = view_to_ui(&fields(), &once, "id");
        assert_eq!(once, twice);
        assert_eq!(first, vec![Warning::id_mismatch("customerId", "c1")]);
        assert!(second.is_empty());
    }

    #[test]
    fn nested_unknown_token_reports_dotted_path() {
        let data = StepData::new().with(
            "smes",
            FieldValue::Object(StepData::new().with("tier", FieldValue::scalar("PLATINUM"))),
        );
        let (_, warnings) = view_to_ui(&fields(), &data, "id");
        assert_eq!(warnings, vec![Warning::unknown_enum("smes.tier", "PLATINUM")]);
    }
}
