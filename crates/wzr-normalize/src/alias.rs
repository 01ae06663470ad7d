use serde_json::Value;
use wzr_schema::{id_string, FieldValue, Warning};

fn embedded_id<'a>(embedded: &'a Value, entity_id_key: &str) -> Option<&'a Value> {
    embedded
        .get(entity_id_key)
        .filter(|id| id_string(id).is_some())
}

/// Reconcile a `Reference` field with its embedded relation object.
///
/// - An embedded object's own identifier is authoritative: it fills a missing
///   reference and overrides a disagreeing one (`ID_MISMATCH`).
/// - A reference that arrived as the related object itself collapses to that
///   object's identifier.
///
/// Returns `None` only when there is nothing to keep.
pub fn align_reference(
    path: &str,
    own: Option<&FieldValue>,
    embedded: Option<&FieldValue>,
    entity_id_key: &str,
    warnings: &mut Vec<Warning>,
) -> Option<FieldValue> {
    let own = own.map(|v| match v {
        FieldValue::Scalar(Value::Object(obj)) => match obj.get(entity_id_key) {
            Some(id) => FieldValue::Scalar(id.clone()),
            None => v.clone(),
        },
        other => other.clone(),
    });

    let authoritative = embedded
        .and_then(FieldValue::as_scalar)
        .and_then(|e| embedded_id(e, entity_id_key));

    match (authoritative, own) {
        (Some(auth), Some(own)) if own.is_populated() => {
            let own_id = own.as_scalar().and_then(id_string);
            let auth_id = id_string(auth);
            if own_id != auth_id {
                if let Some(auth_id) = auth_id {
                    warnings.push(Warning::id_mismatch(path, auth_id));
                }
            }
            Some(FieldValue::Scalar(auth.clone()))
        }
        (Some(auth), _) => Some(FieldValue::Scalar(auth.clone())),
        (None, own) => own,
    }
}

/// Reconcile one `RelationList` entry.
///
/// The identifier under `id_key` is set from, in order: the embedded object's
/// own id, the entry's `id_key`, the first populated alias key. Alias keys are
/// removed. Non-object entries and entries with no identifier are returned
/// unchanged; pruning drops them.
pub fn align_relation_entry(
    path: &str,
    entry: &Value,
    id_key: &str,
    embedded: Option<&str>,
    aliases: &[String],
    entity_id_key: &str,
    warnings: &mut Vec<Warning>,
) -> Value {
    let Value::Object(map) = entry else {
        return entry.clone();
    };

    let authoritative = embedded
        .and_then(|k| map.get(k))
        .and_then(|e| embedded_id(e, entity_id_key))
        .cloned();

    let denormalized = map
        .get(id_key)
        .filter(|v| id_string(v).is_some())
        .or_else(|| {
            aliases
                .iter()
                .filter_map(|a| map.get(a))
                .find(|v| id_string(v).is_some())
        })
        .cloned();

    let chosen = match (authoritative, denormalized) {
        (Some(auth), Some(denorm)) => {
            let auth_id = id_string(&auth);
            if auth_id != id_string(&denorm) {
                if let Some(auth_id) = auth_id {
                    warnings.push(Warning::id_mismatch(path, auth_id));
                }
            }
            Some(auth)
        }
        (Some(auth), None) => Some(auth),
        (None, denorm) => denorm,
    };

    let mut out = map.clone();
    for alias in aliases.iter().filter(|a| a.as_str() != id_key) {
        out.remove(alias);
    }
    if let Some(id) = chosen {
        out.insert(id_key.to_string(), id);
    }
    Value::Object(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wzr_schema::WarningCode;

    #[test]
    fn embedded_id_fills_missing_reference() {
        let mut w = Vec::new();
        let embedded = FieldValue::scalar(json!({ "id": "c1", "name": "Acme" }));
        let out = align_reference("customerId", None, Some(&embedded), "id", &mut w);
        assert_eq!(out, Some(FieldValue::scalar("c1")));
        assert!(w.is_empty());
    }

    #[test]
    fn embedded_id_overrides_stale_copy() {
        let mut w = Vec::new();
        let own = FieldValue::scalar("c0");
        let embedded = FieldValue::scalar(json!({ "id": "c1" }));
        let out = align_reference("customerId", Some(&own), Some(&embedded), "id", &mut w);
        assert_eq!(out, Some(FieldValue::scalar("c1")));
        assert_eq!(w, vec![Warning::id_mismatch("customerId", "c1")]);
    }

    #[test]
    fn reference_given_as_object_collapses_to_id() {
        let mut w = Vec::new();
        let own = FieldValue::scalar(json!({ "id": "u7", "email": "x@y" }));
        let out = align_reference("reviewerId", Some(&own), None, "id", &mut w);
        assert_eq!(out, Some(FieldValue::scalar("u7")));
    }

    #[test]
    fn reference_without_embedded_is_kept() {
        let mut w = Vec::new();
        let own = FieldValue::scalar("u1");
        assert_eq!(
            align_reference("reviewerId", Some(&own), None, "id", &mut w),
            Some(own.clone())
        );
        assert_eq!(align_reference("reviewerId", None, None, "id", &mut w), None);
    }

    #[test]
    fn relation_entry_prefers_embedded_id() {
        let mut w = Vec::new();
        let entry = json!({ "productId": "old", "product": { "id": "p1" }, "qty": 2 });
        let out = align_relation_entry("products", &entry, "productId", Some("product"), &[], "id", &mut w);
        assert_eq!(out, json!({ "productId": "p1", "product": { "id": "p1" }, "qty": 2 }));
        assert_eq!(w.len(), 1);
        assert_eq!(w[0].code, WarningCode::IdMismatch);
    }

    #[test]
    fn relation_entry_promotes_alias_key() {
        let mut w = Vec::new();
        let aliases = vec!["product_id".to_string()];
        let entry = json!({ "product_id": "p2", "qty": 0 });
        let out = align_relation_entry("products", &entry, "productId", None, &aliases, "id", &mut w);
        assert_eq!(out, json!({ "productId": "p2", "qty": 0 }));
        assert!(w.is_empty());
    }

    #[test]
    fn alignment_is_idempotent() {
        let mut w = Vec::new();
        let aliases = vec!["product_id".to_string()];
        let entry = json!({ "product_id": "x", "product": { "id": "p1" } });
        let once = align_relation_entry("products", &entry, "productId", Some("product"), &aliases, "id", &mut w);
        let mut w2 = Vec::new();
        let twice = align_relation_entry("products", &once, "productId", Some("product"), &aliases, "id", &mut w2);
        assert_eq!(once, twice);
        assert!(w2.is_empty());
    }

    #[test]
    fn entry_without_identifier_is_unchanged() {
        let mut w = Vec::new();
        let entry = json!({ "qty": 3 });
        let out = align_relation_entry("products", &entry, "productId", None, &[], "id", &mut w);
        assert_eq!(out, entry);
    }
}
