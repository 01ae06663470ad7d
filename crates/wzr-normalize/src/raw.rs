use serde_json::Value;

/// A value as it may arrive from the data-access layer: either plain, or
/// wrapped in a Prisma-style update envelope.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Raw<'a> {
    Plain(&'a Value),
    Set(&'a Value),
}

impl<'a> Raw<'a> {
    /// An object whose only key is `set` is an update envelope.
    pub fn classify(v: &'a Value) -> Self {
        match v {
            Value::Object(map) if map.len() == 1 => match map.get("set") {
                Some(inner) => Raw::Set(inner),
                None => Raw::Plain(v),
            },
            _ => Raw::Plain(v),
        }
    }

    /// Peel every envelope layer.
    pub fn peel(self) -> &'a Value {
        let mut cur = self;
        loop {
            match cur {
                Raw::Plain(v) => return v,
                Raw::Set(inner) => cur = Raw::classify(inner),
            }
        }
    }
}

/// `{set: {set: X}}` -> `X`; anything else unchanged.
pub fn unwrap(v: &Value) -> &Value {
    Raw::classify(v).peel()
}

/// Owned copy of `v` with envelopes removed at every depth.
pub fn unwrap_deep(v: &Value) -> Value {
    match unwrap(v) {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, inner)| (k.clone(), unwrap_deep(inner)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(unwrap_deep).collect()),
        other => other.clone(),
    }
}

/// Walk `tokens` from `root`, unwrapping envelopes at every hop.
pub fn lookup<'a>(root: &'a Value, tokens: &[String]) -> Option<&'a Value> {
    let mut node = unwrap(root);
    for t in tokens {
        node = match node {
            Value::Object(map) => unwrap(map.get(t)?),
            Value::Array(items) => unwrap(items.get(t.parse::<usize>().ok()?)?),
            _ => return None,
        };
    }
    Some(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unwrap_peels_nested_envelopes() {
        let v = json!({ "set": { "set": "HIGH" } });
        assert_eq!(unwrap(&v), &json!("HIGH"));
    }

    #[test]
    fn object_with_other_keys_is_not_an_envelope() {
        let v = json!({ "set": 1, "other": 2 });
        assert_eq!(Raw::classify(&v), Raw::Plain(&v));
    }

    #[test]
    fn unwrap_deep_leaves_no_partial_envelopes() {
        let v = json!({
            "set": {
                "lead": { "set": "u1" },
                "items": [ { "set": { "productId": { "set": "p1" } } } ]
            }
        });
        assert_eq!(
            unwrap_deep(&v),
            json!({ "lead": "u1", "items": [ { "productId": "p1" } ] })
        );
    }

    #[test]
    fn lookup_unwraps_every_hop() {
        let record = json!({
            "wizardState": { "set": { "steps": { "details": { "set": { "title": "x" } } } } }
        });
        let tokens = vec![
            "wizardState".to_string(),
            "steps".to_string(),
            "details".to_string(),
        ];
        assert_eq!(lookup(&record, &tokens), Some(&json!({ "title": "x" })));
        assert_eq!(lookup(&record, &["missing".to_string()]), None);
    }

    #[test]
    fn lookup_indexes_arrays() {
        let record = json!({ "owners": [ { "id": "u1" }, { "id": "u2" } ] });
        let tokens = vec!["owners".to_string(), "1".to_string(), "id".to_string()];
        assert_eq!(lookup(&record, &tokens), Some(&json!("u2")));
    }
}
