use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::StepId;

// ---------------------------------------------------------------------------
// Step schema
// ---------------------------------------------------------------------------

/// Declared field set of one wizard step.
///
/// Every stage after ingress is driven by this declaration: undeclared keys in
/// a raw record are never read, merged or written.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StepSchema {
    pub step_id: StepId,
    pub fields: Vec<FieldSpec>,
}

impl StepSchema {
    pub fn new(step_id: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            step_id: StepId::new(step_id),
            fields,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Step-level fields mirrored into a backend top-level column.
    pub fn top_level_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.top_level.is_some())
    }
}

/// One declared field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,

    #[serde(flatten)]
    pub kind: FieldKind,

    /// Backend column mirrored at the record's top level (the `TopLevel`
    /// source, and the key written into the envelope's top-level map).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_level: Option<String>,

    /// JSON pointer into the raw record (the `Derived` source).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_from: Option<String>,

    /// UI <-> backend token table for enum-valued fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_map: Option<EnumMapping>,
}

/// Structural kind of a field. Selects the merge, normalization and pruning
/// rule applied to it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    /// Any JSON leaf, or opaque JSON.
    Scalar,

    /// Identifier of a related entity. `embedded` names a sibling field that
    /// holds the related object itself; its identifier is authoritative.
    Reference {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        embedded: Option<String>,
    },

    /// Declared nested object, merged key by key.
    Object { fields: Vec<FieldSpec> },

    /// Array taken wholesale from the highest-precedence populated source.
    List,

    /// Array of relation entries, each carrying an identifier under `id_key`.
    RelationList {
        id_key: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        embedded: Option<String>,
        /// Alternate identifier keys seen in legacy-shaped entries.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        aliases: Vec<String>,
    },
}

impl FieldSpec {
    fn with_kind(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            top_level: None,
            derived_from: None,
            enum_map: None,
        }
    }

    pub fn scalar(name: impl Into<String>) -> Self {
        Self::with_kind(name, FieldKind::Scalar)
    }

    pub fn reference(name: impl Into<String>, embedded: Option<&str>) -> Self {
        Self::with_kind(
            name,
            FieldKind::Reference {
                embedded: embedded.map(str::to_string),
            },
        )
    }

    pub fn object(name: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self::with_kind(name, FieldKind::Object { fields })
    }

    pub fn list(name: impl Into<String>) -> Self {
        Self::with_kind(name, FieldKind::List)
    }

    pub fn relation_list(name: impl Into<String>, id_key: impl Into<String>) -> Self {
        Self::with_kind(
            name,
            FieldKind::RelationList {
                id_key: id_key.into(),
                embedded: None,
                aliases: Vec::new(),
            },
        )
    }

    pub fn with_top_level(mut self, column: impl Into<String>) -> Self {
        self.top_level = Some(column.into());
        self
    }

    pub fn with_derived_from(mut self, pointer: impl Into<String>) -> Self {
        self.derived_from = Some(pointer.into());
        self
    }

    pub fn with_enum_map(mut self, map: EnumMapping) -> Self {
        self.enum_map = Some(map);
        self
    }

    /// Set the embedded relation key on a `RelationList`. No-op for other kinds.
    pub fn with_embedded(mut self, key: impl Into<String>) -> Self {
        if let FieldKind::RelationList { embedded, .. } = &mut self.kind {
            *embedded = Some(key.into());
        }
        self
    }

    /// Add an alternate identifier key on a `RelationList`. No-op for other kinds.
    pub fn with_alias(mut self, key: impl Into<String>) -> Self {
        if let FieldKind::RelationList { aliases, .. } = &mut self.kind {
            aliases.push(key.into());
        }
        self
    }

    /// Scalar-like kinds are the only ones allowed to carry a top-level or
    /// derived source.
    pub fn is_scalar_like(&self) -> bool {
        matches!(self.kind, FieldKind::Scalar | FieldKind::Reference { .. })
    }
}

// ---------------------------------------------------------------------------
// Enum mapping
// ---------------------------------------------------------------------------

/// Bidirectional token table for one field: UI token -> backend token.
///
/// Serialized as a plain map (`{ high: HIGH, low: LOW }`). The UI side is
/// unique by construction; config validation rejects tables whose backend side
/// is not (see [`EnumMapping::is_injective`]).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnumMapping {
    ui_to_backend: BTreeMap<String, String>,
}

impl EnumMapping {
    pub fn new<U, B>(pairs: impl IntoIterator<Item = (U, B)>) -> Self
    where
        U: Into<String>,
        B: Into<String>,
    {
        Self {
            ui_to_backend: pairs
                .into_iter()
                .map(|(u, b)| (u.into(), b.into()))
                .collect(),
        }
    }

    /// `(ui, backend)` pairs in UI-token order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.ui_to_backend
            .iter()
            .map(|(u, b)| (u.as_str(), b.as_str()))
    }

    pub fn len(&self) -> usize {
        self.ui_to_backend.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ui_to_backend.is_empty()
    }

    /// `true` when no two UI tokens share a backend token.
    pub fn is_injective(&self) -> bool {
        let mut seen = std::collections::BTreeSet::new();
        self.ui_to_backend.values().all(|b| seen.insert(b.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_spec_deserializes_from_flat_map() {
        let json = serde_json::json!({
            "name": "products",
            "kind": "relation_list",
            "id_key": "productId",
            "embedded": "product",
            "aliases": ["product_id"]
        });
        let spec: FieldSpec = serde_json::from_value(json).unwrap();
        assert_eq!(
            spec.kind,
            FieldKind::RelationList {
                id_key: "productId".to_string(),
                embedded: Some("product".to_string()),
                aliases: vec!["product_id".to_string()],
            }
        );
        assert_eq!(spec.top_level, None);
    }

    #[test]
    fn nested_object_kind_deserializes() {
        let json = serde_json::json!({
            "name": "smes",
            "kind": "object",
            "fields": [ { "name": "lead", "kind": "scalar" } ]
        });
        let spec: FieldSpec = serde_json::from_value(json).unwrap();
        assert_eq!(
            spec,
            FieldSpec::object("smes", vec![FieldSpec::scalar("lead")])
        );
    }

    #[test]
    fn enum_mapping_injectivity() {
        let ok = EnumMapping::new([("low", "LOW"), ("high", "HIGH")]);
        assert!(ok.is_injective());

        let bad = EnumMapping::new([("low", "LOW"), ("minimal", "LOW")]);
        assert!(!bad.is_injective());
    }

    #[test]
    fn builder_modifiers_only_touch_relation_lists() {
        let scalar = FieldSpec::scalar("title").with_alias("name");
        assert_eq!(scalar.kind, FieldKind::Scalar);

        let rel = FieldSpec::relation_list("products", "productId")
            .with_embedded("product")
            .with_alias("product_id");
        assert!(matches!(
            rel.kind,
            FieldKind::RelationList { ref embedded, ref aliases, .. }
                if embedded.as_deref() == Some("product") && aliases.len() == 1
        ));
    }
}
