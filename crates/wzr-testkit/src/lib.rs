//! Shared fixtures for cross-crate wizard scenarios.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use wzr_config::{load_layered_yaml_from_strings, LoadedConfig};
use wzr_reconcile::ReconciliationEngine;
use wzr_schema::{pointer_tokens, PatchEnvelope, ReferenceSet, StepSchema, StorageLayout};

/// Project-intake wizard: `details`, `team`, `products`.
pub const SAMPLE_WIZARD_YAML: &str = include_str!("../fixtures/wizard.yaml");

pub fn sample_config() -> Result<LoadedConfig> {
    load_layered_yaml_from_strings(&[SAMPLE_WIZARD_YAML]).context("load sample wizard config")
}

pub fn sample_step(id: &str) -> Result<StepSchema> {
    let loaded = sample_config()?;
    loaded
        .config
        .step(id)
        .cloned()
        .with_context(|| format!("sample wizard has no step '{id}'"))
}

pub fn sample_engine() -> Result<ReconciliationEngine> {
    Ok(ReconciliationEngine::new(sample_config()?.config.layout))
}

pub fn refs(ids: &[&str]) -> ReferenceSet {
    ReferenceSet::new(ids.iter().copied())
}

/// The raw record a backend would hold after applying `envelope` to an empty row.
pub fn record_from_envelope(envelope: &PatchEnvelope, layout: &StorageLayout) -> Value {
    envelope.to_json(layout)
}

/// Builds raw records with step data at the layout's roots.
#[derive(Debug, Clone, Default)]
pub struct RecordBuilder {
    layout: StorageLayout,
    record: Map<String, Value>,
}

impl RecordBuilder {
    pub fn new(layout: StorageLayout) -> Self {
        Self {
            layout,
            record: Map::new(),
        }
    }

    pub fn current(self, step: &str, snapshot: Value) -> Self {
        let pointer = format!("{}/{step}", self.layout.current_root);
        self.at(&pointer, snapshot)
    }

    pub fn legacy(self, step: &str, snapshot: Value) -> Self {
        let pointer = format!("{}/{step}", self.layout.legacy_root);
        self.at(&pointer, snapshot)
    }

    pub fn top_level(mut self, column: &str, value: Value) -> Self {
        self.record.insert(column.to_string(), value);
        self
    }

    /// Place `value` at an arbitrary JSON pointer, creating objects on the way.
    pub fn at(mut self, pointer: &str, value: Value) -> Self {
        let tokens = pointer_tokens(pointer);
        insert_path(&mut self.record, &tokens, value);
        self
    }

    pub fn build(self) -> Value {
        Value::Object(self.record)
    }

    /// The record wrapped in a `{set: ...}` update envelope.
    pub fn build_wrapped(self) -> Value {
        serde_json::json!({ "set": self.build() })
    }
}

fn insert_path(map: &mut Map<String, Value>, tokens: &[String], value: Value) {
    let Some((head, rest)) = tokens.split_first() else {
        return;
    };
    if rest.is_empty() {
        map.insert(head.clone(), value);
        return;
    }
    let slot = map
        .entry(head.clone())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    if let Value::Object(inner) = slot {
        insert_path(inner, rest, value);
    }
}
