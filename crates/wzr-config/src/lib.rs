//! wzr-config
//!
//! Layered YAML registry of wizard step schemas.
//!
//! Documents are merged in order (later layers override, objects merge
//! key-wise, lists replace), canonicalized, hashed, then deserialized and
//! validated. Validation failures carry stable `CONFIG_*` prefixes.

mod validate;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use wzr_schema::{StepId, StepSchema, StorageLayout};

pub use validate::validate;

/// Every step the wizard declares, plus where snapshots are stored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WizardConfig {
    #[serde(default)]
    pub layout: StorageLayout,
    #[serde(default)]
    pub steps: Vec<StepSchema>,
}

impl WizardConfig {
    pub fn step(&self, id: &str) -> Option<&StepSchema> {
        self.steps.iter().find(|s| s.step_id.as_str() == id)
    }

    pub fn step_ids(&self) -> impl Iterator<Item = &StepId> {
        self.steps.iter().map(|s| &s.step_id)
    }
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
    pub config: WizardConfig,
}

pub fn load_layered_yaml(paths: &[&str]) -> Result<LoadedConfig> {
    let mut docs: Vec<String> = Vec::new();
    for p in paths {
        let raw =
            fs::read_to_string(p).with_context(|| format!("failed to read yaml path: {p}"))?;
        docs.push(raw);
    }

    let doc_refs: Vec<&str> = docs.iter().map(|s| s.as_str()).collect();
    load_layered_yaml_from_strings(&doc_refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    // Earlier docs are base, later docs override.
    let mut merged = serde_json::json!({});
    for raw in yaml_docs {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        merged = deep_merge(merged, v_json);
    }

    let canonical_json = canonicalize_json(&merged)?;
    let config_hash = sha256_hex(canonical_json.as_bytes());

    let config: WizardConfig = serde_json::from_value(merged.clone())
        .context("CONFIG_INVALID: document does not match the wizard schema")?;
    validate(&config)?;

    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
        config,
    })
}

fn deep_merge(a: Value, b: Value) -> Value {
    match (a, b) {
        (Value::Object(mut a_map), Value::Object(b_map)) => {
            for (k, b_val) in b_map {
                let a_val = a_map.remove(&k).unwrap_or(Value::Null);
                a_map.insert(k, deep_merge(a_val, b_val));
            }
            Value::Object(a_map)
        }
        (_, b_other) => b_other,
    }
}

fn canonicalize_json(v: &Value) -> Result<String> {
    // serde_json::Map is key-sorted, so compact serialization is canonical.
    let s = serde_json::to_string(v).context("canonical json serialize failed")?;
    Ok(s)
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let out = hasher.finalize();
    hex::encode(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wzr_schema::FieldKind;

    const BASE: &str = r#"
steps:
  - step_id: details
    fields:
      - name: title
        kind: scalar
      - name: priority
        kind: scalar
        top_level: priority
        enum_map: { low: LOW, high: HIGH }
"#;

    #[test]
    fn loads_steps_with_default_layout() {
        let loaded = load_layered_yaml_from_strings(&[BASE]).unwrap();
        assert_eq!(loaded.config.layout, StorageLayout::default());
        let details = loaded.config.step("details").unwrap();
        assert_eq!(details.fields.len(), 2);
        assert_eq!(details.fields[0].kind, FieldKind::Scalar);
        assert_eq!(details.fields[1].top_level.as_deref(), Some("priority"));
        assert!(loaded.config.step("missing").is_none());
        assert_eq!(loaded.config_hash.len(), 64);
    }

    #[test]
    fn overlay_overrides_layout_key_wise() {
        let overlay = r#"
layout:
  legacy_root: /legacy/wizard
"#;
        let loaded = load_layered_yaml_from_strings(&[BASE, overlay]).unwrap();
        assert_eq!(loaded.config.layout.legacy_root, "/legacy/wizard");
        assert_eq!(loaded.config.layout.current_root, "/wizardState/steps");
        assert!(loaded.config.step("details").is_some());
    }

    #[test]
    fn unknown_top_level_key_is_rejected() {
        let err = load_layered_yaml_from_strings(&[BASE, "surprise: 1\n"]).unwrap_err();
        assert!(format!("{err:#}").contains("CONFIG_INVALID"));
    }

    #[test]
    fn invalid_yaml_is_an_error() {
        assert!(load_layered_yaml_from_strings(&["steps: [\n"]).is_err());
    }
}
