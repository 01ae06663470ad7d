use anyhow::{bail, Result};
use std::collections::{BTreeMap, BTreeSet};
use wzr_schema::{pointer_tokens, FieldKind, FieldSpec, StorageLayout};

use crate::WizardConfig;

/// Structural checks the engine relies on.
///
/// Each failure names its rule with a stable prefix so callers and tests can
/// grep for it.
pub fn validate(config: &WizardConfig) -> Result<()> {
    validate_layout(&config.layout)?;

    let root_keys = config.layout.root_keys();
    let mut step_ids = BTreeSet::new();
    // column -> step that declared it
    let mut columns: BTreeMap<&str, &str> = BTreeMap::new();

    for step in &config.steps {
        let id = step.step_id.as_str();
        if id.trim().is_empty() {
            bail!("CONFIG_INVALID: step_id must not be empty");
        }
        if !step_ids.insert(id) {
            bail!("CONFIG_DUPLICATE_STEP step={id}");
        }

        validate_fields(id, "", &step.fields, true)?;

        for field in &step.fields {
            if let Some(pointer) = field.derived_from.as_deref() {
                if !pointer.starts_with('/') || pointer_tokens(pointer).is_empty() {
                    bail!(
                        "CONFIG_INVALID: step={id} field={} derived_from must be a non-root JSON pointer, got '{pointer}'",
                        field.name
                    );
                }
            }

            let Some(column) = field.top_level.as_deref() else {
                continue;
            };
            if column.trim().is_empty() {
                bail!("CONFIG_INVALID: step={id} field={} top_level must not be empty", field.name);
            }
            if root_keys.iter().any(|k| k == column) {
                bail!(
                    "CONFIG_INVALID: step={id} field={} top_level '{column}' collides with a snapshot root",
                    field.name
                );
            }
            if let Some(other) = columns.insert(column, id) {
                bail!("CONFIG_DUPLICATE_TOP_LEVEL column={column} steps={other},{id}");
            }
        }
    }
    Ok(())
}

fn validate_layout(layout: &StorageLayout) -> Result<()> {
    let current = layout.current_tokens();
    let legacy = layout.legacy_tokens();
    if current.is_empty() || legacy.is_empty() {
        bail!("CONFIG_INVALID: snapshot roots must be non-root JSON pointers");
    }
    if current.starts_with(&legacy) || legacy.starts_with(&current) {
        bail!(
            "CONFIG_INVALID: current_root '{}' and legacy_root '{}' must not contain each other",
            layout.current_root,
            layout.legacy_root
        );
    }
    if layout.entity_id_key.trim().is_empty() {
        bail!("CONFIG_INVALID: entity_id_key must not be empty");
    }
    Ok(())
}

fn validate_fields(step: &str, prefix: &str, fields: &[FieldSpec], step_level: bool) -> Result<()> {
    let names: BTreeSet<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    if names.len() != fields.len() {
        let mut seen = BTreeSet::new();
        let dup = fields
            .iter()
            .map(|f| f.name.as_str())
            .find(|n| !seen.insert(*n))
            .unwrap_or_default();
        bail!("CONFIG_DUPLICATE_FIELD step={step} field={prefix}{dup}");
    }

    for field in fields {
        let path = format!("{prefix}{}", field.name);
        if field.name.trim().is_empty() {
            bail!("CONFIG_INVALID: step={step} has a field with an empty name");
        }

        let has_source = field.top_level.is_some() || field.derived_from.is_some();
        if has_source && !step_level {
            bail!("CONFIG_SOURCE_ON_NESTED step={step} field={path}");
        }
        if has_source && !field.is_scalar_like() {
            bail!("CONFIG_SOURCE_ON_NON_SCALAR step={step} field={path}");
        }

        if let Some(map) = &field.enum_map {
            if !map.is_injective() {
                bail!("CONFIG_ENUM_NOT_INJECTIVE step={step} field={path}");
            }
        }

        match &field.kind {
            FieldKind::Reference {
                embedded: Some(embedded),
            } if !names.contains(embedded.as_str()) || embedded == &field.name => {
                bail!("CONFIG_EMBEDDED_UNKNOWN step={step} field={path} embedded={embedded}");
            }
            FieldKind::Reference {
                embedded: Some(embedded),
            } if fields
                .iter()
                .any(|f| f.name == *embedded && f.kind != FieldKind::Scalar) =>
            {
                bail!("CONFIG_EMBEDDED_NOT_SCALAR step={step} field={path} embedded={embedded}");
            }
            FieldKind::RelationList { id_key, .. } if id_key.trim().is_empty() => {
                bail!("CONFIG_INVALID: step={step} field={path} id_key must not be empty");
            }
            FieldKind::Object { fields } => {
                validate_fields(step, &format!("{path}."), fields, false)?;
            }
            _ => {}
        }
    }
    Ok(())
}
