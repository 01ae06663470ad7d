//! Command handler modules for wzr-cli.
//!
//! Shared loading helpers live here. Command-specific logic lives in the
//! submodules.

pub mod hydrate;
pub mod persist;

use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use wzr_config::{load_layered_yaml, WizardConfig};
use wzr_schema::{ReferenceSet, StepSchema};

/// Load the layered config and pick one step out of it.
pub fn load_step(config_paths: &[String], step: &str) -> Result<(WizardConfig, StepSchema)> {
    let path_refs: Vec<&str> = config_paths.iter().map(|s| s.as_str()).collect();
    let loaded = load_layered_yaml(&path_refs)?;
    let schema = loaded.config.step(step).cloned().with_context(|| {
        let known: Vec<&str> = loaded.config.step_ids().map(|s| s.as_str()).collect();
        format!("unknown --step '{step}'. known steps: {}", known.join(", "))
    })?;
    Ok((loaded.config, schema))
}

/// Read a JSON document from a file. A UTF-8 BOM is tolerated.
pub fn load_json_file(path: &str, what: &str) -> Result<Value> {
    let bytes = fs::read(path).with_context(|| format!("read {what} failed: {path}"))?;
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(&bytes);
    let raw = std::str::from_utf8(bytes).with_context(|| format!("{what} must be UTF-8 text"))?;
    let v: Value =
        serde_json::from_str(raw.trim()).with_context(|| format!("{what} must contain valid JSON"))?;
    Ok(v)
}

pub fn load_refs(path: &str) -> Result<ReferenceSet> {
    let v = load_json_file(path, "refs")?;
    let refs: ReferenceSet =
        serde_json::from_value(v).context("refs must be a JSON array of string identifiers")?;
    Ok(refs)
}
