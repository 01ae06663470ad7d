use anyhow::{Context, Result};
use tracing::info;
use wzr_reconcile::{ReconciliationEngine, TracingSink, WarningSink};

use super::{load_json_file, load_refs, load_step};

/// Returns the pretty-printed `{ view, warnings }` document.
pub fn run(config_paths: &[String], step: &str, record_path: &str, refs_path: &str) -> Result<String> {
    let (config, schema) = load_step(config_paths, step)?;
    let record = load_json_file(record_path, "record")?;
    let refs = load_refs(refs_path)?;

    let engine = ReconciliationEngine::new(config.layout);
    let hydrated = engine
        .hydrate(&schema, &record, &refs)
        .with_context(|| format!("hydrate step '{step}' failed"))?;

    TracingSink.emit_all(&schema.step_id, &hydrated.warnings);
    info!(step, fields = hydrated.view.len(), warnings = hydrated.warnings.len(), "hydrate done");

    serde_json::to_string_pretty(&hydrated).context("serialize hydrated view failed")
}
