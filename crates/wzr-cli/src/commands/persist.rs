use anyhow::{Context, Result};
use tracing::info;
use wzr_collect::parse_view;
use wzr_reconcile::{ReconciliationEngine, TracingSink, WarningSink};

use super::{load_json_file, load_step};

/// Returns the pretty-printed envelope in its wire form.
pub fn run(
    config_paths: &[String],
    step: &str,
    view_path: &str,
    accumulator_path: Option<&str>,
) -> Result<String> {
    let (config, schema) = load_step(config_paths, step)?;
    let raw_view = load_json_file(view_path, "view")?;
    let accumulator = accumulator_path
        .map(|p| load_json_file(p, "accumulator"))
        .transpose()?;

    let (view, parse_warnings) = parse_view(&schema, &raw_view).context("view must be a JSON object")?;

    let engine = ReconciliationEngine::new(config.layout);
    let persisted = engine
        .persist_json(&schema, &view, accumulator.as_ref())
        .context("accumulator is not a patch envelope")?;

    let mut sink = TracingSink;
    sink.emit_all(&schema.step_id, &parse_warnings);
    sink.emit_all(&schema.step_id, &persisted.warnings);

    info!(
        step,
        steps = persisted.envelope.steps().count(),
        warnings = parse_warnings.len() + persisted.warnings.len(),
        "persist done"
    );

    let wire = persisted.envelope.to_json(engine.layout());
    serde_json::to_string_pretty(&wire).context("serialize envelope failed")
}
