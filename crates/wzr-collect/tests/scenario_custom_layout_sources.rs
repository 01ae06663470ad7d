//! Collection under a non-default storage layout.
//!
//! - Snapshot roots follow the configured JSON pointers, including escaped
//!   tokens.
//! - Every source is reported, absent ones as empty fragments, in precedence
//!   order.

use serde_json::json;
use wzr_collect::*;
use wzr_schema::{FieldSpec, Source, StepSchema, StorageLayout};

fn layout() -> StorageLayout {
    StorageLayout {
        current_root: "/state/form~1v2".to_string(),
        legacy_root: "/legacy".to_string(),
        entity_id_key: "uid".to_string(),
    }
}

#[test]
fn scenario_escaped_root_pointer_is_followed() {
    let schema = StepSchema::new("details", vec![FieldSpec::scalar("title")]);
    let raw = json!({
        "state": { "form/v2": { "details": { "title": "current" } } },
        "legacy": { "details": { "title": "old" } }
    });

    let c = collect(&schema, &raw, &layout());
    let current = c.fragment(Source::Current).map(|f| f.data.to_json());
    let legacy = c.fragment(Source::Legacy).map(|f| f.data.to_json());
    assert_eq!(current, Some(json!({ "title": "current" })));
    assert_eq!(legacy, Some(json!({ "title": "old" })));
    assert_eq!(c.present_sources(), 2);
}

#[test]
fn scenario_default_roots_are_ignored_under_custom_layout() {
    let schema = StepSchema::new("details", vec![FieldSpec::scalar("title")]);
    let raw = json!({ "wizardData": { "details": { "title": "t" } } });

    let c = collect(&schema, &raw, &layout());
    let order: Vec<Source> = c.fragments.iter().map(|f| f.source).collect();
    assert_eq!(order, vec![Source::Current, Source::TopLevel, Source::Legacy, Source::Derived]);
    assert_eq!(c.present_sources(), 0);
}
