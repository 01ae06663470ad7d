//! Best-effort hydration.
//!
//! - Corrupt or oddly shaped sources never fail a step load; they surface as
//!   warnings next to the best available data.
//! - Hydration is idempotent and leaves the raw record untouched.
//! - Warnings reach an injected sink only when the caller forwards them.

use serde_json::json;
use wzr_reconcile::*;
use wzr_schema::{
    EnumMapping, FieldSpec, ReferenceSet, StepId, StepSchema, StorageLayout, WarningCode,
};

fn products() -> StepSchema {
    StepSchema::new(
        "products",
        vec![
            FieldSpec::relation_list("products", "productId")
                .with_embedded("product")
                .with_alias("product_id"),
            FieldSpec::scalar("deliveryMode")
                .with_top_level("delivery_mode")
                .with_enum_map(EnumMapping::new([("onsite", "ON_SITE"), ("remote", "REMOTE")])),
        ],
    )
}

fn corrupt_record() -> serde_json::Value {
    json!({
        "delivery_mode": { "set": "HYBRID" },
        "wizardState": { "steps": { "products": { "products": "p1" } } },
        "wizardData": { "products": {
            "products": [
                { "product_id": "p1" },
                { "productId": "p3" },
                { "qty": 4 },
                { "productId": "x", "product": { "id": "p2" } }
            ]
        } }
    })
}

#[test]
fn scenario_corrupt_sources_load_with_warnings() {
    let engine = ReconciliationEngine::default();
    let refs = ReferenceSet::new(["p1", "p2"]);
    let out = engine.hydrate(&products(), &corrupt_record(), &refs).unwrap();

    assert_eq!(
        out.view.to_json(),
        json!({
            "products": [
                { "productId": "p1" },
                { "productId": "p2", "product": { "id": "p2" } }
            ],
            "deliveryMode": "HYBRID"
        })
    );
    let codes: Vec<WarningCode> = out.warnings.iter().map(|w| w.code).collect();
    assert_eq!(
        codes,
        vec![
            WarningCode::StaleRef,
            WarningCode::MissingId,
            WarningCode::IdMismatch,
            WarningCode::UnknownEnumToken,
            WarningCode::ShapeMismatch,
        ]
    );
}

#[test]
fn scenario_hydrate_is_idempotent_and_pure() {
    let engine = ReconciliationEngine::new(StorageLayout::default());
    let refs = ReferenceSet::new(["p1"]);
    let raw = corrupt_record();
    let before = raw.clone();

    let a = engine.hydrate(&products(), &raw, &refs).unwrap();
    let b = engine.hydrate(&products(), &raw, &refs).unwrap();
    assert_eq!(a, b);
    assert_eq!(raw, before);
}

#[test]
fn scenario_sink_receives_forwarded_warnings() {
    let engine = ReconciliationEngine::default();
    let out = engine
        .hydrate(&products(), &corrupt_record(), &ReferenceSet::new(["p1", "p2"]))
        .unwrap();

    let mut sink = CollectingSink::default();
    let step = StepId::new("products");
    sink.emit_all(&step, &out.warnings);
    assert_eq!(sink.warnings.len(), out.warnings.len());
    assert!(sink.warnings.iter().all(|(s, _)| *s == step));
}
