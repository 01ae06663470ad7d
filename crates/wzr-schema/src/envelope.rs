//! Outgoing patch envelope.
//!
//! # Shape
//! - Per step: one snapshot, mirrored verbatim under the current root and the
//!   legacy root.
//! - A flat map of backend-cased top-level overrides.
//!
//! # Invariants
//! - **Mirror**: current and legacy hold the same step set with identical
//!   snapshots. Held by construction ([`PatchEnvelope::put_step`] writes both);
//!   [`PatchEnvelope::from_json`] rejects inputs that break it.
//! - **Immutable values**: nothing in this workspace mutates an envelope it
//!   was handed; writers clone and return a fresh one.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::{json_kind, AccumulatorShapeError, StepId, StorageLayout};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PatchEnvelope {
    current: BTreeMap<StepId, Map<String, Value>>,
    legacy: BTreeMap<StepId, Map<String, Value>>,
    top_level: BTreeMap<String, Value>,
}

impl PatchEnvelope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty() && self.top_level.is_empty()
    }

    /// Steps present in the envelope (sorted).
    pub fn steps(&self) -> impl Iterator<Item = &StepId> {
        self.current.keys()
    }

    pub fn current(&self, step: &StepId) -> Option<&Map<String, Value>> {
        self.current.get(step)
    }

    pub fn legacy(&self, step: &StepId) -> Option<&Map<String, Value>> {
        self.legacy.get(step)
    }

    pub fn top_level(&self) -> &BTreeMap<String, Value> {
        &self.top_level
    }

    pub fn top_level_value(&self, key: &str) -> Option<&Value> {
        self.top_level.get(key)
    }

    /// Write `snapshot` under both roots for `step`, replacing any previous one.
    pub fn put_step(&mut self, step: StepId, snapshot: Map<String, Value>) {
        self.legacy.insert(step.clone(), snapshot.clone());
        self.current.insert(step, snapshot);
    }

    pub fn put_top_level(&mut self, key: impl Into<String>, value: Value) {
        self.top_level.insert(key.into(), value);
    }

    // -----------------------------------------------------------------------
    // Wire form
    // -----------------------------------------------------------------------

    /// Render the PATCH body: top-level overrides flattened at the root,
    /// snapshots nested under the layout's two roots.
    ///
    /// The result is also a valid raw record for hydration.
    pub fn to_json(&self, layout: &StorageLayout) -> Value {
        let mut out = Map::new();
        for (k, v) in &self.top_level {
            out.insert(k.clone(), v.clone());
        }
        insert_at(&mut out, &layout.current_tokens(), steps_map(&self.current));
        insert_at(&mut out, &layout.legacy_tokens(), steps_map(&self.legacy));
        Value::Object(out)
    }

    /// Parse an accumulator previously produced by [`PatchEnvelope::to_json`].
    ///
    /// # Errors
    /// [`AccumulatorShapeError`] when the value is not an object, a root or a
    /// snapshot is not an object, the mirror invariant is broken, or a
    /// top-level override is an object.
    pub fn from_json(value: &Value, layout: &StorageLayout) -> Result<Self, AccumulatorShapeError> {
        let map = value
            .as_object()
            .ok_or(AccumulatorShapeError::NotAnObject {
                found: json_kind(value),
            })?;

        let current = read_root(value, &layout.current_root, &layout.current_tokens())?;
        let legacy = read_root(value, &layout.legacy_root, &layout.legacy_tokens())?;

        for (step, snap) in &current {
            match legacy.get(step) {
                None => {
                    return Err(AccumulatorShapeError::MirrorMissing {
                        step: step.to_string(),
                        present: layout.current_root.clone(),
                    })
                }
                Some(mirror) if mirror != snap => {
                    return Err(AccumulatorShapeError::MirrorDiverged {
                        step: step.to_string(),
                    })
                }
                Some(_) => {}
            }
        }
        if let Some(step) = legacy.keys().find(|s| !current.contains_key(*s)) {
            return Err(AccumulatorShapeError::MirrorMissing {
                step: step.to_string(),
                present: layout.legacy_root.clone(),
            });
        }

        let root_keys = layout.root_keys();
        let mut top_level = BTreeMap::new();
        for (k, v) in map {
            if root_keys.contains(k) {
                continue;
            }
            if v.is_object() {
                return Err(AccumulatorShapeError::NonScalarTopLevel { key: k.clone() });
            }
            top_level.insert(k.clone(), v.clone());
        }

        Ok(Self {
            current,
            legacy,
            top_level,
        })
    }
}

fn steps_map(steps: &BTreeMap<StepId, Map<String, Value>>) -> Map<String, Value> {
    steps
        .iter()
        .map(|(id, snap)| (id.to_string(), Value::Object(snap.clone())))
        .collect()
}

fn insert_at(map: &mut Map<String, Value>, tokens: &[String], entries: Map<String, Value>) {
    match tokens.split_first() {
        None => {
            for (k, v) in entries {
                map.insert(k, v);
            }
        }
        Some((head, rest)) => {
            let slot = map
                .entry(head.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(inner) = slot {
                insert_at(inner, rest, entries);
            }
        }
    }
}

fn read_root(
    value: &Value,
    root: &str,
    tokens: &[String],
) -> Result<BTreeMap<StepId, Map<String, Value>>, AccumulatorShapeError> {
    let mut node = value;
    for t in tokens {
        match node.get(t) {
            Some(next) => node = next,
            None => return Ok(BTreeMap::new()),
        }
    }
    let steps = node
        .as_object()
        .ok_or_else(|| AccumulatorShapeError::RootNotAnObject {
            root: root.to_string(),
            found: json_kind(node),
        })?;

    let mut out = BTreeMap::new();
    for (step, snap) in steps {
        let snap = snap
            .as_object()
            .ok_or_else(|| AccumulatorShapeError::StepNotAnObject {
                step: step.clone(),
                root: root.to_string(),
                found: json_kind(snap),
            })?;
        out.insert(StepId::new(step.as_str()), snap.clone());
    }
    Ok(out)
}
