//! Fatal error types.
//!
//! Only structural conditions are errors: a raw record that is not an object,
//! and an accumulator that does not have the envelope's shape. Everything else
//! degrades to a [`crate::Warning`].

use serde_json::Value;
use thiserror::Error;

/// The raw record handed to hydration is not object-like at its top level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed raw record: expected an object at the top level, found {found}")]
pub struct MalformedInputError {
    pub found: &'static str,
}

/// An accumulator does not conform to the patch envelope shape. Caller bug.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccumulatorShapeError {
    #[error("accumulator must be an object, found {found}")]
    NotAnObject { found: &'static str },

    #[error("accumulator root '{root}' must be an object keyed by step id, found {found}")]
    RootNotAnObject { root: String, found: &'static str },

    #[error("accumulator snapshot for step '{step}' under '{root}' must be an object, found {found}")]
    StepNotAnObject {
        step: String,
        root: String,
        found: &'static str,
    },

    #[error("step '{step}' is present under '{present}' but missing from the mirror root")]
    MirrorMissing { step: String, present: String },

    #[error("step '{step}' snapshots differ between the current and legacy roots")]
    MirrorDiverged { step: String },

    #[error("top-level override '{key}' must not be an object")]
    NonScalarTopLevel { key: String },
}

/// Short JSON type name for error messages.
pub fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
