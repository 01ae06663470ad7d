use std::collections::BTreeMap;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::Source;

// ---------------------------------------------------------------------------
// Populated rule
// ---------------------------------------------------------------------------

/// A JSON value is populated unless it is null, `""`, `[]` or `{}`.
///
/// `false` and `0` are populated.
pub fn value_is_populated(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

// ---------------------------------------------------------------------------
// Typed step data
// ---------------------------------------------------------------------------

/// Value of one declared field after ingress.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    /// Present but explicitly null.
    Null,
    /// Leaf or opaque JSON (`Scalar` and `Reference` kinds).
    Scalar(Value),
    /// Declared nested object (`Object` kind).
    Object(StepData),
    /// Array (`List` and `RelationList` kinds).
    List(Vec<Value>),
}

impl FieldValue {
    pub fn scalar(v: impl Into<Value>) -> Self {
        FieldValue::Scalar(v.into())
    }

    /// See [`value_is_populated`]. A nested object is populated when at least
    /// one of its fields is.
    pub fn is_populated(&self) -> bool {
        match self {
            FieldValue::Null => false,
            FieldValue::Scalar(v) => value_is_populated(v),
            FieldValue::Object(data) => data.has_populated(),
            FieldValue::List(items) => !items.is_empty(),
        }
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            FieldValue::Scalar(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&StepData> {
        match self {
            FieldValue::Object(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Scalar(v) => v.clone(),
            FieldValue::Object(data) => Value::Object(data.to_json_map()),
            FieldValue::List(items) => Value::Array(items.clone()),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Field name -> value for one step (or one nested object).
///
/// Keys are ordered, so serialization and equality are deterministic.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StepData {
    fields: BTreeMap<String, FieldValue>,
}

/// The reconciled view handed to the form-binding layer.
pub type CanonicalStepView = StepData;

impl StepData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) -> Option<FieldValue> {
        self.fields.insert(name.into(), value)
    }

    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.fields.remove(name)
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn has_populated(&self) -> bool {
        self.fields.values().any(FieldValue::is_populated)
    }

    pub fn to_json_map(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect()
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.to_json_map())
    }
}

impl FromIterator<(String, FieldValue)> for StepData {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl Serialize for StepData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.fields.serialize(serializer)
    }
}

// ---------------------------------------------------------------------------
// Fragment
// ---------------------------------------------------------------------------

/// Partial step data attributed to exactly one [`Source`].
#[derive(Clone, Debug, PartialEq)]
pub struct Fragment {
    pub source: Source,
    pub data: StepData,
}

impl Fragment {
    pub fn new(source: Source, data: StepData) -> Self {
        Self { source, data }
    }

    /// Explicit empty fragment for a source that is missing from the record.
    pub fn absent(source: Source) -> Self {
        Self {
            source,
            data: StepData::new(),
        }
    }

    pub fn is_absent(&self) -> bool {
        self.data.is_empty()
    }
}
