use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable warning codes. Ordering is used to sort warnings deterministically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WarningCode {
    /// An identifier referenced an entity missing from the reference set; the
    /// entry was dropped.
    #[serde(rename = "STALE_REF")]
    StaleRef,
    /// A relation entry carried no identifier at all; the entry was dropped.
    #[serde(rename = "MISSING_ID")]
    MissingId,
    /// A denormalized identifier disagreed with the embedded entity's own
    /// identifier; the authoritative one was kept.
    #[serde(rename = "ID_MISMATCH")]
    IdMismatch,
    /// A token matched no entry of the field's enum table; passed through.
    #[serde(rename = "UNKNOWN_ENUM")]
    UnknownEnumToken,
    /// A value had the wrong shape for its declared kind; it was ignored.
    #[serde(rename = "SHAPE_MISMATCH")]
    ShapeMismatch,
}

impl WarningCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningCode::StaleRef => "STALE_REF",
            WarningCode::MissingId => "MISSING_ID",
            WarningCode::IdMismatch => "ID_MISMATCH",
            WarningCode::UnknownEnumToken => "UNKNOWN_ENUM",
            WarningCode::ShapeMismatch => "SHAPE_MISMATCH",
        }
    }
}

/// A recoverable anomaly, returned alongside a successful result.
///
/// `field` is the dotted field path within the step. `id` carries the
/// offending identifier or token when there is one.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Warning {
    pub code: WarningCode,
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl Warning {
    pub fn new(code: WarningCode, field: impl Into<String>, id: Option<String>) -> Self {
        Self {
            code,
            field: field.into(),
            id,
        }
    }

    pub fn stale_ref(field: impl Into<String>, id: impl Into<String>) -> Self {
        Self::new(WarningCode::StaleRef, field, Some(id.into()))
    }

    pub fn missing_id(field: impl Into<String>) -> Self {
        Self::new(WarningCode::MissingId, field, None)
    }

    pub fn id_mismatch(field: impl Into<String>, authoritative: impl Into<String>) -> Self {
        Self::new(WarningCode::IdMismatch, field, Some(authoritative.into()))
    }

    pub fn unknown_enum(field: impl Into<String>, token: impl Into<String>) -> Self {
        Self::new(WarningCode::UnknownEnumToken, field, Some(token.into()))
    }

    pub fn shape_mismatch(field: impl Into<String>, found: &str) -> Self {
        Self::new(WarningCode::ShapeMismatch, field, Some(found.to_string()))
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{} field={} id={}", self.code.as_str(), self.field, id),
            None => write!(f, "{} field={}", self.code.as_str(), self.field),
        }
    }
}

/// Stable ordering + de-duplication for warning lists.
pub fn finalize_warnings(mut warnings: Vec<Warning>) -> Vec<Warning> {
    warnings.sort();
    warnings.dedup();
    warnings
}

/// Dotted field path: `field_path("smes", "lead") == "smes.lead"`.
pub fn field_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}
