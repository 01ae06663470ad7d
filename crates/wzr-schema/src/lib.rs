//! wzr-schema
//!
//! Shared types for wizard step reconciliation.
//!
//! - Step schemas: the finite, declared field set of each step.
//! - The typed step-data IR ([`StepData`] / [`FieldValue`]) every stage after
//!   ingress operates on.
//! - Sources, fragments, reference sets and structured warnings.
//! - The outgoing [`PatchEnvelope`] and the two fatal error types.
//!
//! Pure data. No IO.

mod data;
mod envelope;
mod error;
mod layout;
mod refs;
mod schema;
mod source;
mod warning;

pub use data::{value_is_populated, CanonicalStepView, FieldValue, Fragment, StepData};
pub use envelope::PatchEnvelope;
pub use error::{json_kind, AccumulatorShapeError, MalformedInputError};
pub use layout::{pointer_tokens, StorageLayout};
pub use refs::{id_string, ReferenceSet};
pub use schema::{EnumMapping, FieldKind, FieldSpec, StepSchema};
pub use source::{Source, StepId};
pub use warning::{field_path, finalize_warnings, Warning, WarningCode};
