//! wzr-reconcile
//!
//! Hydration and persistence of wizard steps.
//!
//! Architectural decisions:
//! - Hydrate: collect -> merge by precedence -> normalize for the UI -> prune
//! - Persist: backend-case top-level columns -> mirrored snapshot -> fold onto accumulator
//! - Only a non-object raw record (hydrate) or a malformed accumulator
//!   (persist_json) is an error; every other anomaly is a returned warning
//! - Warnings are never logged here; callers hand them to a [`WarningSink`]
//!
//! Stateless. No IO. Identical inputs give identical outputs.

mod engine;
mod sink;
mod types;

pub use engine::ReconciliationEngine;
pub use sink::{CollectingSink, TracingSink, WarningSink};
pub use types::{Hydrated, Persisted};
