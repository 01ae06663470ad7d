//! wzr-normalize
//!
//! Field-level value transforms between backend storage and the UI.
//!
//! - Update-envelope unwrapping (`{set: X}` -> `X`), the single ingress
//!   primitive used by the collector.
//! - Enum casing per field table, both directions. Unknown tokens pass
//!   through with an `UNKNOWN_ENUM` warning.
//! - ID aliasing between embedded relation objects and their denormalized
//!   identifier copies. The embedded entity's own id wins.
//!
//! Pure, total functions. Warnings are pushed into a caller-owned `Vec`.

mod alias;
mod enums;
mod raw;
mod view;

pub use alias::{align_reference, align_relation_entry};
pub use enums::{to_backend, value_to_ui};
pub use raw::{lookup, unwrap, unwrap_deep, Raw};
pub use view::{field_to_ui, view_to_ui};
