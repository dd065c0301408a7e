//! Compact record schema intermediate representation.

mod fingerprint;
mod format;
mod types;

pub use format::format_field_defs;
pub use types::{ElementDef, FieldDef, FieldType, Schema, SchemaId, Slot};
