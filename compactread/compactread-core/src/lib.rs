//! Schema, value, and decoder core for `compactread`.
//!
//! This crate provides the compact record schema IR ([`Schema`] /
//! [`FieldDef`]), the [`Value`] representation returned by reads, and
//! [`GenericRecord`], a lazily decoded view over an [`EncodedRecord`].
//! Fields are located from offsets precomputed on the schema and decoded only
//! when requested.

mod encoded;
mod error;
mod record;
mod schema;
mod value;

pub use encoded::{EncodedRecord, SCHEMA_ID_LEN};
pub use error::{DecodeError, SchemaError, ValueTypeError};
pub use record::{GenericRecord, decode};
pub use schema::{ElementDef, FieldDef, FieldType, Schema, SchemaId, Slot, format_field_defs};
pub use value::Value;
