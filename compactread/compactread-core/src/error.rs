//! Error types for schema construction and record decoding.

use crate::schema::SchemaId;

/// Error returned when a [`Schema`](crate::Schema) definition is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("schema type name must not be empty")]
    EmptyTypeName,

    /// Field names must be addressable from a dotted field path.
    #[error("invalid field name '{name}' in '{type_name}': {reason}")]
    InvalidFieldName {
        type_name: String,
        name: String,
        reason: &'static str,
    },

    #[error("duplicate field '{name}' in '{type_name}'")]
    DuplicateField { type_name: String, name: String },

    #[error("field '{name}' in '{type_name}' is an array of arrays, which is not supported")]
    NestedArray { type_name: String, name: String },
}

/// Error returned by [`GenericRecord`](crate::GenericRecord) accessors and
/// [`decode`](crate::decode).
///
/// An absent value is never an error; accessors return `Ok(None)` for it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The requested field name is not part of the record's schema.
    #[error("unknown field '{field}' in '{type_name}'")]
    UnknownField { type_name: String, field: String },

    /// The accessor used disagrees with the type declared in the schema.
    #[error("field '{field}' in '{type_name}' is {actual}, not {expected}")]
    TypeMismatch {
        type_name: String,
        field: String,
        expected: &'static str,
        actual: &'static str,
    },

    /// Array element index outside `[0, len)`.
    #[error("index {index} is out of bounds for array field '{field}' of length {len}")]
    IndexOutOfBounds {
        field: String,
        index: usize,
        len: usize,
    },

    /// The payload was written under a different schema than the one supplied.
    #[error("expected schema {expected} for '{type_name}', found {found}")]
    SchemaIdMismatch {
        type_name: String,
        expected: SchemaId,
        found: SchemaId,
    },

    /// The buffer is truncated or structurally inconsistent with its schema.
    #[error("malformed '{type_name}' record: {detail}")]
    MalformedRecord { type_name: String, detail: String },
}

impl DecodeError {
    pub(crate) fn malformed(type_name: &str, detail: impl Into<String>) -> Self {
        Self::MalformedRecord {
            type_name: type_name.to_string(),
            detail: detail.into(),
        }
    }
}

/// Error returned by the `Value::try_*` accessors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("value type mismatch: expected {expected}, found {actual}")]
pub struct ValueTypeError {
    pub expected: &'static str,
    pub actual: &'static str,
}

impl ValueTypeError {
    pub fn new(expected: &'static str, actual: &'static str) -> Self {
        Self { expected, actual }
    }
}
