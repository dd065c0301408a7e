//! Error types for encoding and the serialization service.

use compactread_core::{DecodeError, SchemaId};

/// Error returned by [`RecordWriter`](crate::RecordWriter).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("unknown field '{field}' in '{type_name}'")]
    UnknownField { type_name: String, field: String },

    #[error("cannot write {attempted} to field '{field}' of type {declared} in '{type_name}'")]
    TypeMismatch {
        type_name: String,
        field: String,
        attempted: &'static str,
        declared: &'static str,
    },

    #[error("field '{field}' in '{type_name}' is not nullable")]
    NullNotAllowed { type_name: String, field: String },

    /// A nested record was encoded under a different schema than declared.
    #[error("field '{field}' in '{type_name}' expects schema {expected}, got {found}")]
    SchemaMismatch {
        type_name: String,
        field: String,
        expected: SchemaId,
        found: SchemaId,
    },

    #[error("non-nullable field '{field}' in '{type_name}' was never written")]
    MissingField { type_name: String, field: String },

    #[error("'{type_name}' record of {len} bytes exceeds the addressable size")]
    TooLarge { type_name: String, len: usize },
}

/// Error returned by [`SerializationService`](crate::SerializationService).
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("type '{type_name}' is not registered")]
    NotRegistered { type_name: String },

    #[error("no schema registered with id {id}")]
    UnknownSchema { id: SchemaId },

    #[error("failed to encode '{type_name}': {source}")]
    Encode {
        type_name: String,
        #[source]
        source: EncodeError,
    },

    #[error(transparent)]
    Decode(#[from] DecodeError),
}
