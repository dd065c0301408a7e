//! Error types for path parsing, resolution, and reads.

use compactread_core::DecodeError;

/// A path expression that cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathSyntaxError {
    #[error("path is empty")]
    Empty,

    #[error("segment {position} is empty")]
    EmptySegment { position: usize },

    /// An index or `[any]` that does not follow a field name.
    #[error("segment {position} indexes without a preceding field name")]
    IndexWithoutField { position: usize },

    #[error("segment {position} has unbalanced brackets")]
    UnbalancedBrackets { position: usize },

    #[error("segment {position} has invalid index '{index}'")]
    InvalidIndex { position: usize, index: String },
}

/// Error produced while resolving a parsed path against a record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The path continues below a value that is neither a record nor,
    /// for index segments, an array.
    #[error("cannot descend into '{field}' of type {field_type}")]
    PathTraversal {
        field: String,
        field_type: &'static str,
    },
}

/// Error returned by [`GenericRecordQueryReader::read`](crate::GenericRecordQueryReader::read),
/// tagged with the path expression that caused it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("invalid path '{path}': {source}")]
    InvalidPath {
        path: String,
        #[source]
        source: PathSyntaxError,
    },

    #[error("failed to read '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: ResolveError,
    },
}

impl QueryError {
    pub fn path(&self) -> &str {
        match self {
            QueryError::InvalidPath { path, .. } | QueryError::Read { path, .. } => path,
        }
    }

    pub fn resolve_error(&self) -> Option<&ResolveError> {
        match self {
            QueryError::Read { source, .. } => Some(source),
            QueryError::InvalidPath { .. } => None,
        }
    }

    pub fn decode_error(&self) -> Option<&DecodeError> {
        match self.resolve_error()? {
            ResolveError::Decode(err) => Some(err),
            ResolveError::PathTraversal { .. } => None,
        }
    }
}
