//! Error types for the query engine.

use compactread_codec::ServiceError;
use compactread_query::QueryError;

/// Errors produced by [`QueryEngine`](crate::QueryEngine).
#[derive(Debug, thiserror::Error)]
pub enum QueryEngineError {
    /// The record could not be turned into a generic record (unknown schema
    /// id, malformed header).
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// The path was invalid or could not be resolved.
    #[error(transparent)]
    Query(#[from] QueryError),

    /// An error returned by the user-supplied callback in
    /// [`QueryEngine::for_each_value`](crate::QueryEngine::for_each_value).
    #[error(transparent)]
    Callback(Box<dyn std::error::Error + Send + Sync>),
}
