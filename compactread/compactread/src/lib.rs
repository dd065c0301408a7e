mod engine;
mod error;

pub use compactread_codec as codec;
pub use compactread_core as core;
pub use compactread_query as query;
pub use engine::{QueryEngine, QueryEngineBuilder};
pub use error::QueryEngineError;
