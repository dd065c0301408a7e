//! Field-path reads over [`GenericRecord`](compactread_core::GenericRecord)s.
//!
//! Key components:
//! - [`FieldPath`] — parsed form of expressions such as `nested.numbers[3]`
//! - [`resolve`] — walks a path through nested records and arrays
//! - [`GenericRecordQueryReader`] — binds one record and caches parsed paths

mod error;
mod path;
mod policy;
mod reader;
mod resolver;

pub use error::{PathSyntaxError, QueryError, ResolveError};
pub use path::{FieldPath, PathSegment};
pub use policy::{OutOfRangePolicy, ReaderConfig};
pub use reader::GenericRecordQueryReader;
pub use resolver::{resolve, resolve_with_policy};
