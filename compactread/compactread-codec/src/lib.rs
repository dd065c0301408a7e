//! Compact record encoding and type registration for `compactread`.
//!
//! Key components:
//! - [`RecordWriter`] — lays out a record body from named field values
//! - [`CompactSerializer`] — explicit encode/decode pair for one Rust type
//! - [`SerializationService`] — type registration, encoding, and
//!   decode-to-[`GenericRecord`](compactread_core::GenericRecord)

mod error;
mod serializer;
mod service;
mod writer;

pub use error::{EncodeError, ServiceError};
pub use serializer::CompactSerializer;
pub use service::SerializationService;
pub use writer::RecordWriter;
