//! Explicit per-type encode/decode pairs.

use std::sync::Arc;

use compactread_core::{DecodeError, GenericRecord, Schema};

use crate::{error::EncodeError, writer::RecordWriter};

/// Converts one Rust type to and from its compact representation.
///
/// Implementations own the [`Schema`] they write; it is registered with a
/// [`SerializationService`](crate::SerializationService) before use.
pub trait CompactSerializer: Send + Sync {
    type Target;

    fn schema(&self) -> &Arc<Schema>;

    fn type_name(&self) -> &str {
        self.schema().type_name()
    }

    /// Write every field of `value`. The writer is bound to [`Self::schema`].
    fn write(&self, writer: &mut RecordWriter, value: &Self::Target) -> Result<(), EncodeError>;

    fn read(&self, record: &GenericRecord) -> Result<Self::Target, DecodeError>;
}
