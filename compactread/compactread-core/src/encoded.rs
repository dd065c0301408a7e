//! Owned, immutable encoded record buffers.

use bytes::{BufMut, Bytes, BytesMut};

use crate::{error::DecodeError, schema::SchemaId};

/// Length of the schema id prefix in front of every record body.
pub const SCHEMA_ID_LEN: usize = 8;

/// A schema id followed by a record body.
///
/// Cloning shares the underlying buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedRecord {
    bytes: Bytes,
}

impl EncodedRecord {
    /// Wrap raw bytes, checking only that a schema id prefix is present.
    pub fn new(bytes: impl Into<Bytes>) -> Result<Self, DecodeError> {
        let bytes = bytes.into();
        if bytes.len() < SCHEMA_ID_LEN {
            return Err(DecodeError::MalformedRecord {
                type_name: "<unknown>".to_string(),
                detail: format!(
                    "{} bytes is too short for a schema id prefix",
                    bytes.len()
                ),
            });
        }
        Ok(Self { bytes })
    }

    pub fn from_parts(schema_id: SchemaId, body: &[u8]) -> Self {
        let mut buf = BytesMut::with_capacity(SCHEMA_ID_LEN + body.len());
        buf.put_u64_le(schema_id.0);
        buf.put_slice(body);
        Self {
            bytes: buf.freeze(),
        }
    }

    pub fn schema_id(&self) -> SchemaId {
        let mut prefix = [0u8; SCHEMA_ID_LEN];
        prefix.copy_from_slice(&self.bytes[..SCHEMA_ID_LEN]);
        SchemaId(u64::from_le_bytes(prefix))
    }

    /// The record body, sharing this record's buffer.
    pub fn body(&self) -> Bytes {
        self.bytes.slice(SCHEMA_ID_LEN..)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl AsRef<[u8]> for EncodedRecord {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}
