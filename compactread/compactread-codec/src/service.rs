//! Schema registration and record encode/decode entry points.

use std::{collections::HashMap, sync::Arc};

use compactread_core::{EncodedRecord, FieldType, GenericRecord, Schema, SchemaId, decode};

use crate::{error::ServiceError, serializer::CompactSerializer, writer::RecordWriter};

/// Registry of compact schemas keyed by id and by type name.
///
/// Every schema ever registered stays decodable by id, so records written
/// under an older version of a type can still be read. Encoding always uses
/// the serializer's own schema, which must have been registered.
#[derive(Debug, Default)]
pub struct SerializationService {
    by_id: HashMap<SchemaId, Arc<Schema>>,
    by_type_name: HashMap<String, Arc<Schema>>,
}

impl SerializationService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the schema written by `serializer`.
    pub fn register<S: CompactSerializer + ?Sized>(&mut self, serializer: &S) {
        self.register_schema(Arc::clone(serializer.schema()));
    }

    /// Register `schema` and every schema nested inside it.
    ///
    /// The most recently registered schema becomes the current one for its
    /// type name.
    pub fn register_schema(&mut self, schema: Arc<Schema>) {
        for field in schema.fields() {
            match field.data_type() {
                FieldType::Compact(nested) => self.register_schema(Arc::clone(nested)),
                FieldType::Array(element) => {
                    if let FieldType::Compact(nested) = &element.data_type {
                        self.register_schema(Arc::clone(nested));
                    }
                }
                _ => {}
            }
        }

        if self.by_id.contains_key(&schema.id()) {
            return;
        }
        match self.by_type_name.get(schema.type_name()) {
            Some(previous) => log::debug!(
                "compact type '{}' now uses schema {} (was {})",
                schema.type_name(),
                schema.id(),
                previous.id()
            ),
            None => log::debug!(
                "registered compact type '{}' with schema {}",
                schema.type_name(),
                schema.id()
            ),
        }
        self.by_id.insert(schema.id(), Arc::clone(&schema));
        self.by_type_name
            .insert(schema.type_name().to_string(), schema);
    }

    pub fn schema_by_id(&self, id: SchemaId) -> Option<&Arc<Schema>> {
        self.by_id.get(&id)
    }

    /// Current schema for `type_name`.
    pub fn schema_by_type_name(&self, type_name: &str) -> Option<&Arc<Schema>> {
        self.by_type_name.get(type_name)
    }

    pub fn encode<S: CompactSerializer + ?Sized>(
        &self,
        serializer: &S,
        value: &S::Target,
    ) -> Result<EncodedRecord, ServiceError> {
        let schema = serializer.schema();
        if !self.by_id.contains_key(&schema.id()) {
            return Err(ServiceError::NotRegistered {
                type_name: serializer.type_name().to_string(),
            });
        }

        let mut writer = RecordWriter::new(Arc::clone(schema));
        serializer
            .write(&mut writer, value)
            .and_then(|()| writer.finish())
            .map_err(|source| ServiceError::Encode {
                type_name: serializer.type_name().to_string(),
                source,
            })
    }

    /// Decode `encoded` into a lazy view using the schema named by its id.
    pub fn decode_to_generic_record(
        &self,
        encoded: &EncodedRecord,
    ) -> Result<GenericRecord, ServiceError> {
        let id = encoded.schema_id();
        let schema = self
            .by_id
            .get(&id)
            .ok_or(ServiceError::UnknownSchema { id })?;
        Ok(decode(encoded, schema)?)
    }

    pub fn deserialize<S: CompactSerializer + ?Sized>(
        &self,
        serializer: &S,
        encoded: &EncodedRecord,
    ) -> Result<S::Target, ServiceError> {
        let record = self.decode_to_generic_record(encoded)?;
        Ok(serializer.read(&record)?)
    }
}
