//! Record body encoder.
//!
//! Produces the layout read by [`GenericRecord`](compactread_core::GenericRecord):
//! fixed section, offset table (`-1` for absent fields), variable section.
//! Array elements carry a presence byte when nullable, and strings and
//! nested records inside arrays are length-prefixed.

use std::sync::Arc;

use bytes::{BufMut, BytesMut};
use compactread_core::{ElementDef, EncodedRecord, FieldDef, FieldType, Schema, Slot};

use crate::error::EncodeError;

const ABSENT: i32 = -1;

#[derive(Clone, Copy)]
enum Element<'a> {
    Bool(bool),
    I32(i32),
    I64(i64),
    String(&'a str),
    Compact(&'a EncodedRecord),
}

impl Element<'_> {
    fn label(&self) -> &'static str {
        match self {
            Element::Bool(_) => "bool",
            Element::I32(_) => "i32",
            Element::I64(_) => "i64",
            Element::String(_) => "string",
            Element::Compact(_) => "compact",
        }
    }

    fn matches(&self, data_type: &FieldType) -> bool {
        matches!(
            (self, data_type),
            (Element::Bool(_), FieldType::Bool)
                | (Element::I32(_), FieldType::I32)
                | (Element::I64(_), FieldType::I64)
                | (Element::String(_), FieldType::String)
                | (Element::Compact(_), FieldType::Compact(_))
        )
    }

    /// Field payloads are delimited by the offset table, array element
    /// payloads by a length prefix.
    fn put(&self, buf: &mut Vec<u8>, length_prefixed: bool) -> Result<(), usize> {
        match self {
            Element::Bool(v) => buf.put_u8(*v as u8),
            Element::I32(v) => buf.put_i32_le(*v),
            Element::I64(v) => buf.put_i64_le(*v),
            Element::String(v) => put_bytes(buf, v.as_bytes(), length_prefixed)?,
            Element::Compact(v) => put_bytes(buf, v.as_bytes(), length_prefixed)?,
        }
        Ok(())
    }
}

fn put_bytes(buf: &mut Vec<u8>, bytes: &[u8], length_prefixed: bool) -> Result<(), usize> {
    if length_prefixed {
        let len = u32::try_from(bytes.len()).map_err(|_| bytes.len())?;
        buf.put_u32_le(len);
    }
    buf.put_slice(bytes);
    Ok(())
}

/// Collects field values by name and lays them out on [`finish`](Self::finish).
///
/// Nullable fields that are never written are encoded as absent.
pub struct RecordWriter {
    schema: Arc<Schema>,
    fixed: Vec<u8>,
    variable: Vec<Option<Vec<u8>>>,
    written: Vec<bool>,
}

impl RecordWriter {
    pub fn new(schema: Arc<Schema>) -> Self {
        let fixed = vec![0; schema.fixed_size()];
        let variable = vec![None; schema.variable_count()];
        let written = vec![false; schema.fields().len()];
        Self {
            schema,
            fixed,
            variable,
            written,
        }
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn write_bool(&mut self, name: &str, value: bool) -> Result<(), EncodeError> {
        self.write_value(name, "bool", Some(Element::Bool(value)))
    }

    pub fn write_i32(&mut self, name: &str, value: i32) -> Result<(), EncodeError> {
        self.write_value(name, "i32", Some(Element::I32(value)))
    }

    pub fn write_i64(&mut self, name: &str, value: i64) -> Result<(), EncodeError> {
        self.write_value(name, "i64", Some(Element::I64(value)))
    }

    pub fn write_nullable_bool(&mut self, name: &str, value: Option<bool>) -> Result<(), EncodeError> {
        self.write_value(name, "bool", value.map(Element::Bool))
    }

    pub fn write_nullable_i32(&mut self, name: &str, value: Option<i32>) -> Result<(), EncodeError> {
        self.write_value(name, "i32", value.map(Element::I32))
    }

    pub fn write_nullable_i64(&mut self, name: &str, value: Option<i64>) -> Result<(), EncodeError> {
        self.write_value(name, "i64", value.map(Element::I64))
    }

    pub fn write_string(&mut self, name: &str, value: Option<&str>) -> Result<(), EncodeError> {
        self.write_value(name, "string", value.map(Element::String))
    }

    /// Embed an already encoded record; its schema must be the one declared
    /// for the field.
    pub fn write_compact(
        &mut self,
        name: &str,
        value: Option<&EncodedRecord>,
    ) -> Result<(), EncodeError> {
        self.write_value(name, "compact", value.map(Element::Compact))
    }

    /// Mark a nullable field of any type as absent.
    pub fn write_null(&mut self, name: &str) -> Result<(), EncodeError> {
        let schema = Arc::clone(&self.schema);
        let (idx, field, slot) = lookup(&schema, name)?;
        if !field.element.nullable {
            return Err(null_not_allowed(&schema, field));
        }
        if let Slot::Variable { index } = slot {
            self.variable[index] = None;
        }
        self.written[idx] = true;
        Ok(())
    }

    pub fn write_array_of_bool(&mut self, name: &str, items: &[bool]) -> Result<(), EncodeError> {
        self.write_array(name, items.iter().map(|v| Some(Element::Bool(*v))))
    }

    pub fn write_array_of_i32(&mut self, name: &str, items: &[i32]) -> Result<(), EncodeError> {
        self.write_array(name, items.iter().map(|v| Some(Element::I32(*v))))
    }

    pub fn write_array_of_i64(&mut self, name: &str, items: &[i64]) -> Result<(), EncodeError> {
        self.write_array(name, items.iter().map(|v| Some(Element::I64(*v))))
    }

    pub fn write_array_of_nullable_bool(
        &mut self,
        name: &str,
        items: &[Option<bool>],
    ) -> Result<(), EncodeError> {
        self.write_array(name, items.iter().map(|v| v.map(Element::Bool)))
    }

    pub fn write_array_of_nullable_i32(
        &mut self,
        name: &str,
        items: &[Option<i32>],
    ) -> Result<(), EncodeError> {
        self.write_array(name, items.iter().map(|v| v.map(Element::I32)))
    }

    pub fn write_array_of_nullable_i64(
        &mut self,
        name: &str,
        items: &[Option<i64>],
    ) -> Result<(), EncodeError> {
        self.write_array(name, items.iter().map(|v| v.map(Element::I64)))
    }

    pub fn write_array_of_string(
        &mut self,
        name: &str,
        items: &[Option<&str>],
    ) -> Result<(), EncodeError> {
        self.write_array(name, items.iter().map(|v| v.map(Element::String)))
    }

    pub fn write_array_of_compact(
        &mut self,
        name: &str,
        items: &[Option<EncodedRecord>],
    ) -> Result<(), EncodeError> {
        self.write_array(name, items.iter().map(|v| v.as_ref().map(Element::Compact)))
    }

    /// Lay out the record. Fails if a non-nullable field was never written.
    pub fn finish(self) -> Result<EncodedRecord, EncodeError> {
        if let Some(field) = self
            .schema
            .fields()
            .iter()
            .zip(&self.written)
            .find_map(|(field, written)| (!written && !field.element.nullable).then_some(field))
        {
            return Err(EncodeError::MissingField {
                type_name: self.schema.type_name().to_string(),
                field: field.name.clone(),
            });
        }

        let variable_len: usize = self.variable.iter().flatten().map(Vec::len).sum();
        let mut body = BytesMut::with_capacity(self.schema.header_size() + variable_len);
        body.put_slice(&self.fixed);

        let mut offset = 0usize;
        for region in &self.variable {
            match region {
                Some(bytes) => {
                    let entry = i32::try_from(offset).map_err(|_| self.too_large(variable_len))?;
                    body.put_i32_le(entry);
                    offset += bytes.len();
                }
                None => body.put_i32_le(ABSENT),
            }
        }
        if i32::try_from(variable_len).is_err() {
            return Err(self.too_large(variable_len));
        }
        for region in self.variable.iter().flatten() {
            body.put_slice(region);
        }

        Ok(EncodedRecord::from_parts(self.schema.id(), &body))
    }

    fn write_value(
        &mut self,
        name: &str,
        attempted: &'static str,
        value: Option<Element<'_>>,
    ) -> Result<(), EncodeError> {
        let schema = Arc::clone(&self.schema);
        let (idx, field, slot) = lookup(&schema, name)?;
        let Some(value) = value else {
            return self.write_null(name);
        };
        check_element(&schema, field, &field.element, &value, attempted)?;

        match slot {
            Slot::Fixed { offset, size } => {
                let mut buf = Vec::with_capacity(size);
                value
                    .put(&mut buf, false)
                    .map_err(|len| self.too_large(len))?;
                self.fixed[offset..offset + size].copy_from_slice(&buf);
            }
            Slot::Variable { index } => {
                let mut buf = Vec::new();
                value
                    .put(&mut buf, false)
                    .map_err(|len| self.too_large(len))?;
                self.variable[index] = Some(buf);
            }
        }
        self.written[idx] = true;
        Ok(())
    }

    fn write_array<'a>(
        &mut self,
        name: &str,
        items: impl ExactSizeIterator<Item = Option<Element<'a>>>,
    ) -> Result<(), EncodeError> {
        let schema = Arc::clone(&self.schema);
        let (idx, field, slot) = lookup(&schema, name)?;
        let FieldType::Array(element) = &field.element.data_type else {
            return Err(EncodeError::TypeMismatch {
                type_name: schema.type_name().to_string(),
                field: field.name.clone(),
                attempted: "array",
                declared: field.element.type_label(),
            });
        };

        let len = u32::try_from(items.len()).map_err(|_| self.too_large(items.len()))?;
        let mut buf = Vec::new();
        buf.put_u32_le(len);
        for item in items {
            match item {
                Some(value) => {
                    check_element(&schema, field, element, &value, value.label())?;
                    if element.nullable {
                        buf.put_u8(1);
                    }
                    value.put(&mut buf, true).map_err(|len| self.too_large(len))?;
                }
                None if element.nullable => buf.put_u8(0),
                None => return Err(null_not_allowed(&schema, field)),
            }
        }

        if let Slot::Variable { index } = slot {
            self.variable[index] = Some(buf);
        }
        self.written[idx] = true;
        Ok(())
    }

    fn too_large(&self, len: usize) -> EncodeError {
        EncodeError::TooLarge {
            type_name: self.schema.type_name().to_string(),
            len,
        }
    }
}

fn lookup<'s>(
    schema: &'s Schema,
    name: &str,
) -> Result<(usize, &'s FieldDef, Slot), EncodeError> {
    schema
        .locate(name)
        .ok_or_else(|| EncodeError::UnknownField {
            type_name: schema.type_name().to_string(),
            field: name.to_string(),
        })
}

fn check_element(
    schema: &Schema,
    field: &FieldDef,
    element: &ElementDef,
    value: &Element<'_>,
    attempted: &'static str,
) -> Result<(), EncodeError> {
    if !value.matches(&element.data_type) {
        return Err(EncodeError::TypeMismatch {
            type_name: schema.type_name().to_string(),
            field: field.name.clone(),
            attempted,
            declared: element.type_label(),
        });
    }
    if let (Element::Compact(record), FieldType::Compact(expected)) = (value, &element.data_type)
        && record.schema_id() != expected.id()
    {
        return Err(EncodeError::SchemaMismatch {
            type_name: schema.type_name().to_string(),
            field: field.name.clone(),
            expected: expected.id(),
            found: record.schema_id(),
        });
    }
    Ok(())
}

fn null_not_allowed(schema: &Schema, field: &FieldDef) -> EncodeError {
    EncodeError::NullNotAllowed {
        type_name: schema.type_name().to_string(),
        field: field.name.clone(),
    }
}
