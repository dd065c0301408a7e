//! Lazily decoded record view.
//!
//! A [`GenericRecord`] is a schema plus a shared slice of the encoded buffer.
//! Nothing is decoded up front: every accessor locates its field through the
//! offsets precomputed on the [`Schema`], then decodes only that field's bytes.
//!
//! Body layout (all integers little-endian):
//!
//! ```text
//! fixed section | offset table (i32 per variable field, -1 = absent) | variable section
//! ```

use std::{fmt, ops::Range, sync::Arc};

use bytes::{Buf, Bytes};

use crate::{
    encoded::{EncodedRecord, SCHEMA_ID_LEN},
    error::DecodeError,
    schema::{ElementDef, FieldDef, FieldType, Schema, SchemaId, Slot},
    value::Value,
};

const ABSENT: i32 = -1;
const LEN_PREFIX: usize = 4;

/// Decode `encoded` as a view over `schema`.
///
/// Only the schema id and the header length are checked here; field bytes
/// are validated when they are read.
pub fn decode(encoded: &EncodedRecord, schema: &Arc<Schema>) -> Result<GenericRecord, DecodeError> {
    let found = encoded.schema_id();
    if found != schema.id() {
        return Err(DecodeError::SchemaIdMismatch {
            type_name: schema.type_name().to_string(),
            expected: schema.id(),
            found,
        });
    }
    GenericRecord::from_body(Arc::clone(schema), encoded.body())
}

/// Per-field addressable view over one encoded record.
///
/// Immutable: repeated reads of the same field return identical values.
/// Cloning is cheap and nested records share the root buffer.
#[derive(Clone)]
pub struct GenericRecord {
    schema: Arc<Schema>,
    body: Bytes,
}

struct ArrayRegion<'s> {
    field: &'s str,
    element: &'s ElementDef,
    len: usize,
    items: Range<usize>,
}

impl GenericRecord {
    pub fn from_body(schema: Arc<Schema>, body: Bytes) -> Result<Self, DecodeError> {
        if body.len() < schema.header_size()
            || (schema.variable_count() == 0 && body.len() != schema.header_size())
        {
            return Err(DecodeError::malformed(
                schema.type_name(),
                format!(
                    "body of {} bytes does not fit its {}-byte header",
                    body.len(),
                    schema.header_size()
                ),
            ));
        }
        Ok(Self { schema, body })
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn type_name(&self) -> &str {
        self.schema.type_name()
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Re-attach the schema id prefix, sharing no state with this view.
    pub fn to_encoded(&self) -> EncodedRecord {
        EncodedRecord::from_parts(self.schema.id(), &self.body)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.schema.field_index(name).is_some()
    }

    pub fn field_type(&self, name: &str) -> Result<&FieldType, DecodeError> {
        Ok(self.lookup(name)?.1.data_type())
    }

    /// Read any field as a [`Value`]; `None` when the field is absent.
    pub fn get_field(&self, name: &str) -> Result<Option<Value>, DecodeError> {
        let (slot, field) = self.lookup(name)?;
        match self.region(slot, field)? {
            Some(range) => self.decode_field(field, range).map(Some),
            None => Ok(None),
        }
    }

    pub fn get_bool(&self, name: &str) -> Result<bool, DecodeError> {
        self.required(name, "bool", |e| is(e, &FieldType::Bool, false), |v| match v {
            Value::Bool(v) => Some(v),
            _ => None,
        })
    }

    pub fn get_i32(&self, name: &str) -> Result<i32, DecodeError> {
        self.required(name, "i32", |e| is(e, &FieldType::I32, false), |v| match v {
            Value::I32(v) => Some(v),
            _ => None,
        })
    }

    pub fn get_i64(&self, name: &str) -> Result<i64, DecodeError> {
        self.required(name, "i64", |e| is(e, &FieldType::I64, false), |v| match v {
            Value::I64(v) => Some(v),
            _ => None,
        })
    }

    /// Also accepts non-nullable `bool` fields.
    pub fn get_nullable_bool(&self, name: &str) -> Result<Option<bool>, DecodeError> {
        self.optional(
            name,
            "nullable bool",
            |e| e.data_type == FieldType::Bool,
            |v| match v {
                Value::Bool(v) => Some(v),
                _ => None,
            },
        )
    }

    /// Also accepts non-nullable `i32` fields.
    pub fn get_nullable_i32(&self, name: &str) -> Result<Option<i32>, DecodeError> {
        self.optional(
            name,
            "nullable i32",
            |e| e.data_type == FieldType::I32,
            |v| match v {
                Value::I32(v) => Some(v),
                _ => None,
            },
        )
    }

    /// Also accepts non-nullable `i64` fields.
    pub fn get_nullable_i64(&self, name: &str) -> Result<Option<i64>, DecodeError> {
        self.optional(
            name,
            "nullable i64",
            |e| e.data_type == FieldType::I64,
            |v| match v {
                Value::I64(v) => Some(v),
                _ => None,
            },
        )
    }

    pub fn get_string(&self, name: &str) -> Result<Option<Arc<str>>, DecodeError> {
        self.optional(
            name,
            "string",
            |e| e.data_type == FieldType::String,
            |v| match v {
                Value::String(v) => Some(v),
                _ => None,
            },
        )
    }

    pub fn get_nested_record(&self, name: &str) -> Result<Option<GenericRecord>, DecodeError> {
        self.optional(
            name,
            "compact",
            |e| matches!(e.data_type, FieldType::Compact(_)),
            |v| match v {
                Value::Record(v) => Some(v),
                _ => None,
            },
        )
    }

    /// Decode every element of an array field.
    pub fn get_array(&self, name: &str) -> Result<Option<Vec<Option<Value>>>, DecodeError> {
        self.optional(
            name,
            "array",
            |e| matches!(e.data_type, FieldType::Array(_)),
            |v| match v {
                Value::Array(v) => Some(v),
                _ => None,
            },
        )
    }

    pub fn get_array_of_nullable_bool(
        &self,
        name: &str,
    ) -> Result<Option<Vec<Option<bool>>>, DecodeError> {
        self.typed_array(name, &FieldType::Bool, "array of bool", |v| match v {
            Value::Bool(v) => Some(v),
            _ => None,
        })
    }

    pub fn get_array_of_nullable_i32(
        &self,
        name: &str,
    ) -> Result<Option<Vec<Option<i32>>>, DecodeError> {
        self.typed_array(name, &FieldType::I32, "array of i32", |v| match v {
            Value::I32(v) => Some(v),
            _ => None,
        })
    }

    pub fn get_array_of_nullable_i64(
        &self,
        name: &str,
    ) -> Result<Option<Vec<Option<i64>>>, DecodeError> {
        self.typed_array(name, &FieldType::I64, "array of i64", |v| match v {
            Value::I64(v) => Some(v),
            _ => None,
        })
    }

    /// Element count of an array field; `None` when the array is absent.
    pub fn array_len(&self, name: &str) -> Result<Option<usize>, DecodeError> {
        let (slot, field, element) = self.array_field(name)?;
        match self.region(slot, field)? {
            Some(range) => Ok(Some(self.array_region(field, element, range)?.len)),
            None => Ok(None),
        }
    }

    /// Read element `index` of an array field.
    ///
    /// Returns `None` when the element was written absent or when the whole
    /// array is absent. Fails with [`DecodeError::IndexOutOfBounds`] when
    /// `index` is not below the array length.
    pub fn get_array_element(
        &self,
        name: &str,
        index: usize,
    ) -> Result<Option<Value>, DecodeError> {
        let (slot, field, element) = self.array_field(name)?;
        let Some(range) = self.region(slot, field)? else {
            return Ok(None);
        };
        let array = self.array_region(field, element, range)?;
        if index >= array.len {
            return Err(DecodeError::IndexOutOfBounds {
                field: field.name.clone(),
                index,
                len: array.len,
            });
        }
        let start = self.element_start(&array, index)?;
        let (payload, next) = self.locate_element(&array, start)?;
        self.check_array_tail(&array, next, array.len - index - 1)?;
        payload
            .map(|payload| self.decode_element(&array, payload))
            .transpose()
    }

    fn lookup(&self, name: &str) -> Result<(Slot, &FieldDef), DecodeError> {
        self.schema
            .locate(name)
            .map(|(_, field, slot)| (slot, field))
            .ok_or_else(|| DecodeError::UnknownField {
                type_name: self.schema.type_name().to_string(),
                field: name.to_string(),
            })
    }

    fn array_field(&self, name: &str) -> Result<(Slot, &FieldDef, &ElementDef), DecodeError> {
        let (slot, field) = self.lookup(name)?;
        match &field.element.data_type {
            FieldType::Array(element) => Ok((slot, field, element)),
            _ => Err(self.type_mismatch(field, "array")),
        }
    }

    fn optional<T>(
        &self,
        name: &str,
        expected: &'static str,
        accepts: impl Fn(&ElementDef) -> bool,
        extract: impl Fn(Value) -> Option<T>,
    ) -> Result<Option<T>, DecodeError> {
        let (slot, field) = self.lookup(name)?;
        if !accepts(&field.element) {
            return Err(self.type_mismatch(field, expected));
        }
        let Some(range) = self.region(slot, field)? else {
            return Ok(None);
        };
        let value = self.decode_field(field, range)?;
        match extract(value) {
            Some(v) => Ok(Some(v)),
            None => Err(self.malformed(format!(
                "field '{}' did not decode as {expected}",
                field.name
            ))),
        }
    }

    fn typed_array<T>(
        &self,
        name: &str,
        element_type: &FieldType,
        expected: &'static str,
        extract: impl Fn(Value) -> Option<T>,
    ) -> Result<Option<Vec<Option<T>>>, DecodeError> {
        let (slot, field, element) = self.array_field(name)?;
        if element.data_type != *element_type {
            return Err(self.type_mismatch(field, expected));
        }
        let Some(range) = self.region(slot, field)? else {
            return Ok(None);
        };
        let array = self.array_region(field, element, range)?;
        self.decode_array(&array)?
            .into_iter()
            .map(|item| {
                item.map(|value| {
                    extract(value).ok_or_else(|| {
                        self.malformed(format!("element of '{name}' did not decode as {expected}"))
                    })
                })
                .transpose()
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some)
    }

    fn required<T>(
        &self,
        name: &str,
        expected: &'static str,
        accepts: impl Fn(&ElementDef) -> bool,
        extract: impl Fn(Value) -> Option<T>,
    ) -> Result<T, DecodeError> {
        self.optional(name, expected, accepts, extract)?
            .ok_or_else(|| self.malformed(format!("non-nullable field '{name}' is absent")))
    }

    /// Byte range of a field's value within the body, or `None` if absent.
    fn region(&self, slot: Slot, field: &FieldDef) -> Result<Option<Range<usize>>, DecodeError> {
        match slot {
            Slot::Fixed { offset, size } => Ok(Some(offset..offset + size)),
            Slot::Variable { index } => self.variable_region(field, index),
        }
    }

    fn variable_region(
        &self,
        field: &FieldDef,
        index: usize,
    ) -> Result<Option<Range<usize>>, DecodeError> {
        let Some(start) = self.offset_entry(index)? else {
            if field.element.nullable {
                return Ok(None);
            }
            return Err(self.malformed(format!(
                "non-nullable field '{}' is absent",
                field.name
            )));
        };

        let var_start = self.schema.header_size();
        let var_len = self.body.len() - var_start;
        let mut end = var_len;
        for next in index + 1..self.schema.variable_count() {
            if let Some(offset) = self.offset_entry(next)? {
                end = offset;
                break;
            }
        }
        if start > end || end > var_len {
            return Err(self.malformed(format!(
                "field '{}' spans {start}..{end} outside the {var_len}-byte variable section",
                field.name
            )));
        }
        Ok(Some(var_start + start..var_start + end))
    }

    fn offset_entry(&self, index: usize) -> Result<Option<usize>, DecodeError> {
        let pos = self.schema.fixed_size() + index * 4;
        let mut entry = &self.body[pos..pos + 4];
        match entry.get_i32_le() {
            ABSENT => Ok(None),
            raw if raw < 0 => Err(self.malformed(format!(
                "negative offset {raw} in offset table slot {index}"
            ))),
            raw => Ok(Some(raw as usize)),
        }
    }

    fn decode_field(&self, field: &FieldDef, range: Range<usize>) -> Result<Value, DecodeError> {
        match &field.element.data_type {
            ty @ (FieldType::Bool | FieldType::I32 | FieldType::I64) => {
                if Some(range.len()) != ty.fixed_size() {
                    return Err(self.malformed(format!(
                        "{} field '{}' spans {} bytes",
                        ty.type_name(),
                        field.name,
                        range.len()
                    )));
                }
                self.decode_scalar(&field.name, ty, &self.body[range])
            }
            FieldType::String => self
                .decode_str(&field.name, &self.body[range])
                .map(Value::String),
            FieldType::Compact(schema) => self
                .decode_nested(&field.name, schema, range)
                .map(Value::Record),
            FieldType::Array(element) => {
                let array = self.array_region(field, element, range)?;
                self.decode_array(&array).map(Value::Array)
            }
        }
    }

    fn decode_scalar(&self, name: &str, ty: &FieldType, bytes: &[u8]) -> Result<Value, DecodeError> {
        let mut buf = bytes;
        let eof_err = || self.malformed(format!("unexpected end of data in field '{name}'"));
        Ok(match ty {
            FieldType::Bool => match buf.try_get_u8().map_err(|_| eof_err())? {
                0 => Value::Bool(false),
                1 => Value::Bool(true),
                b => {
                    return Err(
                        self.malformed(format!("invalid bool byte 0x{b:02x} in field '{name}'"))
                    );
                }
            },
            FieldType::I32 => Value::I32(buf.try_get_i32_le().map_err(|_| eof_err())?),
            FieldType::I64 => Value::I64(buf.try_get_i64_le().map_err(|_| eof_err())?),
            _ => unreachable!("{ty:?} is not a scalar type"),
        })
    }

    fn decode_str(&self, name: &str, bytes: &[u8]) -> Result<Arc<str>, DecodeError> {
        std::str::from_utf8(bytes)
            .map(Arc::from)
            .map_err(|e| self.malformed(format!("invalid UTF-8 in field '{name}': {e}")))
    }

    fn decode_nested(
        &self,
        name: &str,
        schema: &Arc<Schema>,
        range: Range<usize>,
    ) -> Result<GenericRecord, DecodeError> {
        let mut region = &self.body[range.clone()];
        let found = region.try_get_u64_le().map_err(|_| {
            self.malformed(format!("nested record in field '{name}' has no schema id"))
        })?;
        let found = SchemaId(found);
        if found != schema.id() {
            return Err(DecodeError::SchemaIdMismatch {
                type_name: schema.type_name().to_string(),
                expected: schema.id(),
                found,
            });
        }
        GenericRecord::from_body(
            Arc::clone(schema),
            self.body.slice(range.start + SCHEMA_ID_LEN..range.end),
        )
    }

    fn array_region<'s>(
        &self,
        field: &'s FieldDef,
        element: &'s ElementDef,
        range: Range<usize>,
    ) -> Result<ArrayRegion<'s>, DecodeError> {
        let mut header = &self.body[range.clone()];
        let len = header.try_get_u32_le().map_err(|_| {
            self.malformed(format!("array field '{}' has no length prefix", field.name))
        })? as usize;
        let items = range.start + LEN_PREFIX..range.end;

        // Lower bound on the encoded size of each element; exact for
        // non-nullable fixed-width elements.
        let (min_size, exact) = match element.data_type.fixed_size() {
            _ if element.nullable => (1, false),
            Some(size) => (size, true),
            None => (LEN_PREFIX, false),
        };
        let fits = match len.checked_mul(min_size) {
            Some(needed) if exact => needed == items.len(),
            Some(needed) => needed <= items.len(),
            None => false,
        };
        if !fits {
            return Err(self.malformed(format!(
                "array field '{}' declares {len} elements in {} bytes",
                field.name,
                items.len()
            )));
        }

        Ok(ArrayRegion {
            field: &field.name,
            element,
            len,
            items,
        })
    }

    fn element_start(&self, array: &ArrayRegion<'_>, index: usize) -> Result<usize, DecodeError> {
        if !array.element.nullable
            && let Some(size) = array.element.data_type.fixed_size()
        {
            return Ok(array.items.start + index * size);
        }
        let mut pos = array.items.start;
        for _ in 0..index {
            pos = self.locate_element(array, pos)?.1;
        }
        Ok(pos)
    }

    /// Payload range of the element starting at `pos` (`None` when absent)
    /// and the position of the next element.
    fn locate_element(
        &self,
        array: &ArrayRegion<'_>,
        pos: usize,
    ) -> Result<(Option<Range<usize>>, usize), DecodeError> {
        let truncated = || {
            self.malformed(format!(
                "truncated element at byte {pos} of array field '{}'",
                array.field
            ))
        };

        let mut pos = pos;
        if array.element.nullable {
            let flag = *self.body[..array.items.end]
                .get(pos)
                .ok_or_else(truncated)?;
            pos += 1;
            match flag {
                0 => return Ok((None, pos)),
                1 => {}
                b => {
                    return Err(self.malformed(format!(
                        "invalid presence flag 0x{b:02x} in array field '{}'",
                        array.field
                    )));
                }
            }
        }

        let size = match array.element.data_type.fixed_size() {
            Some(size) => size,
            None => {
                let mut prefix = self
                    .body
                    .get(pos..pos + LEN_PREFIX)
                    .filter(|_| pos + LEN_PREFIX <= array.items.end)
                    .ok_or_else(truncated)?;
                usize::try_from(prefix.get_u32_le())
                    .ok()
                    .and_then(|len| len.checked_add(LEN_PREFIX))
                    .ok_or_else(truncated)?
            }
        };
        let end = pos
            .checked_add(size)
            .filter(|end| *end <= array.items.end)
            .ok_or_else(truncated)?;
        Ok((Some(pos..end), end))
    }

    fn decode_element(
        &self,
        array: &ArrayRegion<'_>,
        payload: Range<usize>,
    ) -> Result<Value, DecodeError> {
        match &array.element.data_type {
            ty @ (FieldType::Bool | FieldType::I32 | FieldType::I64) => {
                self.decode_scalar(array.field, ty, &self.body[payload])
            }
            FieldType::String => self
                .decode_str(array.field, &self.body[payload.start + LEN_PREFIX..payload.end])
                .map(Value::String),
            FieldType::Compact(schema) => self
                .decode_nested(array.field, schema, payload.start + LEN_PREFIX..payload.end)
                .map(Value::Record),
            FieldType::Array(_) => unreachable!("nested arrays are rejected by Schema::new"),
        }
    }

    fn decode_array(&self, array: &ArrayRegion<'_>) -> Result<Vec<Option<Value>>, DecodeError> {
        let mut out = Vec::with_capacity(array.len);
        let mut pos = array.items.start;
        for _ in 0..array.len {
            let (payload, next) = self.locate_element(array, pos)?;
            out.push(
                payload
                    .map(|payload| self.decode_element(array, payload))
                    .transpose()?,
            );
            pos = next;
        }
        self.expect_array_end(array, pos)?;
        Ok(out)
    }

    /// Walk the elements after `pos` and require that they end the region.
    fn check_array_tail(
        &self,
        array: &ArrayRegion<'_>,
        pos: usize,
        remaining: usize,
    ) -> Result<(), DecodeError> {
        if !array.element.nullable && array.element.data_type.fixed_size().is_some() {
            // exact size already checked in `array_region`
            return Ok(());
        }
        let mut pos = pos;
        for _ in 0..remaining {
            pos = self.locate_element(array, pos)?.1;
        }
        self.expect_array_end(array, pos)
    }

    fn expect_array_end(&self, array: &ArrayRegion<'_>, pos: usize) -> Result<(), DecodeError> {
        if pos != array.items.end {
            return Err(self.malformed(format!(
                "array field '{}' has {} trailing bytes after {} elements",
                array.field,
                array.items.end.saturating_sub(pos),
                array.len
            )));
        }
        Ok(())
    }

    fn malformed(&self, detail: impl Into<String>) -> DecodeError {
        DecodeError::malformed(self.schema.type_name(), detail)
    }

    fn type_mismatch(&self, field: &FieldDef, expected: &'static str) -> DecodeError {
        DecodeError::TypeMismatch {
            type_name: self.schema.type_name().to_string(),
            field: field.name.clone(),
            expected,
            actual: field.element.type_label(),
        }
    }
}

fn is(element: &ElementDef, data_type: &FieldType, nullable: bool) -> bool {
    element.data_type == *data_type && element.nullable == nullable
}

impl PartialEq for GenericRecord {
    fn eq(&self, other: &Self) -> bool {
        self.schema.id() == other.schema.id() && self.body == other.body
    }
}

impl fmt::Debug for GenericRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericRecord")
            .field("type_name", &self.schema.type_name())
            .field("schema_id", &self.schema.id())
            .field("body_len", &self.body.len())
            .finish()
    }
}
