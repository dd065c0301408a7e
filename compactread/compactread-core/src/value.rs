//! Values returned by record and path reads.

use std::sync::Arc;

use crate::{error::ValueTypeError, record::GenericRecord};

/// A decoded field value.
///
/// There is no null variant: absence is expressed as `Option::None` by every
/// read API, so an absent integer can never be confused with `0`.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    I32(i32),
    I64(i64),
    String(Arc<str>),
    /// A nested record, still lazily decoded.
    Record(GenericRecord),
    /// Every element of an array field, with `None` for absent elements.
    Array(Vec<Option<Value>>),
    /// Fan-out result of an `[any]` path segment.
    Multi(Vec<Option<Value>>),
}

impl Value {
    pub fn string(s: impl AsRef<str>) -> Self {
        Self::String(Arc::from(s.as_ref()))
    }

    pub fn try_bool(&self) -> Result<bool, ValueTypeError> {
        match self {
            Value::Bool(v) => Ok(*v),
            _ => Err(self.type_mismatch("Bool")),
        }
    }

    pub fn try_i32(&self) -> Result<i32, ValueTypeError> {
        match self {
            Value::I32(v) => Ok(*v),
            _ => Err(self.type_mismatch("I32")),
        }
    }

    pub fn try_i64(&self) -> Result<i64, ValueTypeError> {
        match self {
            Value::I64(v) => Ok(*v),
            _ => Err(self.type_mismatch("I64")),
        }
    }

    pub fn try_str(&self) -> Result<&str, ValueTypeError> {
        match self {
            Value::String(v) => Ok(v.as_ref()),
            _ => Err(self.type_mismatch("String")),
        }
    }

    pub fn try_record(&self) -> Result<&GenericRecord, ValueTypeError> {
        match self {
            Value::Record(v) => Ok(v),
            _ => Err(self.type_mismatch("Record")),
        }
    }

    pub fn try_array(&self) -> Result<&[Option<Value>], ValueTypeError> {
        match self {
            Value::Array(v) => Ok(v),
            _ => Err(self.type_mismatch("Array")),
        }
    }

    pub fn try_multi(&self) -> Result<&[Option<Value>], ValueTypeError> {
        match self {
            Value::Multi(v) => Ok(v),
            _ => Err(self.type_mismatch("Multi")),
        }
    }

    pub fn type_mismatch(&self, expected: &'static str) -> ValueTypeError {
        ValueTypeError::new(expected, self.variant_name())
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "Bool",
            Value::I32(_) => "I32",
            Value::I64(_) => "I64",
            Value::String(_) => "String",
            Value::Record(_) => "Record",
            Value::Array(_) => "Array",
            Value::Multi(_) => "Multi",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::string(v)
    }
}

impl From<GenericRecord> for Value {
    fn from(v: GenericRecord) -> Self {
        Value::Record(v)
    }
}
