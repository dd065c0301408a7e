//! Path resolution against a lazily decoded record.
//!
//! Resolution walks the record one segment at a time. An absent value at any
//! intermediate step ends the walk with an absent result; a present value that
//! cannot be descended into is a [`ResolveError::PathTraversal`].

use compactread_core::{DecodeError, FieldType, GenericRecord, Value};

use crate::{
    error::ResolveError,
    path::{FieldPath, PathSegment},
    policy::OutOfRangePolicy,
};

/// Resolve `path` against `record`, failing on out-of-range indices.
pub fn resolve(record: &GenericRecord, path: &FieldPath) -> Result<Option<Value>, ResolveError> {
    resolve_with_policy(record, path, OutOfRangePolicy::default())
}

pub fn resolve_with_policy(
    record: &GenericRecord,
    path: &FieldPath,
    out_of_range: OutOfRangePolicy,
) -> Result<Option<Value>, ResolveError> {
    match path.segments().split_first() {
        Some((PathSegment::Field(name), rest)) => resolve_field(record, name, rest, out_of_range),
        _ => unreachable!("parsed paths start with a field segment"),
    }
}

fn resolve_field(
    record: &GenericRecord,
    name: &str,
    rest: &[PathSegment],
    out_of_range: OutOfRangePolicy,
) -> Result<Option<Value>, ResolveError> {
    let Some((next, tail)) = rest.split_first() else {
        return Ok(record.get_field(name)?);
    };

    match next {
        PathSegment::Field(child) => match record.field_type(name)? {
            FieldType::Compact(_) => match record.get_nested_record(name)? {
                Some(nested) => resolve_field(&nested, child, tail, out_of_range),
                None => Ok(None),
            },
            other => cannot_descend(record, name, other),
        },
        PathSegment::Index(index) => {
            let Some((len, element_type)) = array_field(record, name)? else {
                return Ok(None);
            };
            if *index >= len {
                return match out_of_range {
                    OutOfRangePolicy::Error => Err(DecodeError::IndexOutOfBounds {
                        field: name.to_string(),
                        index: *index,
                        len,
                    }
                    .into()),
                    OutOfRangePolicy::Absent => Ok(None),
                };
            }
            let element = record.get_array_element(name, *index)?;
            descend(element, name, element_type, tail, out_of_range)
        }
        PathSegment::Any => {
            let Some((_, element_type)) = array_field(record, name)? else {
                return Ok(None);
            };
            let elements = record.get_array(name)?.unwrap_or_default();
            let mut out = Vec::with_capacity(elements.len());
            for element in elements {
                match descend(element, name, element_type, tail, out_of_range)? {
                    Some(Value::Multi(values)) => out.extend(values),
                    other => out.push(other),
                }
            }
            Ok(Some(Value::Multi(out)))
        }
    }
}

/// Continue below an array element.
fn descend(
    element: Option<Value>,
    field: &str,
    element_type: &'static str,
    tail: &[PathSegment],
    out_of_range: OutOfRangePolicy,
) -> Result<Option<Value>, ResolveError> {
    let Some((next, rest)) = tail.split_first() else {
        return Ok(element);
    };
    match (next, element) {
        (_, None) => Ok(None),
        (PathSegment::Field(child), Some(Value::Record(nested))) => {
            resolve_field(&nested, child, rest, out_of_range)
        }
        (_, Some(_)) => Err(ResolveError::PathTraversal {
            field: field.to_string(),
            field_type: element_type,
        }),
    }
}

/// Length and element type of array field `name`, or `None` when absent.
fn array_field(
    record: &GenericRecord,
    name: &str,
) -> Result<Option<(usize, &'static str)>, ResolveError> {
    match record.field_type(name)? {
        FieldType::Array(element) => {
            let element_type = element.data_type.type_name();
            Ok(record.array_len(name)?.map(|len| (len, element_type)))
        }
        other => cannot_descend(record, name, other),
    }
}

/// Absent values end resolution; present ones cannot be descended into.
fn cannot_descend<T>(
    record: &GenericRecord,
    name: &str,
    field_type: &FieldType,
) -> Result<Option<T>, ResolveError> {
    match record.get_field(name)? {
        None => Ok(None),
        Some(_) => Err(ResolveError::PathTraversal {
            field: name.to_string(),
            field_type: field_type.type_name(),
        }),
    }
}
