use std::{
    collections::HashMap,
    fmt::{self, Display, Formatter},
    sync::Arc,
};

use super::fingerprint::Fingerprint;
use crate::error::SchemaError;

/// Identifier carried in front of every encoded record.
///
/// Derived from the schema definition itself, so two schemas with the same
/// type name, fields, and nested schemas share an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaId(pub u64);

impl Display for SchemaId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Field type tag.
///
/// Nested record types embed their resolved [`Schema`], so a schema is a
/// self-contained tree once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Bool,
    I32,
    I64,
    String,
    Compact(Arc<Schema>),
    Array(Box<ElementDef>),
}

impl FieldType {
    pub fn is_primitive(&self) -> bool {
        !matches!(self, FieldType::Compact(_) | FieldType::Array(_))
    }

    /// Width of the encoded value, or `None` for variable-length types.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            FieldType::Bool => Some(1),
            FieldType::I32 => Some(4),
            FieldType::I64 => Some(8),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::Bool => "bool",
            FieldType::I32 => "i32",
            FieldType::I64 => "i64",
            FieldType::String => "string",
            FieldType::Compact(_) => "compact",
            FieldType::Array(_) => "array",
        }
    }

    fn tag(&self) -> u8 {
        match self {
            FieldType::Bool => 1,
            FieldType::I32 => 2,
            FieldType::I64 => 3,
            FieldType::String => 4,
            FieldType::Compact(_) => 5,
            FieldType::Array(_) => 6,
        }
    }
}

/// Type plus nullability, used for fields and array elements alike.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementDef {
    pub data_type: FieldType,
    pub nullable: bool,
}

impl ElementDef {
    pub fn new(data_type: FieldType, nullable: bool) -> Self {
        Self {
            data_type,
            nullable,
        }
    }

    /// Human readable label used in type mismatch errors.
    pub fn type_label(&self) -> &'static str {
        match (&self.data_type, self.nullable) {
            (FieldType::Bool, false) => "bool",
            (FieldType::Bool, true) => "nullable bool",
            (FieldType::I32, false) => "i32",
            (FieldType::I32, true) => "nullable i32",
            (FieldType::I64, false) => "i64",
            (FieldType::I64, true) => "nullable i64",
            (FieldType::String, _) => "string",
            (FieldType::Compact(_), _) => "compact",
            (FieldType::Array(_), _) => "array",
        }
    }

    /// Whether the value lives in the fixed section of a record body.
    pub fn is_fixed(&self) -> bool {
        !self.nullable && self.data_type.fixed_size().is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    pub element: ElementDef,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, data_type: FieldType, nullable: bool) -> Self {
        Self {
            name: name.into(),
            element: ElementDef::new(data_type, nullable),
        }
    }

    pub fn data_type(&self) -> &FieldType {
        &self.element.data_type
    }

    pub fn nullable(&self) -> bool {
        self.element.nullable
    }
}

/// Where a field's value lives inside a record body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// Byte range `offset..offset + size` of the fixed section.
    Fixed { offset: usize, size: usize },
    /// Index into the offset table of the variable section.
    Variable { index: usize },
}

/// Immutable record layout description.
///
/// Built once per type and shared behind an [`Arc`]; every offset needed to
/// locate a field is computed here so that readers never walk the schema.
#[derive(Debug, Clone)]
pub struct Schema {
    type_name: String,
    id: SchemaId,
    fields: Vec<FieldDef>,
    slots: Vec<Slot>,
    by_name: HashMap<String, usize>,
    fixed_size: usize,
    variable_count: usize,
}

impl Schema {
    pub fn new(
        type_name: impl Into<String>,
        fields: Vec<FieldDef>,
    ) -> Result<Arc<Self>, SchemaError> {
        let type_name = type_name.into();
        if type_name.is_empty() {
            return Err(SchemaError::EmptyTypeName);
        }

        let mut by_name = HashMap::with_capacity(fields.len());
        let mut slots = Vec::with_capacity(fields.len());
        let mut fixed_size = 0;
        let mut variable_count = 0;

        for (idx, field) in fields.iter().enumerate() {
            validate_field_name(&type_name, &field.name)?;
            if let FieldType::Array(elem) = &field.element.data_type
                && matches!(elem.data_type, FieldType::Array(_))
            {
                return Err(SchemaError::NestedArray {
                    type_name,
                    name: field.name.clone(),
                });
            }
            if by_name.insert(field.name.clone(), idx).is_some() {
                return Err(SchemaError::DuplicateField {
                    type_name,
                    name: field.name.clone(),
                });
            }

            match field.element.data_type.fixed_size() {
                Some(size) if !field.element.nullable => {
                    slots.push(Slot::Fixed {
                        offset: fixed_size,
                        size,
                    });
                    fixed_size += size;
                }
                _ => {
                    slots.push(Slot::Variable {
                        index: variable_count,
                    });
                    variable_count += 1;
                }
            }
        }

        let id = fingerprint(&type_name, &fields);
        Ok(Arc::new(Self {
            type_name,
            id,
            fields,
            slots,
            by_name,
            fixed_size,
            variable_count,
        }))
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn id(&self) -> SchemaId {
        self.id
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    /// Exact, case-sensitive field lookup.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.locate(name).map(|(_, field, _)| field)
    }

    /// Slot of the field at `index`, or `None` past the last field.
    pub fn slot(&self, index: usize) -> Option<Slot> {
        self.slots.get(index).copied()
    }

    /// Index, definition, and slot of field `name`.
    pub fn locate(&self, name: &str) -> Option<(usize, &FieldDef, Slot)> {
        let idx = self.field_index(name)?;
        Some((idx, self.fields.get(idx)?, self.slot(idx)?))
    }

    pub fn fixed_size(&self) -> usize {
        self.fixed_size
    }

    pub fn variable_count(&self) -> usize {
        self.variable_count
    }

    /// Size of the fixed section plus the offset table.
    pub fn header_size(&self) -> usize {
        self.fixed_size + self.variable_count * 4
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.type_name == other.type_name && self.fields == other.fields
    }
}

impl Eq for Schema {}

impl Display for Schema {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} ({})", self.type_name, self.id)?;
        let text = super::format_field_defs(&self.fields)?;
        f.write_str(&text)
    }
}

fn validate_field_name(type_name: &str, name: &str) -> Result<(), SchemaError> {
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if name.contains(['.', '[', ']']) {
        Some("name contains a path delimiter")
    } else if name.bytes().all(|b| b.is_ascii_digit()) {
        Some("name consists only of digits")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(SchemaError::InvalidFieldName {
            type_name: type_name.to_string(),
            name: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

fn fingerprint(type_name: &str, fields: &[FieldDef]) -> SchemaId {
    let mut fp = Fingerprint::new();
    fp.write_str(type_name);
    fp.write_u32(fields.len() as u32);
    for field in fields {
        fp.write_str(&field.name);
        hash_element(&mut fp, &field.element);
    }
    SchemaId(fp.finish())
}

fn hash_element(fp: &mut Fingerprint, element: &ElementDef) {
    fp.write_u8(element.data_type.tag());
    fp.write_u8(element.nullable as u8);
    match &element.data_type {
        FieldType::Compact(schema) => fp.write_u64(schema.id().0),
        FieldType::Array(elem) => hash_element(fp, elem),
        _ => {}
    }
}
