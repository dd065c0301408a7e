use std::fmt::{Error, Result, Write as _};

use super::{FieldDef, FieldType};

/// Format field definitions in a readable style:
/// primitive fields are rendered in one line, nested records and arrays are
/// pretty-printed. Nested fields follow the same rule.
pub fn format_field_defs(fields: impl AsRef<[FieldDef]>) -> std::result::Result<String, Error> {
    let mut out = String::new();
    for field in fields.as_ref() {
        format_labeled_type(
            &field.name,
            &field.element.data_type,
            field.element.nullable,
            0,
            &mut out,
        )?;
    }
    Ok(out)
}

fn format_labeled_type(
    label: &str,
    data_type: &FieldType,
    nullable: bool,
    indent: usize,
    out: &mut String,
) -> Result {
    let pad = " ".repeat(indent);
    if data_type.is_primitive() {
        writeln!(
            out,
            "{pad}{label}: {{ type: {}, nullable: {nullable} }}",
            data_type.type_name()
        )?;
        return Ok(());
    }

    writeln!(out, "{pad}{label}:")?;
    let pad = " ".repeat(indent + 4);
    writeln!(out, "{pad}type: {}", data_type.type_name())?;
    writeln!(out, "{pad}nullable: {nullable}")?;
    match data_type {
        FieldType::Compact(schema) => {
            writeln!(out, "{pad}schema: {} ({})", schema.type_name(), schema.id())?;
            writeln!(out, "{pad}fields:")?;
            for child in schema.fields() {
                format_labeled_type(
                    &child.name,
                    &child.element.data_type,
                    child.element.nullable,
                    indent + 8,
                    out,
                )?;
            }
        }
        FieldType::Array(elem) => {
            format_labeled_type("item", &elem.data_type, elem.nullable, indent + 4, out)?;
        }
        _ => unreachable!("{data_type:?} is not a compound type"),
    }
    Ok(())
}
