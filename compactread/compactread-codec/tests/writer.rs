use std::sync::Arc;

use compactread_codec::{EncodeError, RecordWriter};
use compactread_core::{ElementDef, FieldDef, FieldType, Schema, Value, decode};

fn sample_schema() -> Arc<Schema> {
    Schema::new(
        "Sample",
        vec![
            FieldDef::new("value", FieldType::I64, false),
            FieldDef::new("flag", FieldType::Bool, false),
            FieldDef::new("count", FieldType::I32, true),
            FieldDef::new("name", FieldType::String, true),
            FieldDef::new(
                "numbers",
                FieldType::Array(Box::new(ElementDef::new(FieldType::I32, true))),
                true,
            ),
        ],
    )
    .expect("schema should be valid")
}

#[test]
fn lays_out_fixed_offsets_and_variable_sections() {
    let schema = sample_schema();
    let mut writer = RecordWriter::new(Arc::clone(&schema));
    writer.write_i64("value", 42).expect("value");
    writer.write_bool("flag", true).expect("flag");
    writer.write_nullable_i32("count", Some(7)).expect("count");
    writer.write_string("name", None).expect("name");
    writer
        .write_array_of_nullable_i32("numbers", &[Some(5), None])
        .expect("numbers");
    let encoded = writer.finish().expect("finish");

    let mut expected = schema.id().0.to_le_bytes().to_vec();
    expected.extend_from_slice(&42i64.to_le_bytes());
    expected.push(1);
    expected.extend_from_slice(&0i32.to_le_bytes());
    expected.extend_from_slice(&(-1i32).to_le_bytes());
    expected.extend_from_slice(&4i32.to_le_bytes());
    expected.extend_from_slice(&7i32.to_le_bytes());
    expected.extend_from_slice(&2u32.to_le_bytes());
    expected.push(1);
    expected.extend_from_slice(&5i32.to_le_bytes());
    expected.push(0);

    assert_eq!(encoded.as_bytes(), expected.as_slice());
}

#[test]
fn unwritten_nullable_fields_are_absent() {
    let schema = sample_schema();
    let mut writer = RecordWriter::new(Arc::clone(&schema));
    writer.write_i64("value", 0).expect("value");
    writer.write_bool("flag", false).expect("flag");
    let encoded = writer.finish().expect("finish");

    let record = decode(&encoded, &schema).expect("decode");
    assert_eq!(record.get_field("count").expect("count"), None);
    assert_eq!(record.get_field("numbers").expect("numbers"), None);
    assert_eq!(record.get_i64("value").expect("value"), 0);
}

#[test]
fn nested_and_string_fields_round_trip_through_the_view() {
    let inner = Schema::new(
        "Inner",
        vec![
            FieldDef::new("label", FieldType::String, false),
            FieldDef::new("x", FieldType::I32, false),
        ],
    )
    .expect("schema should be valid");
    let outer = Schema::new(
        "Outer",
        vec![
            FieldDef::new("nested", FieldType::Compact(Arc::clone(&inner)), true),
            FieldDef::new(
                "items",
                FieldType::Array(Box::new(ElementDef::new(
                    FieldType::Compact(Arc::clone(&inner)),
                    true,
                ))),
                false,
            ),
        ],
    )
    .expect("schema should be valid");

    let make_inner = |label: &str, x: i32| {
        let mut writer = RecordWriter::new(Arc::clone(&inner));
        writer.write_string("label", Some(label)).expect("label");
        writer.write_i32("x", x).expect("x");
        writer.finish().expect("finish inner")
    };

    let mut writer = RecordWriter::new(Arc::clone(&outer));
    writer
        .write_compact("nested", Some(&make_inner("head", 1)))
        .expect("nested");
    writer
        .write_array_of_compact("items", &[Some(make_inner("a", 2)), None, Some(make_inner("b", 3))])
        .expect("items");
    let record = decode(&writer.finish().expect("finish"), &outer).expect("decode");

    let nested = record
        .get_nested_record("nested")
        .expect("nested")
        .expect("nested present");
    assert_eq!(nested.get_string("label").expect("label").as_deref(), Some("head"));

    let third = record
        .get_array_element("items", 2)
        .expect("element")
        .expect("element present");
    let third = third.try_record().expect("record element");
    assert_eq!(third.get_i32("x").expect("x"), 3);
    assert_eq!(record.get_array_element("items", 1).expect("element"), None);
    assert_eq!(
        third.get_field("label").expect("label"),
        Some(Value::string("b"))
    );
}

#[test]
fn rejects_unknown_fields_and_wrong_types() {
    let mut writer = RecordWriter::new(sample_schema());
    assert!(matches!(
        writer.write_i32("missing", 1),
        Err(EncodeError::UnknownField { .. })
    ));
    assert!(matches!(
        writer.write_i32("value", 1),
        Err(EncodeError::TypeMismatch {
            attempted: "i32",
            declared: "i64",
            ..
        })
    ));
    assert!(matches!(
        writer.write_array_of_i64("numbers", &[1]),
        Err(EncodeError::TypeMismatch { .. })
    ));
    assert!(matches!(
        writer.write_null("value"),
        Err(EncodeError::NullNotAllowed { .. })
    ));
}

#[test]
fn rejects_null_elements_in_non_nullable_arrays() {
    let schema = Schema::new(
        "Tags",
        vec![FieldDef::new(
            "tags",
            FieldType::Array(Box::new(ElementDef::new(FieldType::String, false))),
            false,
        )],
    )
    .expect("schema should be valid");
    let mut writer = RecordWriter::new(schema);
    assert!(matches!(
        writer.write_array_of_string("tags", &[Some("a"), None]),
        Err(EncodeError::NullNotAllowed { .. })
    ));
}

#[test]
fn rejects_nested_record_of_another_schema() {
    let inner = Schema::new("Inner", vec![FieldDef::new("x", FieldType::I32, false)])
        .expect("schema should be valid");
    let other = Schema::new("Other", vec![FieldDef::new("x", FieldType::I32, false)])
        .expect("schema should be valid");
    let outer = Schema::new(
        "Outer",
        vec![FieldDef::new("nested", FieldType::Compact(inner), true)],
    )
    .expect("schema should be valid");

    let mut other_writer = RecordWriter::new(other);
    other_writer.write_i32("x", 1).expect("x");
    let other_record = other_writer.finish().expect("finish");

    let mut writer = RecordWriter::new(outer);
    assert!(matches!(
        writer.write_compact("nested", Some(&other_record)),
        Err(EncodeError::SchemaMismatch { .. })
    ));
}

#[test]
fn finish_requires_every_non_nullable_field() {
    let mut writer = RecordWriter::new(sample_schema());
    writer.write_i64("value", 1).expect("value");
    let err = writer.finish().expect_err("flag was never written");
    assert_eq!(
        err,
        EncodeError::MissingField {
            type_name: "Sample".to_string(),
            field: "flag".to_string(),
        }
    );
}
