#![allow(dead_code)]

use std::sync::Arc;

use compactread_codec::RecordWriter;
use compactread_core::{ElementDef, EncodedRecord, FieldDef, FieldType, GenericRecord, Schema, decode};

/// `value: i64`, `numbers: [i32?]`
pub fn inner_schema() -> Arc<Schema> {
    Schema::new(
        "identifiedDataWithLongCompactPojo",
        vec![
            FieldDef::new("value", FieldType::I64, false),
            FieldDef::new(
                "numbers",
                FieldType::Array(Box::new(ElementDef::new(FieldType::I32, true))),
                false,
            ),
        ],
    )
    .expect("schema should be valid")
}

/// `value: i64`, `label: string?`, `nested: inner?`, `items: [inner?]?`
pub fn outer_schema() -> Arc<Schema> {
    let inner = inner_schema();
    Schema::new(
        "Outer",
        vec![
            FieldDef::new("value", FieldType::I64, false),
            FieldDef::new("label", FieldType::String, true),
            FieldDef::new("nested", FieldType::Compact(Arc::clone(&inner)), true),
            FieldDef::new(
                "items",
                FieldType::Array(Box::new(ElementDef::new(FieldType::Compact(inner), true))),
                true,
            ),
        ],
    )
    .expect("schema should be valid")
}

pub fn encode_inner(value: i64, numbers: &[Option<i32>]) -> EncodedRecord {
    let mut writer = RecordWriter::new(inner_schema());
    writer.write_i64("value", value).expect("value");
    writer
        .write_array_of_nullable_i32("numbers", numbers)
        .expect("numbers");
    writer.finish().expect("finish")
}

pub fn inner_record(value: i64, numbers: &[Option<i32>]) -> GenericRecord {
    decode(&encode_inner(value, numbers), &inner_schema()).expect("decode")
}

/// The load-generator record: `value = 0`, twenty absent numbers.
pub fn benchmark_record() -> GenericRecord {
    inner_record(0, &[None; 20])
}

/// value=1, label="outer", nested={value: 0, numbers: [7, null]},
/// items=[{value: 10, numbers: [1]}, null, {value: 30, numbers: []}]
pub fn outer_record() -> GenericRecord {
    let mut writer = RecordWriter::new(outer_schema());
    writer.write_i64("value", 1).expect("value");
    writer.write_string("label", Some("outer")).expect("label");
    writer
        .write_compact("nested", Some(&encode_inner(0, &[Some(7), None])))
        .expect("nested");
    writer
        .write_array_of_compact(
            "items",
            &[
                Some(encode_inner(10, &[Some(1)])),
                None,
                Some(encode_inner(30, &[])),
            ],
        )
        .expect("items");
    decode(&writer.finish().expect("finish"), &outer_schema()).expect("decode")
}

/// value=2, every nullable field absent.
pub fn sparse_outer_record() -> GenericRecord {
    let mut writer = RecordWriter::new(outer_schema());
    writer.write_i64("value", 2).expect("value");
    decode(&writer.finish().expect("finish"), &outer_schema()).expect("decode")
}
