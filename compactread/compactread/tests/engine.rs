use std::sync::Arc;

use compactread::{
    QueryEngine, QueryEngineError,
    codec::{CompactSerializer, EncodeError, RecordWriter, SerializationService, ServiceError},
    core::{DecodeError, ElementDef, EncodedRecord, FieldDef, FieldType, GenericRecord, Schema, SchemaId, Value},
    query::OutOfRangePolicy,
};

#[derive(Debug, Clone, PartialEq)]
struct NumbersPojo {
    numbers: Vec<Option<i32>>,
    value: i64,
}

struct NumbersSerializer {
    schema: Arc<Schema>,
}

impl NumbersSerializer {
    fn new() -> Self {
        let schema = Schema::new(
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
        .expect("schema should be valid");
        Self { schema }
    }
}

impl CompactSerializer for NumbersSerializer {
    type Target = NumbersPojo;

    fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    fn write(&self, writer: &mut RecordWriter, value: &NumbersPojo) -> Result<(), EncodeError> {
        writer.write_i64("value", value.value)?;
        writer.write_array_of_nullable_i32("numbers", &value.numbers)
    }

    fn read(&self, record: &GenericRecord) -> Result<NumbersPojo, DecodeError> {
        Ok(NumbersPojo {
            value: record.get_i64("value")?,
            numbers: record
                .get_array_of_nullable_i32("numbers")?
                .unwrap_or_default(),
        })
    }
}

fn service_and_record() -> (SerializationService, EncodedRecord) {
    let serializer = NumbersSerializer::new();
    let mut service = SerializationService::new();
    service.register(&serializer);
    let encoded = service
        .encode(
            &serializer,
            &NumbersPojo {
                numbers: vec![None; 20],
                value: 0,
            },
        )
        .expect("encode");
    (service, encoded)
}

fn engine_and_record() -> (QueryEngine, EncodedRecord) {
    let (service, encoded) = service_and_record();
    (QueryEngine::new(service), encoded)
}

#[test]
fn benchmark_read_loop_returns_the_same_value() {
    let (engine, encoded) = engine_and_record();
    let mut reader = engine.reader(&encoded).expect("reader");
    for _ in 0..1000 {
        assert_eq!(reader.read("value").expect("read"), Some(Value::I64(0)));
    }
    assert_eq!(reader.read("numbers.5").expect("read"), None);
}

#[test]
fn one_shot_reads() {
    let (engine, encoded) = engine_and_record();
    assert_eq!(engine.read(&encoded, "value").expect("read"), Some(Value::I64(0)));
    assert!(matches!(
        engine.read(&encoded, "numbers[20]"),
        Err(QueryEngineError::Query(_))
    ));
}

#[test]
fn builder_applies_reader_settings() {
    let (service, encoded) = service_and_record();
    let engine = QueryEngine::builder()
        .with_service(service)
        .with_out_of_range(OutOfRangePolicy::Absent)
        .with_path_cache_capacity(4)
        .build();
    assert_eq!(engine.config().path_cache_capacity, 4);
    assert_eq!(engine.read(&encoded, "numbers[20]").expect("read"), None);
}

#[test]
fn unknown_schema_ids_are_service_errors() {
    let (engine, _) = engine_and_record();
    let encoded = EncodedRecord::from_parts(SchemaId(9), &[]);
    assert!(matches!(
        engine.read(&encoded, "value"),
        Err(QueryEngineError::Service(ServiceError::UnknownSchema { id: SchemaId(9) }))
    ));
}

#[test]
fn for_each_value_reads_every_record() {
    let serializer = NumbersSerializer::new();
    let mut engine = QueryEngine::default();
    engine.service_mut().register(&serializer);
    let records: Vec<EncodedRecord> = (0..5)
        .map(|value| {
            engine
                .service()
                .encode(
                    &serializer,
                    &NumbersPojo {
                        numbers: vec![Some(value as i32)],
                        value,
                    },
                )
                .expect("encode")
        })
        .collect();

    let mut seen = Vec::new();
    let count = engine
        .for_each_value(&records, "numbers[0]", |value| {
            seen.push(value);
            Ok(())
        })
        .expect("for_each_value");
    assert_eq!(count, 5);
    assert_eq!(seen, (0..5).map(|v| Some(Value::I32(v))).collect::<Vec<_>>());
}

#[test]
fn for_each_value_stops_on_callback_error() {
    let (engine, encoded) = engine_and_record();
    let records = vec![encoded.clone(), encoded];
    let mut calls = 0;
    let err = engine
        .for_each_value(&records, "value", |_| {
            calls += 1;
            Err("stop".into())
        })
        .expect_err("callback error");
    assert!(matches!(err, QueryEngineError::Callback(_)));
    assert_eq!(calls, 1);
}
