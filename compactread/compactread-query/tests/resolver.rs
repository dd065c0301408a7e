mod common;

use common::{benchmark_record, inner_record, outer_record, sparse_outer_record};
use compactread_core::{DecodeError, Value};
use compactread_query::{FieldPath, OutOfRangePolicy, ResolveError, resolve, resolve_with_policy};

fn path(expr: &str) -> FieldPath {
    FieldPath::parse(expr).expect("valid path")
}

#[test]
fn resolves_top_level_fields() {
    let record = benchmark_record();
    assert_eq!(resolve(&record, &path("value")), Ok(Some(Value::I64(0))));
}

#[test]
fn absent_array_elements_resolve_to_absent() {
    let record = benchmark_record();
    assert_eq!(resolve(&record, &path("numbers.5")), Ok(None));
    assert_eq!(resolve(&record, &path("numbers[19]")), Ok(None));
}

#[test]
fn descends_into_nested_records() {
    let record = outer_record();
    assert_eq!(resolve(&record, &path("nested.value")), Ok(Some(Value::I64(0))));
    assert_eq!(resolve(&record, &path("nested.numbers[0]")), Ok(Some(Value::I32(7))));
    assert_eq!(resolve(&record, &path("nested.numbers[1]")), Ok(None));
    assert_eq!(resolve(&record, &path("items[2].value")), Ok(Some(Value::I64(30))));
    assert_eq!(resolve(&record, &path("items[0].numbers[0]")), Ok(Some(Value::I32(1))));
}

#[test]
fn whole_nested_values_are_returned_as_is() {
    let record = outer_record();
    let nested = resolve(&record, &path("nested"))
        .expect("resolve")
        .expect("present");
    assert_eq!(nested, Value::Record(inner_record(0, &[Some(7), None])));

    let numbers = resolve(&record, &path("nested.numbers"))
        .expect("resolve")
        .expect("present");
    assert_eq!(numbers, Value::Array(vec![Some(Value::I32(7)), None]));
}

#[test]
fn absent_intermediates_short_circuit() {
    let record = sparse_outer_record();
    assert_eq!(resolve(&record, &path("nested.value")), Ok(None));
    assert_eq!(resolve(&record, &path("nested.numbers[3]")), Ok(None));
    assert_eq!(resolve(&record, &path("items[0].value")), Ok(None));
    assert_eq!(resolve(&record, &path("items[any].value")), Ok(None));
    assert_eq!(resolve(&record, &path("label.length")), Ok(None));

    let record = outer_record();
    assert_eq!(resolve(&record, &path("items[1].value")), Ok(None));
}

#[test]
fn present_non_record_intermediates_fail() {
    let record = outer_record();
    assert_eq!(
        resolve(&record, &path("value.x")),
        Err(ResolveError::PathTraversal {
            field: "value".to_string(),
            field_type: "i64",
        })
    );
    assert_eq!(
        resolve(&record, &path("label[0]")),
        Err(ResolveError::PathTraversal {
            field: "label".to_string(),
            field_type: "string",
        })
    );
    assert_eq!(
        resolve(&record, &path("nested.numbers[0].x")),
        Err(ResolveError::PathTraversal {
            field: "numbers".to_string(),
            field_type: "i32",
        })
    );
}

#[test]
fn unknown_fields_fail_at_any_depth() {
    let record = outer_record();
    assert!(matches!(
        resolve(&record, &path("missing")),
        Err(ResolveError::Decode(DecodeError::UnknownField { ref field, .. })) if field == "missing"
    ));
    assert!(matches!(
        resolve(&record, &path("nested.missing")),
        Err(ResolveError::Decode(DecodeError::UnknownField { ref type_name, .. }))
            if type_name == "identifiedDataWithLongCompactPojo"
    ));
}

#[test]
fn out_of_range_indices_follow_the_policy() {
    let record = benchmark_record();
    assert_eq!(
        resolve(&record, &path("numbers[20]")),
        Err(ResolveError::Decode(DecodeError::IndexOutOfBounds {
            field: "numbers".to_string(),
            index: 20,
            len: 20,
        }))
    );
    assert_eq!(
        resolve_with_policy(&record, &path("numbers[20]"), OutOfRangePolicy::Absent),
        Ok(None)
    );
}

#[test]
fn any_fans_out_over_elements() {
    let record = outer_record();
    assert_eq!(
        resolve(&record, &path("items[any].value")),
        Ok(Some(Value::Multi(vec![
            Some(Value::I64(10)),
            None,
            Some(Value::I64(30)),
        ])))
    );
    assert_eq!(
        resolve(&record, &path("nested.numbers[any]")),
        Ok(Some(Value::Multi(vec![Some(Value::I32(7)), None])))
    );
}

#[test]
fn nested_any_flattens_results() {
    let record = outer_record();
    assert_eq!(
        resolve(&record, &path("items[any].numbers[any]")),
        Ok(Some(Value::Multi(vec![Some(Value::I32(1)), None])))
    );
}

#[test]
fn repeated_resolution_is_stable() {
    let record = outer_record();
    let path = path("items[0].numbers[0]");
    let first = resolve(&record, &path);
    for _ in 0..10 {
        assert_eq!(resolve(&record, &path), first);
    }
}
