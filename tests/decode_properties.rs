use std::time::Duration;

use schema_codec::issue::{FORBIDDEN_MESSAGE, IssueKind};
use schema_codec::schema::{self, num, option, time};
use schema_codec::{
    decode, decode_either, decode_sync, encode_either, number_indexed_access, Issue, ParseOptions, Schema,
    Transformed, Value,
};
use serde_json::json;

fn v(j: serde_json::Value) -> Value {
    Value::from(j)
}

fn opts() -> ParseOptions {
    ParseOptions::default()
}

fn async_string() -> Schema {
    schema::transform_async(
        schema::string(),
        schema::string(),
        |value, _| {
            Transformed::pending(async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok(value)
            })
        },
        |value, _| Transformed::ok(value),
    )
    .identifier("AsyncString")
}

#[test]
fn duration_decodes_hrtime() {
    let out = decode_either(&time::DURATION, &v(json!([555, 123456789])), &opts()).unwrap();
    let Value::Duration(d) = out else { panic!("expected a duration, got {out}") };
    assert_eq!(d.as_nanos(), 555_123_456_789);
}

#[test]
fn duration_rejects_negative_seconds() {
    let err = decode_sync(&time::DURATION, &v(json!([-500, 0])), &opts()).unwrap_err();
    let expected = "Duration
└─ Encoded side transformation failure
   └─ HRTime
      └─ [0]
         └─ NonNegativeInt
            └─ From side refinement failure
               └─ NonNegative
                  └─ Predicate refinement failure
                     └─ Expected a non-negative number, actual -500";
    assert_eq!(err.to_string(), expected);
}

#[test]
fn duration_rejects_negative_nanos() {
    let err = decode_either(&time::DURATION, &v(json!([0, -123])), &opts()).unwrap_err();
    let expected = "Duration
└─ Encoded side transformation failure
   └─ HRTime
      └─ [1]
         └─ NonNegativeInt
            └─ From side refinement failure
               └─ NonNegative
                  └─ Predicate refinement failure
                     └─ Expected a non-negative number, actual -123";
    assert_eq!(err.render(), expected);
}

#[test]
fn duration_rejects_non_tuples() {
    for (input, shown) in [(v(json!(123)), "123"), (Value::BigInt(123), "123n")] {
        let err = decode_either(&time::DURATION, &input, &opts()).unwrap_err();
        assert_eq!(
            err.render(),
            format!("Duration\n└─ Encoded side transformation failure\n   └─ Expected HRTime, actual {shown}")
        );
    }
}

#[test]
fn duration_encodes_to_hrtime() {
    let d = Value::Duration(Duration::from_millis(123456789));
    assert_eq!(encode_either(&time::DURATION, &d, &opts()).unwrap(), v(json!([123456, 789000000])));
}

#[test]
fn positive_accepts_only_positive_numbers() {
    assert_eq!(decode_either(&num::POSITIVE, &v(json!(1)), &opts()).unwrap(), v(json!(1)));
    for bad in [-1, 0] {
        let err = decode_either(&num::POSITIVE, &v(json!(bad)), &opts()).unwrap_err();
        assert_eq!(
            err.render(),
            format!("Positive\n└─ Predicate refinement failure\n   └─ Expected a positive number, actual {bad}")
        );
        assert_eq!(err.kind(), IssueKind::RefinementFailure(schema_codec::issue::RefinementKind::Predicate));
    }
}

#[test]
fn option_from_null_or_number_from_string() {
    let s = option::option_from_null_or(num::NUMBER_FROM_STRING.clone());
    assert_eq!(decode_either(&s, &Value::Null, &opts()).unwrap(), Value::none());
    assert_eq!(decode_either(&s, &v(json!("1")), &opts()).unwrap(), Value::some(1));

    let err = decode_either(&s, &Value::Undefined, &opts()).unwrap_err();
    let union = err.find(IssueKind::UnionExhausted).expect("union issue");
    match union {
        Issue::Union { members, .. } => assert_eq!(members.len(), 2),
        other => panic!("expected a union issue, got {other:?}"),
    }
}

#[test]
fn unknown_accepts_everything() {
    let unknown = schema::unknown();
    let samples = [
        Value::Undefined,
        Value::Null,
        v(json!(true)),
        v(json!(1.5)),
        Value::BigInt(1),
        v(json!("a")),
        Value::Symbol("s".into()),
        v(json!([1, "a"])),
        v(json!({"a": {}})),
        Value::Duration(Duration::from_secs(1)),
        Value::none(),
    ];
    for sample in samples {
        assert_eq!(decode_either(&unknown, &sample, &opts()).unwrap(), sample);
        assert_eq!(encode_either(&unknown, &sample, &opts()).unwrap(), sample);
    }
}

#[test]
fn sync_decode_refuses_async_work() {
    let err = decode_either(&async_string(), &v(json!("a")), &opts()).unwrap_err();
    assert_eq!(err.render(), format!("AsyncString\n└─ {FORBIDDEN_MESSAGE}"));

    let nested = schema::struct_(vec![schema::prop("a", async_string()), schema::prop("b", schema::number())]);
    let err = decode_either(&nested, &v(json!({"a": "x", "b": "y"})), &ParseOptions::all_errors()).unwrap_err();
    // forbidden work stops the walk even when collecting every error
    assert_eq!(err.children().len(), 1);
    assert!(err.find(IssueKind::AsyncNotAllowed).is_some());
}

#[test]
fn sync_union_stops_at_forbidden_member() {
    let u = schema::union(vec![async_string(), schema::string()]);
    let err = decode_either(&u, &v(json!("a")), &opts()).unwrap_err();
    let expected = format!("AsyncString | string\n└─ AsyncString\n   └─ {FORBIDDEN_MESSAGE}");
    assert_eq!(err.render(), expected);
}

#[tokio::test]
async fn async_decode_awaits_pending_work() {
    let out = decode(&async_string(), &v(json!("a")), &opts()).await.unwrap();
    assert_eq!(out, v(json!("a")));

    let nested = schema::array(async_string());
    let out = decode(&nested, &v(json!(["a", "b"])), &opts()).await.unwrap();
    assert_eq!(out, v(json!(["a", "b"])));

    let err = decode(&nested, &v(json!(["a", 1])), &opts()).await.unwrap_err();
    assert!(err.message().contains("Expected string, actual 1"));
}

#[test]
fn number_indexed_access_on_tuples_arrays_and_unions() {
    let t = schema::tuple(vec![schema::elem(schema::string()), schema::elem(schema::number())]);
    assert_eq!(number_indexed_access(&t).unwrap().label(), "string | number");

    let t = schema::tuple(vec![schema::elem(schema::string()), schema::optional_element(schema::number())]);
    let indexed = number_indexed_access(&t).unwrap();
    assert_eq!(indexed.label(), "string | number | undefined");
    assert!(decode_either(&indexed, &Value::Undefined, &opts()).is_ok());

    let a = schema::array(num::NUMBER_FROM_STRING.clone());
    let indexed = number_indexed_access(&a).unwrap();
    assert_eq!(indexed.label(), "NumberFromString");
    assert_eq!(
        decode_either(&indexed, &v(json!("2")), &opts()).unwrap(),
        decode_either(&num::NUMBER_FROM_STRING, &v(json!("2")), &opts()).unwrap()
    );

    let u = schema::union(vec![schema::array(schema::string()), schema::array(schema::number())]);
    assert_eq!(number_indexed_access(&u).unwrap().label(), "string | number");

    assert!(number_indexed_access(&schema::string()).is_err());
}
