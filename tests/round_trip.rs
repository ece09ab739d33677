use std::time::Duration;

use proptest::prelude::*;
use schema_codec::schema::{self, bigint, num, option, time};
use schema_codec::{decode_either, encode_either, ParseOptions, Schema, Value};

/// A struct mixing every transformation family whose encode/decode pair is
/// lossless on the Type side.
fn record() -> Schema {
    schema::struct_(vec![
        schema::prop("name", schema::string()),
        schema::prop("amount", num::NUMBER_FROM_STRING.clone()),
        schema::prop("big", bigint::BIGINT_FROM_STRING.clone()),
        schema::prop("elapsed", time::DURATION.clone()),
        schema::prop("nickname", option::option_from_null_or(schema::string())),
        schema::optional("tags", schema::array(schema::string())),
    ])
}

/// HRTime seconds stay exact up to 2^53 - 1.
const MAX_SAFE_SECONDS: u64 = 9_007_199_254_740_991;

fn type_value() -> impl Strategy<Value = Value> {
    (
        "[a-zA-Z0-9 ]{0,20}",
        any::<f64>().prop_filter("finite", |n| n.is_finite()),
        any::<i64>(),
        (prop_oneof![0u64..1_000_000, (MAX_SAFE_SECONDS - 1_000)..=MAX_SAFE_SECONDS], 0u32..1_000_000_000),
        proptest::option::of("[a-z]{0,8}"),
        proptest::option::of(prop::collection::vec("[a-z]{1,5}", 0..4)),
    )
        .prop_map(|(name, amount, big, (secs, nanos), nickname, tags)| {
            let mut entries = vec![
                ("name", Value::from(name)),
                ("amount", Value::from(amount)),
                ("big", Value::BigInt(i128::from(big))),
                ("elapsed", Value::Duration(Duration::new(secs, nanos))),
                ("nickname", nickname.map_or(Value::none(), Value::some)),
            ];
            if let Some(tags) = tags {
                entries.push(("tags", Value::Array(tags.into_iter().map(Value::from).collect())));
            }
            Value::object(entries)
        })
}

proptest! {
    /// decode(encode(v)) gives back v for every valid Type-side value.
    #[test]
    fn encode_then_decode_is_identity(value in type_value()) {
        let s = record();
        let o = ParseOptions::default();
        let encoded = encode_either(&s, &value, &o);
        prop_assert!(encoded.is_ok(), "encode failed: {}", encoded.as_ref().unwrap_err());
        let decoded = decode_either(&s, &encoded.unwrap(), &o);
        prop_assert!(decoded.is_ok(), "decode failed: {}", decoded.as_ref().unwrap_err());
        prop_assert!(decoded.unwrap().equivalent(&value));
    }

    /// Decoding never panics, whatever JSON it is handed.
    #[test]
    fn decode_is_total(n in any::<i64>(), s in ".{0,10}") {
        let input = Value::object([("name", Value::from(s)), ("amount", Value::from(n))]);
        let _ = decode_either(&record(), &input, &ParseOptions::all_errors());
    }
}
