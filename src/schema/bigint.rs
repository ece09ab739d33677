use once_cell::sync::Lazy;

use super::{bigint, number, string, transform_or_fail};
use crate::ast::Schema;
use crate::issue::Issue;
use crate::value::Value;

/// Largest integer an f64 represents exactly (2^53 - 1).
const MAX_SAFE_INTEGER: i128 = 9_007_199_254_740_991;

pub static BIGINT_FROM_STRING: Lazy<Schema> = Lazy::new(|| {
    transform_or_fail(
        string(),
        bigint(),
        |v, ctx| match v.as_str().and_then(|s| s.trim().parse::<i128>().ok()) {
            Some(n) => Ok(Value::BigInt(n)),
            None => Err(Issue::with_message(ctx.node, &v, format!("Unable to decode {v} into a bigint"))),
        },
        |v, ctx| match v {
            Value::BigInt(n) => Ok(Value::String(n.to_string())),
            other => Err(Issue::type_mismatch(ctx.node, &other)),
        },
    )
    .identifier("BigIntFromString")
});

pub static BIGINT_FROM_NUMBER: Lazy<Schema> = Lazy::new(|| {
    transform_or_fail(
        number(),
        bigint(),
        |v, ctx| match v.as_f64() {
            Some(n) if n.is_finite() && n.fract() == 0.0 && (n.abs() as i128) <= MAX_SAFE_INTEGER => {
                Ok(Value::BigInt(n as i128))
            }
            _ => Err(Issue::with_message(ctx.node, &v, format!("Unable to decode {v} into a bigint"))),
        },
        |v, ctx| match v {
            Value::BigInt(n) if (-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&n) => Ok(Value::Number(n as f64)),
            other => Err(Issue::with_message(ctx.node, &other, format!("Unable to encode {other} into a number"))),
        },
    )
    .identifier("BigIntFromNumber")
});
