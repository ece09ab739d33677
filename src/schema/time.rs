use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;

use super::num::NON_NEGATIVE_INT;
use super::{bigint, elem, number, string, transform_or_fail, tuple};
use crate::ast::{Declared, Kind, Schema};
use crate::issue::Issue;
use crate::value::Value;

// -------------------------------- Durations ------------------------------- //

/// Largest whole number of seconds (or nanos) an HRTime entry carries exactly.
const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;

fn safe(n: f64) -> bool {
    n <= MAX_SAFE_INTEGER as f64
}

pub static DURATION_FROM_SELF: Lazy<Schema> =
    Lazy::new(|| Schema::new(Kind::Declaration(Declared::Duration)).identifier("DurationFromSelf"));

/// `[seconds, nanos]`, both non-negative integers.
pub static HRTIME: Lazy<Schema> = Lazy::new(|| {
    tuple(vec![elem(NON_NEGATIVE_INT.clone()), elem(NON_NEGATIVE_INT.clone())]).identifier("HRTime")
});

pub static DURATION: Lazy<Schema> = Lazy::new(|| {
    transform_or_fail(
        HRTIME.clone(),
        DURATION_FROM_SELF.clone(),
        |v, ctx| {
            let parts = v.as_array().map(|xs| xs.iter().filter_map(Value::as_f64).collect::<Vec<_>>());
            let duration = match parts.as_deref() {
                Some(&[secs, nanos]) if safe(secs) && safe(nanos) => {
                    Duration::from_secs(secs as u64).checked_add(Duration::from_nanos(nanos as u64))
                }
                _ => None,
            };
            duration
                .map(Value::Duration)
                .ok_or_else(|| Issue::with_message(ctx.node, &v, format!("Unable to decode {v} into a Duration")))
        },
        |v, ctx| match v {
            Value::Duration(d) if d.as_secs() <= MAX_SAFE_INTEGER => Ok(Value::Array(vec![
                Value::Number(d.as_secs() as f64),
                Value::Number(f64::from(d.subsec_nanos())),
            ])),
            Value::Duration(_) => Err(Issue::with_message(ctx.node, &v, format!("Unable to encode {v} into HRTime"))),
            other => Err(Issue::type_mismatch(ctx.node, &other)),
        },
    )
    .identifier("Duration")
});

pub static DURATION_FROM_MILLIS: Lazy<Schema> = Lazy::new(|| {
    transform_or_fail(
        number(),
        DURATION_FROM_SELF.clone(),
        |v, ctx| match v.as_f64().and_then(|ms| Duration::try_from_secs_f64(ms / 1000.0).ok()) {
            Some(d) => Ok(Value::Duration(d)),
            None => Err(Issue::with_message(ctx.node, &v, format!("Unable to decode {v} into a Duration"))),
        },
        |v, ctx| match v {
            Value::Duration(d) => Ok(Value::Number(d.as_secs_f64() * 1000.0)),
            other => Err(Issue::type_mismatch(ctx.node, &other)),
        },
    )
    .identifier("DurationFromMillis")
});

pub static DURATION_FROM_NANOS: Lazy<Schema> = Lazy::new(|| {
    transform_or_fail(
        bigint(),
        DURATION_FROM_SELF.clone(),
        |v, ctx| match &v {
            Value::BigInt(n) => match u64::try_from(*n) {
                Ok(n) => Ok(Value::Duration(Duration::from_nanos(n))),
                Err(_) => Err(Issue::with_message(ctx.node, &v, format!("Unable to decode {v} into a Duration"))),
            },
            other => Err(Issue::type_mismatch(ctx.node, other)),
        },
        |v, ctx| match v {
            Value::Duration(d) => match i128::try_from(d.as_nanos()) {
                Ok(n) => Ok(Value::BigInt(n)),
                Err(_) => Err(Issue::with_message(ctx.node, &v, format!("Unable to encode {v} into a bigint"))),
            },
            other => Err(Issue::type_mismatch(ctx.node, &other)),
        },
    )
    .identifier("DurationFromNanos")
});

// ---------------------------------- Dates --------------------------------- //

pub static DATE_FROM_SELF: Lazy<Schema> =
    Lazy::new(|| Schema::new(Kind::Declaration(Declared::Date)).identifier("DateFromSelf"));

/// RFC 3339 strings. Encoding always emits UTC with millisecond precision.
pub static DATE_FROM_STRING: Lazy<Schema> = Lazy::new(|| {
    transform_or_fail(
        string(),
        DATE_FROM_SELF.clone(),
        |v, ctx| match v.as_str().and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok()) {
            Some(dt) => Ok(Value::Date(dt.with_timezone(&Utc))),
            None => Err(Issue::with_message(ctx.node, &v, format!("Unable to decode {v} into a Date"))),
        },
        |v, ctx| match v {
            Value::Date(dt) => Ok(Value::String(dt.to_rfc3339_opts(SecondsFormat::Millis, true))),
            other => Err(Issue::type_mismatch(ctx.node, &other)),
        },
    )
    .identifier("DateFromString")
});

pub static DATE: Lazy<Schema> = Lazy::new(|| DATE_FROM_STRING.identifier("Date"));
