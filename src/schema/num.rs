use once_cell::sync::Lazy;

use super::{filter, number, string, transform_or_fail};
use crate::ast::Schema;
use crate::derive::type_schema;
use crate::issue::Issue;
use crate::value::{format_number, Value};

// ------------------------------- Built-ins -------------------------------- //

pub static NUMBER_FROM_STRING: Lazy<Schema> = Lazy::new(|| {
    transform_or_fail(
        string(),
        number(),
        |v, ctx| match v.as_str().and_then(parse_number) {
            Some(n) => Ok(Value::Number(n)),
            None => Err(Issue::with_message(ctx.node, &v, format!("Unable to decode {v} into a number"))),
        },
        |v, ctx| match v {
            Value::Number(n) => Ok(Value::String(format_number(n))),
            other => Err(Issue::type_mismatch(ctx.node, &other)),
        },
    )
    .identifier("NumberFromString")
});

pub static FINITE: Lazy<Schema> = Lazy::new(|| finite(&number()).identifier("Finite"));
pub static INT: Lazy<Schema> = Lazy::new(|| int(&number()).identifier("Int"));
pub static POSITIVE: Lazy<Schema> = Lazy::new(|| positive(&number()).identifier("Positive"));
pub static NEGATIVE: Lazy<Schema> = Lazy::new(|| negative(&number()).identifier("Negative"));
pub static NON_NEGATIVE: Lazy<Schema> = Lazy::new(|| non_negative(&number()).identifier("NonNegative"));
pub static NON_POSITIVE: Lazy<Schema> = Lazy::new(|| non_positive(&number()).identifier("NonPositive"));
pub static NON_NEGATIVE_INT: Lazy<Schema> = Lazy::new(|| int(&NON_NEGATIVE).identifier("NonNegativeInt"));

// -------------------------------- Filters --------------------------------- //

fn number_filter<F>(from: &Schema, description: String, check: F) -> Schema
where
    F: Fn(f64) -> bool + Send + Sync + 'static,
{
    filter(from, description, move |v| v.as_f64().is_some_and(&check))
}

pub fn finite(from: &Schema) -> Schema {
    number_filter(from, "a finite number".into(), f64::is_finite)
}

pub fn int(from: &Schema) -> Schema {
    number_filter(from, "an integer".into(), |n| n.is_finite() && n.fract() == 0.0)
}

pub fn positive(from: &Schema) -> Schema {
    number_filter(from, "a positive number".into(), |n| n > 0.0)
}

pub fn negative(from: &Schema) -> Schema {
    number_filter(from, "a negative number".into(), |n| n < 0.0)
}

pub fn non_negative(from: &Schema) -> Schema {
    number_filter(from, "a non-negative number".into(), |n| n >= 0.0)
}

pub fn non_positive(from: &Schema) -> Schema {
    number_filter(from, "a non-positive number".into(), |n| n <= 0.0)
}

pub fn greater_than(from: &Schema, min: f64) -> Schema {
    number_filter(from, format!("a number greater than {}", format_number(min)), move |n| n > min)
        .title(format!("greaterThan({})", format_number(min)))
}

pub fn greater_than_or_equal_to(from: &Schema, min: f64) -> Schema {
    number_filter(from, format!("a number greater than or equal to {}", format_number(min)), move |n| n >= min)
        .title(format!("greaterThanOrEqualTo({})", format_number(min)))
}

pub fn less_than(from: &Schema, max: f64) -> Schema {
    number_filter(from, format!("a number less than {}", format_number(max)), move |n| n < max)
        .title(format!("lessThan({})", format_number(max)))
}

pub fn less_than_or_equal_to(from: &Schema, max: f64) -> Schema {
    number_filter(from, format!("a number less than or equal to {}", format_number(max)), move |n| n <= max)
        .title(format!("lessThanOrEqualTo({})", format_number(max)))
}

pub fn between(from: &Schema, min: f64, max: f64) -> Schema {
    let description = format!("a number between {} and {}", format_number(min), format_number(max));
    number_filter(from, description, move |n| min <= n && n <= max)
        .title(format!("between({}, {})", format_number(min), format_number(max)))
}

/// Decoding pulls out-of-range numbers into `[min, max]`.
pub fn clamp(from: &Schema, min: f64, max: f64) -> Schema {
    let to = between(&type_schema(from), min, max);
    super::non_strict(&super::transform(
        from.clone(),
        to,
        move |v| match v {
            Value::Number(n) => Value::Number(n.clamp(min, max)),
            other => other,
        },
        |v| v,
    ))
}

// ------------------------------- Utilities -------------------------------- //

/// `"NaN"`, `"Infinity"` and `"-Infinity"` are accepted verbatim; anything
/// else must be a finite decimal after trimming.
pub fn parse_number(s: &str) -> Option<f64> {
    match s {
        "NaN" => Some(f64::NAN),
        "Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        _ => {
            let t = s.trim();
            if t.is_empty() {
                return None;
            }
            t.parse::<f64>().ok().filter(|n| n.is_finite())
        }
    }
}
