use once_cell::sync::Lazy;
use regex::Regex;

use super::{array, filter, string, transform};
use crate::ast::Schema;
use crate::error::SchemaError;
use crate::value::Value;

// ------------------------------- Built-ins -------------------------------- //

pub static TRIMMED: Lazy<Schema> = Lazy::new(|| {
    string_filter(&string(), "a string with no leading or trailing whitespace".into(), |s| s.trim() == s)
        .identifier("Trimmed")
});

/// Decoding trims; encoding requires an already-trimmed string.
pub static TRIM: Lazy<Schema> = Lazy::new(|| {
    transform(string(), TRIMMED.clone(), |v| map_str(v, |s| s.trim().to_string()), |v| v)
        .identifier("Trim")
});

pub static NON_EMPTY_STRING: Lazy<Schema> = Lazy::new(|| {
    string_filter(&string(), "a non empty string".into(), |s| !s.is_empty()).identifier("NonEmptyString")
});

pub static LOWERCASED: Lazy<Schema> = Lazy::new(|| {
    string_filter(&string(), "a lowercase string".into(), |s| s.to_lowercase() == s).identifier("Lowercased")
});

pub static UPPERCASED: Lazy<Schema> = Lazy::new(|| {
    string_filter(&string(), "an uppercase string".into(), |s| s.to_uppercase() == s).identifier("Uppercased")
});

pub static LOWERCASE: Lazy<Schema> = Lazy::new(|| {
    transform(string(), LOWERCASED.clone(), |v| map_str(v, |s| s.to_lowercase()), |v| v)
        .identifier("Lowercase")
});

pub static UPPERCASE: Lazy<Schema> = Lazy::new(|| {
    transform(string(), UPPERCASED.clone(), |v| map_str(v, |s| s.to_uppercase()), |v| v)
        .identifier("Uppercase")
});

// -------------------------------- Filters --------------------------------- //

fn string_filter<F>(from: &Schema, description: String, check: F) -> Schema
where
    F: Fn(&str) -> bool + Send + Sync + 'static,
{
    filter(from, description, move |v| v.as_str().is_some_and(&check))
}

pub fn min_length(from: &Schema, min: usize) -> Schema {
    string_filter(
        from,
        format!("a string at least {min} character(s) long"),
        move |s| s.chars().count() >= min,
    )
    .title(format!("minLength({min})"))
}

pub fn max_length(from: &Schema, max: usize) -> Schema {
    string_filter(
        from,
        format!("a string at most {max} character(s) long"),
        move |s| s.chars().count() <= max,
    )
    .title(format!("maxLength({max})"))
}

pub fn length(from: &Schema, len: usize) -> Schema {
    string_filter(from, format!("a string {len} character(s) long"), move |s| s.chars().count() == len)
        .title(format!("length({len})"))
}

pub fn pattern(from: &Schema, source: &str) -> Result<Schema, SchemaError> {
    let rx = Regex::new(source).map_err(|e| SchemaError::Pattern(e.to_string()))?;
    Ok(string_filter(from, format!("a string matching the pattern {source}"), move |s| rx.is_match(s))
        .title(format!("pattern(/{source}/)")))
}

pub fn starts_with(from: &Schema, prefix: &str) -> Schema {
    let prefix = prefix.to_string();
    string_filter(from, format!("a string starting with {}", Value::from(prefix.as_str())), move |s| {
        s.starts_with(&prefix)
    })
}

pub fn ends_with(from: &Schema, suffix: &str) -> Schema {
    let suffix = suffix.to_string();
    string_filter(from, format!("a string ending with {}", Value::from(suffix.as_str())), move |s| {
        s.ends_with(&suffix)
    })
}

/// Decoding splits on `separator`; encoding joins.
pub fn split(separator: &str) -> Schema {
    let (sep_decode, sep_encode) = (separator.to_string(), separator.to_string());
    transform(
        string(),
        array(string()),
        move |v| match v {
            Value::String(s) => Value::Array(s.split(sep_decode.as_str()).map(Value::from).collect()),
            other => other,
        },
        move |v| match v {
            Value::Array(xs) => {
                let parts: Vec<&str> = xs.iter().filter_map(Value::as_str).collect();
                Value::String(parts.join(&sep_encode))
            }
            other => other,
        },
    )
    .title(format!("split({})", Value::from(separator)))
}

fn map_str(v: Value, f: impl Fn(&str) -> String) -> Value {
    match v {
        Value::String(s) => Value::String(f(&s)),
        other => other,
    }
}
