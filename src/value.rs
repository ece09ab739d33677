//! Dynamic runtime values.
//!
//! Both sides of a schema (Encoded and Type) are represented by the same
//! closed `Value` sum type. JSON input converts losslessly into it; the
//! Type-side domain values (`Duration`, `Date`, `Option`) only appear after
//! decoding.
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

pub type Object = IndexMap<String, Value>;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    BigInt(i128),
    String(String),
    Symbol(String),
    Array(Vec<Value>),
    Object(Object),
    // Type-side domain values
    Duration(Duration),
    Date(DateTime<Utc>),
    Option(Option<Box<Value>>),
}

// ————————————————————————————————————————————————————————————————————————————
// CONSTRUCTION
// ————————————————————————————————————————————————————————————————————————————

impl Value {
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn some(inner: impl Into<Value>) -> Self {
        Value::Option(Some(Box::new(inner.into())))
    }

    pub fn none() -> Self {
        Value::Option(None)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self { Value::Bool(b) }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self { Value::Number(n) }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self { Value::Number(n as f64) }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self { Value::Number(n as f64) }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self { Value::String(s.to_string()) }
}

impl From<String> for Value {
    fn from(s: String) -> Self { Value::String(s) }
}

impl From<Duration> for Value {
    fn from(d: Duration) -> Self { Value::Duration(d) }
}

impl From<DateTime<Utc>> for Value {
    fn from(d: DateTime<Utc>) -> Self { Value::Date(d) }
}

impl From<Vec<Value>> for Value {
    fn from(xs: Vec<Value>) -> Self { Value::Array(xs) }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                // u64/i64 beyond f64 precision still land as the nearest f64
                Value::Number(n.as_f64().unwrap_or(f64::NAN))
            }
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(xs) => Value::Array(xs.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(m) => Value::Object(
                m.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// ACCESSORS
// ————————————————————————————————————————————————————————————————————————————

impl Value {
    pub fn is_undefined(&self) -> bool { matches!(self, Value::Undefined) }
    pub fn is_null(&self) -> bool { matches!(self, Value::Null) }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(xs) => Some(xs),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(m) => Some(m),
            _ => None,
        }
    }

    /// Structural equivalence used for round-trip checks.
    /// Unlike `==`, `NaN` is equivalent to `NaN`.
    pub fn equivalent(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => OrderedFloat(*a) == OrderedFloat(*b),
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.equivalent(y))
            }
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter().all(|(k, x)| b.get(k).is_some_and(|y| x.equivalent(y)))
            }
            (Value::Option(Some(a)), Value::Option(Some(b))) => a.equivalent(b),
            _ => self == other,
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// PRETTY PRINTING
// ————————————————————————————————————————————————————————————————————————————

/// JS-flavoured number text: integral values print without a fraction.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity".to_string() } else { "-Infinity".to_string() }
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i128)
    } else {
        format!("{n}")
    }
}

fn quote(s: &str) -> String {
    serde_json::to_string(s).unwrap_or_else(|_| format!("\"{s}\""))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::BigInt(n) => write!(f, "{n}n"),
            Value::String(s) => f.write_str(&quote(s)),
            Value::Symbol(s) => write!(f, "Symbol({s})"),
            Value::Array(xs) => {
                f.write_str("[")?;
                for (i, x) in xs.iter().enumerate() {
                    if i > 0 { f.write_str(",")?; }
                    write!(f, "{x}")?;
                }
                f.write_str("]")
            }
            Value::Object(m) => {
                f.write_str("{")?;
                for (i, (k, v)) in m.iter().enumerate() {
                    if i > 0 { f.write_str(",")?; }
                    write!(f, "{}:{v}", quote(k))?;
                }
                f.write_str("}")
            }
            Value::Duration(d) => {
                if d.subsec_nanos() == 0 {
                    write!(f, "Duration({}s)", d.as_secs())
                } else {
                    write!(f, "Duration({}s {}ns)", d.as_secs(), d.subsec_nanos())
                }
            }
            Value::Date(d) => f.write_str(&d.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Option(None) => f.write_str("none()"),
            Value::Option(Some(v)) => write!(f, "some({v})"),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// JSON OUTPUT
// ————————————————————————————————————————————————————————————————————————————

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Undefined | Value::Null | Value::Option(None) => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 {
                    serializer.serialize_i64(*n as i64)
                } else {
                    serializer.serialize_f64(*n)
                }
            }
            Value::BigInt(n) => serializer.serialize_str(&n.to_string()),
            Value::String(s) | Value::Symbol(s) => serializer.serialize_str(s),
            Value::Array(xs) => {
                let mut seq = serializer.serialize_seq(Some(xs.len()))?;
                for x in xs {
                    seq.serialize_element(x)?;
                }
                seq.end()
            }
            Value::Object(m) => {
                let present = m.iter().filter(|(_, v)| !v.is_undefined());
                let mut map = serializer.serialize_map(None)?;
                for (k, v) in present {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::Duration(d) => (d.as_secs(), d.subsec_nanos()).serialize(serializer),
            Value::Date(d) => serializer.serialize_str(&d.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Option(Some(v)) => v.serialize(serializer),
        }
    }
}

// ------------------------------- Tests ------------------------------------ //
