use crate::ast::{Declared, Kind, Schema};
use crate::derive::type_schema;
use crate::value::Value;

use super::{null_or, nullish_or, transform, undefined_or};

/// Values already in `some(x)` / `none()` form.
pub fn option_from_self(value: Schema) -> Schema {
    Schema::new(Kind::Declaration(Declared::Option(value)))
}

/// `null` decodes to `none()`, anything else to `some(x)`.
pub fn option_from_null_or(value: Schema) -> Schema {
    from_absent(null_or(value.clone()), &value, Value::is_null, Value::Null)
}

pub fn option_from_undefined_or(value: Schema) -> Schema {
    from_absent(undefined_or(value.clone()), &value, Value::is_undefined, Value::Undefined)
}

/// Both `null` and `undefined` decode to `none()`; `none()` encodes to
/// `none_encoding`, which should be one of the two.
pub fn option_from_nullish_or(value: Schema, none_encoding: Value) -> Schema {
    from_absent(nullish_or(value.clone()), &value, |v| v.is_null() || v.is_undefined(), none_encoding)
}

fn from_absent<F>(from: Schema, value: &Schema, is_absent: F, none_encoding: Value) -> Schema
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    transform(
        from,
        option_from_self(type_schema(value)),
        move |v| if is_absent(&v) { Value::none() } else { Value::some(v) },
        move |v| match v {
            Value::Option(Some(x)) => *x,
            Value::Option(None) => none_encoding.clone(),
            other => other,
        },
    )
}
