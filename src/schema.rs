//! Combinators.
//!
//! Primitive constructors, unions, refinements, transformations and suspends
//! live here; domain-specific built-ins live in the submodules.
pub mod arr;
pub mod bigint;
pub mod num;
pub mod obj;
pub mod option;
pub mod text;
pub mod time;

use std::sync::Arc;

use crate::ast::{Keyword, Kind, Literal, Refinement, Schema, TransformCtx, Transformation, Transformed};
use crate::issue::Issue;
use crate::value::Value;

pub use arr::{array, elem, items_count, max_items, min_items, non_empty_array, optional_element, tuple, tuple_with_rest};
pub use obj::{extend, omit, optional, optional_exact, optional_with_default, partial, pick, prop, record, struct_, tagged_struct};

// ------------------------------- Primitives ------------------------------- //

fn keyword(k: Keyword) -> Schema { Schema::new(Kind::Primitive(k)) }

pub fn string() -> Schema { keyword(Keyword::String) }
pub fn number() -> Schema { keyword(Keyword::Number) }
pub fn boolean() -> Schema { keyword(Keyword::Boolean) }
pub fn bigint() -> Schema { keyword(Keyword::BigInt) }
pub fn symbol() -> Schema { keyword(Keyword::Symbol) }
pub fn unknown() -> Schema { keyword(Keyword::Unknown) }
pub fn any() -> Schema { keyword(Keyword::Any) }
pub fn void() -> Schema { keyword(Keyword::Void) }
pub fn undefined() -> Schema { keyword(Keyword::Undefined) }
pub fn object() -> Schema { keyword(Keyword::Object) }
pub fn never() -> Schema { keyword(Keyword::Never) }

pub fn null() -> Schema { Schema::new(Kind::Literal(vec![Literal::Null])) }

pub fn literal(value: impl Into<Literal>) -> Schema {
    Schema::new(Kind::Literal(vec![value.into()]))
}

/// One node accepting any of the given literals. No literals means `never`.
pub fn literals(values: Vec<Literal>) -> Schema {
    if values.is_empty() { never() } else { Schema::new(Kind::Literal(values)) }
}

// --------------------------------- Unions --------------------------------- //

/// Empty unions are `never`; a single member stands for itself.
pub fn union(mut members: Vec<Schema>) -> Schema {
    match members.len() {
        0 => never(),
        1 => members.remove(0),
        _ => Schema::new(Kind::Union(members)),
    }
}

pub fn null_or(schema: Schema) -> Schema { union(vec![schema, null()]) }
pub fn undefined_or(schema: Schema) -> Schema { union(vec![schema, undefined()]) }
pub fn nullish_or(schema: Schema) -> Schema { union(vec![schema, null(), undefined()]) }

// ------------------------------- Refinements ------------------------------ //

pub fn refine<F>(from: &Schema, predicate: F) -> Schema
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    Schema::new(Kind::Refinement(Refinement { from: from.clone(), predicate: Arc::new(predicate) }))
}

/// Refinement carrying the description used in "Expected ..." messages.
pub fn filter<F>(from: &Schema, description: impl Into<String>, predicate: F) -> Schema
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    refine(from, predicate).description(description)
}

// ----------------------------- Transformations ---------------------------- //

/// Infallible transformation.
pub fn transform<D, E>(from: Schema, to: Schema, decode: D, encode: E) -> Schema
where
    D: Fn(Value) -> Value + Send + Sync + 'static,
    E: Fn(Value) -> Value + Send + Sync + 'static,
{
    transform_async(from, to, move |v, _| Transformed::ok(decode(v)), move |v, _| Transformed::ok(encode(v)))
}

/// Transformation whose functions may fail with an issue.
pub fn transform_or_fail<D, E>(from: Schema, to: Schema, decode: D, encode: E) -> Schema
where
    D: Fn(Value, &TransformCtx<'_>) -> Result<Value, Issue> + Send + Sync + 'static,
    E: Fn(Value, &TransformCtx<'_>) -> Result<Value, Issue> + Send + Sync + 'static,
{
    transform_async(from, to, move |v, ctx| decode(v, ctx).into(), move |v, ctx| encode(v, ctx).into())
}

/// Transformation whose functions may hand back pending work.
pub fn transform_async<D, E>(from: Schema, to: Schema, decode: D, encode: E) -> Schema
where
    D: Fn(Value, &TransformCtx<'_>) -> Transformed + Send + Sync + 'static,
    E: Fn(Value, &TransformCtx<'_>) -> Transformed + Send + Sync + 'static,
{
    Schema::new(Kind::Transformation(Transformation {
        from,
        to,
        decode: Arc::new(decode),
        encode: Arc::new(encode),
        strict: true,
    }))
}

/// Chain two schemas: the Type side of `from` feeds the Encoded side of `to`.
pub fn compose(from: Schema, to: Schema) -> Schema {
    non_strict(&transform(from, to, |v| v, |v| v))
}

/// Same transformation without the output conformance check, for functions
/// that emit loosely-typed intermediate values.
pub fn non_strict(schema: &Schema) -> Schema {
    match schema.kind() {
        Kind::Transformation(t) => {
            let kind = Kind::Transformation(Transformation { strict: false, ..t.clone() });
            Schema::new(kind).annotate(schema.annotations().clone())
        }
        _ => schema.clone(),
    }
}

// --------------------------------- Suspend -------------------------------- //

/// Lazy reference for recursive shapes. The thunk runs on every evaluation.
pub fn suspend<F>(thunk: F) -> Schema
where
    F: Fn() -> Schema + Send + Sync + 'static,
{
    Schema::new(Kind::Suspend(Arc::new(thunk)))
}
