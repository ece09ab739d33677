//! Schema derivations: the Type and Encoded sides of a schema, structural
//! conformance checks against either side, and number-indexed access.
use std::sync::Arc;

use crate::ast::{
    Declared, Element, IndexSignature, Kind, PropertySignature, Refinement, Schema, Struct, Tuple,
};
use crate::error::SchemaError;
use crate::schema::{undefined, union};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The external representation a decode starts from.
    Encoded,
    /// The internal representation a decode produces.
    Type,
}

// ------------------------------ Conformance ------------------------------- //

/// Does `v` already have the shape of the given side of `node`?
/// Refinement predicates only count on the Type side. Excess object keys are
/// tolerated.
pub fn conforms(node: &Schema, v: &Value, side: Side) -> bool {
    match node.kind() {
        Kind::Primitive(keyword) => keyword.accepts(v),
        Kind::Literal(lits) => lits.iter().any(|l| l.matches(v)),
        Kind::Declaration(declared) => match (declared, v) {
            (Declared::Duration, Value::Duration(_)) | (Declared::Date, Value::Date(_)) => true,
            (Declared::Option(_), Value::Option(None)) => true,
            (Declared::Option(inner), Value::Option(Some(x))) => conforms(inner, x, side),
            _ => false,
        },
        Kind::Refinement(r) => match side {
            Side::Type => conforms(&r.from, v, side) && (r.predicate)(v),
            Side::Encoded => conforms(&r.from, v, side),
        },
        Kind::Transformation(t) => match side {
            Side::Type => conforms(&t.to, v, side),
            Side::Encoded => conforms(&t.from, v, side),
        },
        Kind::Struct(s) => {
            let Value::Object(obj) = v else { return false };
            let properties_ok = s.properties.iter().all(|p| match obj.get(&p.name) {
                // after decoding, default-bearing properties are always present
                None => p.optional && !(side == Side::Type && p.default.is_some()),
                Some(Value::Undefined) if p.optional && !p.exact => true,
                Some(x) => conforms(&p.schema, x, side),
            });
            properties_ok
                && obj.iter().filter(|(k, _)| s.property(k).is_none()).all(|(k, x)| {
                    let key = Value::from(k.as_str());
                    s.index_signatures.iter()
                        .filter(|sig| conforms(&sig.key, &key, side))
                        .all(|sig| conforms(&sig.value, x, side))
                })
        }
        Kind::Tuple(t) => {
            let Value::Array(xs) = v else { return false };
            let min_len = t.elements.iter().rposition(|e| !e.optional).map_or(0, |i| i + 1);
            if xs.len() < min_len || (t.rest.is_none() && xs.len() > t.elements.len()) {
                return false;
            }
            xs.iter().enumerate().all(|(i, x)| match t.elements.get(i) {
                Some(e) => conforms(&e.schema, x, side),
                None => t.rest.as_ref().is_some_and(|rest| conforms(rest, x, side)),
            })
        }
        Kind::Union(members) => members.iter().any(|m| conforms(m, v, side)),
        Kind::Suspend(thunk) => conforms(&thunk(), v, side),
    }
}

// --------------------------------- Sides ---------------------------------- //

/// The schema of the decoded representation: transformations collapse to
/// their `to` side, refinements survive.
pub fn type_schema(schema: &Schema) -> Schema {
    side_schema(schema, Side::Type)
}

/// The schema of the external representation: transformations collapse to
/// their `from` side, refinements are dropped.
pub fn encoded_schema(schema: &Schema) -> Schema {
    side_schema(schema, Side::Encoded)
}

fn side_schema(schema: &Schema, side: Side) -> Schema {
    match schema.kind() {
        Kind::Primitive(_) | Kind::Literal(_) => schema.clone(),
        Kind::Declaration(Declared::Option(inner)) => {
            rebuild(schema, Kind::Declaration(Declared::Option(side_schema(inner, side))))
        }
        Kind::Declaration(_) => schema.clone(),
        Kind::Refinement(r) => match side {
            Side::Type => rebuild(schema, Kind::Refinement(Refinement {
                from: side_schema(&r.from, side),
                predicate: r.predicate.clone(),
            })),
            Side::Encoded => side_schema(&r.from, side),
        },
        Kind::Transformation(t) => match side {
            Side::Type => side_schema(&t.to, side),
            Side::Encoded => side_schema(&t.from, side),
        },
        Kind::Struct(s) => rebuild(schema, Kind::Struct(Struct {
            properties: s.properties.iter()
                .map(|p| PropertySignature {
                    name: p.name.clone(),
                    schema: side_schema(&p.schema, side),
                    optional: match side {
                        Side::Type => p.optional && p.default.is_none(),
                        Side::Encoded => p.optional || p.default.is_some(),
                    },
                    exact: p.exact,
                    default: None,
                })
                .collect(),
            index_signatures: s.index_signatures.iter()
                .map(|sig| IndexSignature {
                    key: side_schema(&sig.key, side),
                    value: side_schema(&sig.value, side),
                })
                .collect(),
        })),
        Kind::Tuple(t) => rebuild(schema, Kind::Tuple(Tuple {
            elements: t.elements.iter()
                .map(|e| Element { schema: side_schema(&e.schema, side), optional: e.optional })
                .collect(),
            rest: t.rest.as_ref().map(|r| side_schema(r, side)),
        })),
        Kind::Union(members) => {
            rebuild(schema, Kind::Union(members.iter().map(|m| side_schema(m, side)).collect()))
        }
        Kind::Suspend(thunk) => {
            let thunk = thunk.clone();
            rebuild(schema, Kind::Suspend(Arc::new(move || side_schema(&thunk(), side))))
        }
    }
}

fn rebuild(original: &Schema, kind: Kind) -> Schema {
    Schema::new(kind).annotate(original.annotations().clone())
}

// ---------------------------- Indexed access ------------------------------ //

/// Schema of `T[number]`: the union of every position a tuple or array can
/// hold (plus `undefined` when a position is optional).
pub fn number_indexed_access(schema: &Schema) -> Result<Schema, SchemaError> {
    match schema.kind() {
        Kind::Tuple(t) => {
            let mut members: Vec<Schema> = t.elements.iter().map(|e| e.schema.clone()).collect();
            if let Some(rest) = &t.rest {
                members.push(rest.clone());
            }
            if t.elements.iter().any(|e| e.optional) {
                members.push(undefined());
            }
            Ok(union(members))
        }
        Kind::Union(members) => {
            let members = members.iter().map(number_indexed_access).collect::<Result<Vec<_>, _>>()?;
            Ok(union(members))
        }
        Kind::Refinement(r) => number_indexed_access(&r.from),
        Kind::Suspend(thunk) => number_indexed_access(&thunk()),
        _ => Err(SchemaError::Unsupported { operation: "number_indexed_access", schema: schema.label() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::num::{NUMBER_FROM_STRING, POSITIVE};
    use crate::schema::{array, elem, number, optional_element, optional_with_default, prop, string, struct_, tuple};
    use serde_json::json;

    #[test]
    fn sides_of_a_transformation() {
        let n = NUMBER_FROM_STRING.clone();
        assert_eq!(type_schema(&n).label(), "number");
        assert_eq!(encoded_schema(&n).label(), "string");
    }

    #[test]
    fn refinements_survive_on_the_type_side_only() {
        let p = POSITIVE.clone();
        assert_eq!(type_schema(&p).label(), "Positive");
        assert_eq!(encoded_schema(&p).label(), "number");
        assert!(conforms(&p, &Value::from(-1), Side::Encoded));
        assert!(!conforms(&p, &Value::from(-1), Side::Type));
    }

    #[test]
    fn defaults_are_required_on_the_type_side() {
        let s = struct_(vec![prop("a", string()), optional_with_default("n", number(), || Value::from(1))]);
        let partial = Value::from(json!({"a": "x"}));
        assert!(conforms(&s, &partial, Side::Encoded));
        assert!(!conforms(&s, &partial, Side::Type));
        assert_eq!(type_schema(&s).label(), "{ readonly a: string; readonly n: number }");
        assert_eq!(encoded_schema(&s).label(), "{ readonly a: string; readonly n?: number }");
    }

    #[test]
    fn indexed_access_of_tuples_and_arrays() {
        let t = tuple(vec![elem(string()), optional_element(number())]);
        assert_eq!(number_indexed_access(&t).unwrap().label(), "string | number | undefined");
        assert_eq!(number_indexed_access(&array(number())).unwrap().label(), "number");
        assert!(matches!(
            number_indexed_access(&string()),
            Err(SchemaError::Unsupported { .. })
        ));
    }
}
