use std::sync::Arc;

use crate::ast::{IndexSignature, Kind, PropertySignature, Schema, Struct};
use crate::error::SchemaError;
use crate::value::Value;

use super::literal;

// ----------------------------- Property signatures ------------------------- //

pub fn prop(name: impl Into<String>, schema: Schema) -> PropertySignature {
    PropertySignature { name: name.into(), schema, optional: false, exact: false, default: None }
}

/// May be absent or explicitly `undefined`.
pub fn optional(name: impl Into<String>, schema: Schema) -> PropertySignature {
    PropertySignature { optional: true, ..prop(name, schema) }
}

/// May be absent, but never explicitly `undefined`.
pub fn optional_exact(name: impl Into<String>, schema: Schema) -> PropertySignature {
    PropertySignature { optional: true, exact: true, ..prop(name, schema) }
}

/// Absent on the Encoded side, always present after decoding.
pub fn optional_with_default<F>(name: impl Into<String>, schema: Schema, default: F) -> PropertySignature
where
    F: Fn() -> Value + Send + Sync + 'static,
{
    PropertySignature { optional: true, default: Some(Arc::new(default)), ..prop(name, schema) }
}

// --------------------------------- Structs -------------------------------- //

pub fn struct_(properties: Vec<PropertySignature>) -> Schema {
    Schema::new(Kind::Struct(Struct { properties, index_signatures: Vec::new() }))
}

pub fn record(key: Schema, value: Schema) -> Schema {
    Schema::new(Kind::Struct(Struct {
        properties: Vec::new(),
        index_signatures: vec![IndexSignature { key, value }],
    }))
}

/// Struct with a leading `_tag` literal property.
pub fn tagged_struct(tag: &str, properties: Vec<PropertySignature>) -> Schema {
    let mut all = vec![prop("_tag", literal(tag))];
    all.extend(properties);
    struct_(all)
}

fn as_struct<'a>(schema: &'a Schema, operation: &'static str) -> Result<&'a Struct, SchemaError> {
    match schema.kind() {
        Kind::Struct(s) => Ok(s),
        _ => Err(SchemaError::Unsupported { operation, schema: schema.label() }),
    }
}

fn with_properties(s: &Struct, properties: Vec<PropertySignature>) -> Schema {
    Schema::new(Kind::Struct(Struct { properties, index_signatures: s.index_signatures.clone() }))
}

pub fn pick(schema: &Schema, keys: &[&str]) -> Result<Schema, SchemaError> {
    let s = as_struct(schema, "pick")?;
    let mut picked = Vec::with_capacity(keys.len());
    for key in keys {
        let p = s.property(key).ok_or_else(|| SchemaError::UnknownProperty {
            operation: "pick",
            name: key.to_string(),
        })?;
        picked.push(p.clone());
    }
    Ok(with_properties(s, picked))
}

pub fn omit(schema: &Schema, keys: &[&str]) -> Result<Schema, SchemaError> {
    let s = as_struct(schema, "omit")?;
    let kept = s.properties.iter().filter(|p| !keys.contains(&p.name.as_str())).cloned().collect();
    Ok(with_properties(s, kept))
}

/// Every property becomes optional; defaults are dropped.
pub fn partial(schema: &Schema) -> Result<Schema, SchemaError> {
    let s = as_struct(schema, "partial")?;
    let props = s.properties.iter()
        .map(|p| PropertySignature { optional: true, default: None, ..p.clone() })
        .collect();
    Ok(with_properties(s, props))
}

/// Union of both structs' properties and index signatures. Overlapping
/// property names are rejected.
pub fn extend(a: &Schema, b: &Schema) -> Result<Schema, SchemaError> {
    let (sa, sb) = (as_struct(a, "extend")?, as_struct(b, "extend")?);
    let mut properties = sa.properties.clone();
    for p in &sb.properties {
        if sa.property(&p.name).is_some() {
            return Err(SchemaError::DuplicateProperty(p.name.clone()));
        }
        properties.push(p.clone());
    }
    let mut index_signatures = sa.index_signatures.clone();
    index_signatures.extend(sb.index_signatures.iter().cloned());
    Ok(Schema::new(Kind::Struct(Struct { properties, index_signatures })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ParseOptions;
    use crate::parser::decode_either;
    use crate::schema::{number, string};
    use serde_json::json;

    fn person() -> Schema {
        struct_(vec![prop("name", string()), prop("age", number())])
    }

    #[test]
    fn pick_omit_partial() {
        assert_eq!(pick(&person(), &["age"]).unwrap().label(), "{ readonly age: number }");
        assert_eq!(omit(&person(), &["age"]).unwrap().label(), "{ readonly name: string }");
        assert_eq!(
            partial(&person()).unwrap().label(),
            "{ readonly name?: string; readonly age?: number }"
        );
        assert!(matches!(
            pick(&person(), &["nope"]),
            Err(SchemaError::UnknownProperty { .. })
        ));
        assert!(matches!(pick(&string(), &["a"]), Err(SchemaError::Unsupported { .. })));
    }

    #[test]
    fn extend_rejects_duplicates() {
        let extra = struct_(vec![prop("email", string())]);
        let both = extend(&person(), &extra).unwrap();
        assert_eq!(both.label(), "{ readonly name: string; readonly age: number; readonly email: string }");
        assert_eq!(
            extend(&person(), &person()).unwrap_err(),
            SchemaError::DuplicateProperty("name".into())
        );
    }

    #[test]
    fn exact_optional_rejects_undefined() {
        let o = ParseOptions::default();
        let loose = struct_(vec![optional("a", number())]);
        let exact = struct_(vec![optional_exact("a", number())]);
        let input = Value::object([("a", Value::Undefined)]);
        assert!(decode_either(&loose, &input, &o).is_ok());
        let err = decode_either(&exact, &input, &o).unwrap_err();
        assert_eq!(err.render(), "{ readonly a?: number }\n└─ [\"a\"]\n   └─ Expected number, actual undefined");
    }

    #[test]
    fn tagged_struct_checks_the_tag() {
        let circle = tagged_struct("Circle", vec![prop("radius", number())]);
        let o = ParseOptions::default();
        assert!(decode_either(&circle, &Value::from(json!({"_tag": "Circle", "radius": 1})), &o).is_ok());
        let err = decode_either(&circle, &Value::from(json!({"_tag": "Square", "radius": 1})), &o).unwrap_err();
        assert_eq!(
            err.render(),
            "{ readonly _tag: \"Circle\"; readonly radius: number }\n└─ [\"_tag\"]\n   └─ Expected \"Circle\", actual \"Square\""
        );
    }
}
