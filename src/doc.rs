//! Schema description documents.
//!
//! A JSON document names a root schema, optional named definitions (which may
//! refer to each other and to themselves) and the parse options to run with:
//!
//! ```json
//! {
//!   "definitions": {
//!     "Category": {
//!       "kind": "struct",
//!       "properties": {
//!         "name": "NonEmptyString",
//!         "subcategories": { "kind": "array", "item": "Category" }
//!       }
//!     }
//!   },
//!   "schema": "Category",
//!   "options": { "errors": "all" }
//! }
//! ```
//!
//! A bare string is a reference: a definition name first, then a built-in.
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use serde::Deserialize;

use crate::ast::{Annotations, IndexSignature, Kind, Literal, PropertySignature, Schema, Struct};
use crate::error::DocError;
use crate::options::ParseOptions;
use crate::path_de;
use crate::schema::{self, arr, bigint, num, option, text, time};
use crate::value::Value;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Document {
    pub schema: SchemaDoc,
    #[serde(default)]
    pub definitions: IndexMap<String, SchemaDoc>,
    #[serde(default)]
    pub options: ParseOptions,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SchemaDoc {
    Named(String),
    Node(Box<NodeDoc>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeDoc {
    #[serde(flatten)]
    pub kind: KindDoc,
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KindDoc {
    Ref { name: String },
    Literal { value: serde_json::Value },
    Literals { values: Vec<serde_json::Value> },
    Union { members: Vec<SchemaDoc> },
    NullOr { value: SchemaDoc },
    UndefinedOr { value: SchemaDoc },
    NullishOr { value: SchemaDoc },
    Struct {
        properties: IndexMap<String, PropertyDoc>,
        #[serde(default)]
        index_signatures: Vec<IndexSignatureDoc>,
    },
    TaggedStruct { tag: String, properties: IndexMap<String, PropertyDoc> },
    Record { key: SchemaDoc, value: SchemaDoc },
    Pick { from: SchemaDoc, keys: Vec<String> },
    Omit { from: SchemaDoc, keys: Vec<String> },
    Partial { from: SchemaDoc },
    Extend { left: SchemaDoc, right: SchemaDoc },
    Tuple {
        elements: Vec<ElementDoc>,
        #[serde(default)]
        rest: Option<SchemaDoc>,
    },
    Array { item: SchemaDoc },
    NonEmptyArray { item: SchemaDoc },
    Head { item: SchemaDoc },
    MinItems { from: SchemaDoc, count: usize },
    MaxItems { from: SchemaDoc, count: usize },
    ItemsCount { from: SchemaDoc, count: usize },
    MinLength { from: SchemaDoc, length: usize },
    MaxLength { from: SchemaDoc, length: usize },
    Length { from: SchemaDoc, length: usize },
    Pattern { from: SchemaDoc, pattern: String },
    StartsWith { from: SchemaDoc, prefix: String },
    EndsWith { from: SchemaDoc, suffix: String },
    Split { separator: String },
    GreaterThan { from: SchemaDoc, value: f64 },
    GreaterThanOrEqualTo { from: SchemaDoc, value: f64 },
    LessThan { from: SchemaDoc, value: f64 },
    LessThanOrEqualTo { from: SchemaDoc, value: f64 },
    Between { from: SchemaDoc, min: f64, max: f64 },
    Clamp { from: SchemaDoc, min: f64, max: f64 },
    Compose { from: SchemaDoc, to: SchemaDoc },
    OptionFromSelf { value: SchemaDoc },
    OptionFromNullOr { value: SchemaDoc },
    OptionFromUndefinedOr { value: SchemaDoc },
    OptionFromNullishOr {
        value: SchemaDoc,
        #[serde(default)]
        none: NoneEncoding,
    },
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoneEncoding {
    #[default]
    Null,
    Undefined,
}

/// Either a bare schema or the full signature. A `?` suffix on the property
/// name also marks it optional.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PropertyDoc {
    Full(FullPropertyDoc),
    Schema(SchemaDoc),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FullPropertyDoc {
    pub schema: SchemaDoc,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub exact: bool,
    /// Decoding default for an absent key; implies `optional`.
    #[serde(default)]
    pub default: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IndexSignatureDoc {
    pub key: SchemaDoc,
    pub value: SchemaDoc,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ElementDoc {
    Full {
        schema: SchemaDoc,
        #[serde(default)]
        optional: bool,
    },
    Schema(SchemaDoc),
}

/// A resolved document.
#[derive(Debug, Clone)]
pub struct Loaded {
    pub schema: Schema,
    pub options: ParseOptions,
}

type Table = Arc<OnceCell<IndexMap<String, Schema>>>;

struct Resolver {
    names: HashSet<String>,
    table: Table,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

pub fn load_str(src: &str) -> Result<Loaded, DocError> {
    path_de::from_str_with_path::<Document>(src)?.resolve()
}

pub fn load_file(path: impl AsRef<Path>) -> Result<Loaded, DocError> {
    let bytes = std::fs::read(path)?;
    path_de::from_slice_with_path::<Document>(&bytes)?.resolve()
}

impl Document {
    /// Build every definition, then the root. Every name is checked before
    /// anything is evaluated, so an unknown reference fails here rather than
    /// at decode time. So is a cycle of definitions that never steps into a
    /// nested value.
    pub fn resolve(&self) -> Result<Loaded, DocError> {
        self.check_cycles()?;
        let resolver = Resolver {
            names: self.definitions.keys().cloned().collect(),
            table: Table::default(),
        };
        let mut built = IndexMap::with_capacity(self.definitions.len());
        for (name, doc) in &self.definitions {
            let schema = resolver.resolve(doc)?;
            let a = schema.annotations();
            let schema = if a.identifier.is_none() && a.title.is_none() { schema.identifier(name) } else { schema };
            built.insert(name.clone(), schema);
        }
        let schema = resolver.resolve(&self.schema)?;
        // the cell is fresh, so this is the only write
        let _ = resolver.table.set(built);
        tracing::debug!(schema = %schema, definitions = self.definitions.len(), "resolved schema document");
        Ok(Loaded { schema, options: self.options })
    }

    fn check_cycles(&self) -> Result<(), DocError> {
        let edges: HashMap<&str, Vec<&str>> = self.definitions.iter()
            .map(|(name, doc)| {
                let mut out = Vec::new();
                in_place(doc, &mut out);
                out.retain(|n| self.definitions.contains_key(*n));
                (name.as_str(), out)
            })
            .collect();
        let mut done = HashSet::new();
        for name in self.definitions.keys() {
            visit(name, &edges, &mut Vec::new(), &mut done)?;
        }
        Ok(())
    }
}

impl Resolver {
    fn resolve(&self, doc: &SchemaDoc) -> Result<Schema, DocError> {
        match doc {
            SchemaDoc::Named(name) => self.named(name),
            SchemaDoc::Node(node) => {
                let schema = self.kind(&node.kind)?;
                Ok(schema.annotate(Annotations {
                    identifier: node.identifier.clone(),
                    title: node.title.clone(),
                    description: node.description.clone(),
                    message: node.message.clone(),
                }))
            }
        }
    }

    fn named(&self, name: &str) -> Result<Schema, DocError> {
        if self.names.contains(name) {
            let table = self.table.clone();
            let key = name.to_string();
            let reference = schema::suspend(move || {
                table.get().and_then(|t| t.get(&key)).cloned().unwrap_or_else(schema::never)
            });
            return Ok(reference.identifier(name));
        }
        builtin(name).ok_or_else(|| DocError::UnknownName(name.to_string()))
    }

    fn all(&self, docs: &[SchemaDoc]) -> Result<Vec<Schema>, DocError> {
        docs.iter().map(|d| self.resolve(d)).collect()
    }

    fn properties(&self, docs: &IndexMap<String, PropertyDoc>) -> Result<Vec<PropertySignature>, DocError> {
        let mut out = Vec::with_capacity(docs.len());
        for (raw, doc) in docs {
            let (name, suffixed) = match raw.strip_suffix('?') {
                Some(name) => (name, true),
                None => (raw.as_str(), false),
            };
            let signature = match doc {
                PropertyDoc::Schema(s) => {
                    let schema = self.resolve(s)?;
                    if suffixed { schema::optional(name, schema) } else { schema::prop(name, schema) }
                }
                PropertyDoc::Full(full) => {
                    let schema = self.resolve(&full.schema)?;
                    match &full.default {
                        Some(json) => {
                            let default = Value::from(json.clone());
                            schema::optional_with_default(name, schema, move || default.clone())
                        }
                        None => PropertySignature {
                            optional: full.optional || suffixed,
                            exact: full.exact,
                            ..schema::prop(name, schema)
                        },
                    }
                }
            };
            out.push(signature);
        }
        Ok(out)
    }

    fn kind(&self, kind: &KindDoc) -> Result<Schema, DocError> {
        let schema = match kind {
            KindDoc::Ref { name } => self.named(name)?,
            KindDoc::Literal { value } => schema::literals(vec![literal(value)?]),
            KindDoc::Literals { values } => {
                schema::literals(values.iter().map(literal).collect::<Result<Vec<_>, _>>()?)
            }
            KindDoc::Union { members } => schema::union(self.all(members)?),
            KindDoc::NullOr { value } => schema::null_or(self.resolve(value)?),
            KindDoc::UndefinedOr { value } => schema::undefined_or(self.resolve(value)?),
            KindDoc::NullishOr { value } => schema::nullish_or(self.resolve(value)?),
            KindDoc::Struct { properties, index_signatures } => {
                let index_signatures = index_signatures.iter()
                    .map(|sig| Ok(IndexSignature { key: self.resolve(&sig.key)?, value: self.resolve(&sig.value)? }))
                    .collect::<Result<Vec<_>, DocError>>()?;
                Schema::new(Kind::Struct(Struct { properties: self.properties(properties)?, index_signatures }))
            }
            KindDoc::TaggedStruct { tag, properties } => schema::tagged_struct(tag, self.properties(properties)?),
            KindDoc::Record { key, value } => schema::record(self.resolve(key)?, self.resolve(value)?),
            KindDoc::Pick { from, keys } => {
                let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
                schema::pick(&self.resolve(from)?, &keys)?
            }
            KindDoc::Omit { from, keys } => {
                let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
                schema::omit(&self.resolve(from)?, &keys)?
            }
            KindDoc::Partial { from } => schema::partial(&self.resolve(from)?)?,
            KindDoc::Extend { left, right } => schema::extend(&self.resolve(left)?, &self.resolve(right)?)?,
            KindDoc::Tuple { elements, rest } => {
                let elements = elements.iter()
                    .map(|e| match e {
                        ElementDoc::Full { schema, optional } => {
                            let schema = self.resolve(schema)?;
                            Ok(if *optional { schema::optional_element(schema) } else { schema::elem(schema) })
                        }
                        ElementDoc::Schema(s) => Ok(schema::elem(self.resolve(s)?)),
                    })
                    .collect::<Result<Vec<_>, DocError>>()?;
                match rest {
                    Some(rest) => schema::tuple_with_rest(elements, self.resolve(rest)?),
                    None => schema::tuple(elements),
                }
            }
            KindDoc::Array { item } => schema::array(self.resolve(item)?),
            KindDoc::NonEmptyArray { item } => schema::non_empty_array(self.resolve(item)?),
            KindDoc::Head { item } => arr::head(self.resolve(item)?),
            KindDoc::MinItems { from, count } => arr::min_items(&self.resolve(from)?, *count),
            KindDoc::MaxItems { from, count } => arr::max_items(&self.resolve(from)?, *count),
            KindDoc::ItemsCount { from, count } => arr::items_count(&self.resolve(from)?, *count),
            KindDoc::MinLength { from, length } => text::min_length(&self.resolve(from)?, *length),
            KindDoc::MaxLength { from, length } => text::max_length(&self.resolve(from)?, *length),
            KindDoc::Length { from, length } => text::length(&self.resolve(from)?, *length),
            KindDoc::Pattern { from, pattern } => text::pattern(&self.resolve(from)?, pattern)?,
            KindDoc::StartsWith { from, prefix } => text::starts_with(&self.resolve(from)?, prefix),
            KindDoc::EndsWith { from, suffix } => text::ends_with(&self.resolve(from)?, suffix),
            KindDoc::Split { separator } => text::split(separator),
            KindDoc::GreaterThan { from, value } => num::greater_than(&self.resolve(from)?, *value),
            KindDoc::GreaterThanOrEqualTo { from, value } => {
                num::greater_than_or_equal_to(&self.resolve(from)?, *value)
            }
            KindDoc::LessThan { from, value } => num::less_than(&self.resolve(from)?, *value),
            KindDoc::LessThanOrEqualTo { from, value } => num::less_than_or_equal_to(&self.resolve(from)?, *value),
            KindDoc::Between { from, min, max } => num::between(&self.resolve(from)?, *min, *max),
            KindDoc::Clamp { from, min, max } => num::clamp(&self.resolve(from)?, *min, *max),
            KindDoc::Compose { from, to } => schema::compose(self.resolve(from)?, self.resolve(to)?),
            KindDoc::OptionFromSelf { value } => option::option_from_self(self.resolve(value)?),
            KindDoc::OptionFromNullOr { value } => option::option_from_null_or(self.resolve(value)?),
            KindDoc::OptionFromUndefinedOr { value } => option::option_from_undefined_or(self.resolve(value)?),
            KindDoc::OptionFromNullishOr { value, none } => {
                let none = match none {
                    NoneEncoding::Null => Value::Null,
                    NoneEncoding::Undefined => Value::Undefined,
                };
                option::option_from_nullish_or(self.resolve(value)?, none)
            }
        };
        Ok(schema)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn literal(json: &serde_json::Value) -> Result<Literal, DocError> {
    match json {
        serde_json::Value::String(s) => Ok(Literal::from(s.as_str())),
        serde_json::Value::Bool(b) => Ok(Literal::from(*b)),
        serde_json::Value::Null => Ok(Literal::Null),
        serde_json::Value::Number(n) => n.as_f64().map(Literal::from).ok_or_else(|| DocError::InvalidLiteral(json.clone())),
        other => Err(DocError::InvalidLiteral(other.clone())),
    }
}

fn visit<'a>(
    name: &'a str,
    edges: &HashMap<&'a str, Vec<&'a str>>,
    chain: &mut Vec<&'a str>,
    done: &mut HashSet<&'a str>,
) -> Result<(), DocError> {
    if done.contains(name) {
        return Ok(());
    }
    if let Some(start) = chain.iter().position(|n| *n == name) {
        let mut cycle = chain[start..].to_vec();
        cycle.push(name);
        return Err(DocError::ReferenceCycle(cycle.join(" -> ")));
    }
    chain.push(name);
    for next in edges.get(name).into_iter().flatten() {
        visit(*next, edges, chain, done)?;
    }
    chain.pop();
    done.insert(name);
    Ok(())
}

/// Names evaluated against the same input, before any element, property or
/// option payload is stepped into.
fn in_place<'a>(doc: &'a SchemaDoc, out: &mut Vec<&'a str>) {
    let node = match doc {
        SchemaDoc::Named(name) => return out.push(name),
        SchemaDoc::Node(node) => node,
    };
    match &node.kind {
        KindDoc::Ref { name } => out.push(name),
        KindDoc::Union { members } => members.iter().for_each(|m| in_place(m, out)),
        KindDoc::NullOr { value }
        | KindDoc::UndefinedOr { value }
        | KindDoc::NullishOr { value }
        | KindDoc::OptionFromNullOr { value }
        | KindDoc::OptionFromUndefinedOr { value }
        | KindDoc::OptionFromNullishOr { value, .. } => in_place(value, out),
        KindDoc::Pick { from, .. }
        | KindDoc::Omit { from, .. }
        | KindDoc::Partial { from }
        | KindDoc::MinItems { from, .. }
        | KindDoc::MaxItems { from, .. }
        | KindDoc::ItemsCount { from, .. }
        | KindDoc::MinLength { from, .. }
        | KindDoc::MaxLength { from, .. }
        | KindDoc::Length { from, .. }
        | KindDoc::Pattern { from, .. }
        | KindDoc::StartsWith { from, .. }
        | KindDoc::EndsWith { from, .. }
        | KindDoc::GreaterThan { from, .. }
        | KindDoc::GreaterThanOrEqualTo { from, .. }
        | KindDoc::LessThan { from, .. }
        | KindDoc::LessThanOrEqualTo { from, .. }
        | KindDoc::Between { from, .. }
        | KindDoc::Clamp { from, .. } => in_place(from, out),
        KindDoc::Extend { left: a, right: b } | KindDoc::Compose { from: a, to: b } => {
            in_place(a, out);
            in_place(b, out);
        }
        _ => {}
    }
}

/// Schemas reachable by bare name.
pub fn builtin(name: &str) -> Option<Schema> {
    let schema = match name {
        "string" => schema::string(),
        "number" => schema::number(),
        "boolean" => schema::boolean(),
        "bigint" => schema::bigint(),
        "symbol" => schema::symbol(),
        "unknown" => schema::unknown(),
        "any" => schema::any(),
        "void" => schema::void(),
        "undefined" => schema::undefined(),
        "object" => schema::object(),
        "never" => schema::never(),
        "null" => schema::null(),
        "NumberFromString" => num::NUMBER_FROM_STRING.clone(),
        "Finite" => num::FINITE.clone(),
        "Int" => num::INT.clone(),
        "Positive" => num::POSITIVE.clone(),
        "Negative" => num::NEGATIVE.clone(),
        "NonNegative" => num::NON_NEGATIVE.clone(),
        "NonPositive" => num::NON_POSITIVE.clone(),
        "NonNegativeInt" => num::NON_NEGATIVE_INT.clone(),
        "Trim" => text::TRIM.clone(),
        "Trimmed" => text::TRIMMED.clone(),
        "NonEmptyString" => text::NON_EMPTY_STRING.clone(),
        "Lowercase" => text::LOWERCASE.clone(),
        "Lowercased" => text::LOWERCASED.clone(),
        "Uppercase" => text::UPPERCASE.clone(),
        "Uppercased" => text::UPPERCASED.clone(),
        "BigIntFromString" => bigint::BIGINT_FROM_STRING.clone(),
        "BigIntFromNumber" => bigint::BIGINT_FROM_NUMBER.clone(),
        "HRTime" => time::HRTIME.clone(),
        "Duration" => time::DURATION.clone(),
        "DurationFromSelf" => time::DURATION_FROM_SELF.clone(),
        "DurationFromMillis" => time::DURATION_FROM_MILLIS.clone(),
        "DurationFromNanos" => time::DURATION_FROM_NANOS.clone(),
        "Date" => time::DATE.clone(),
        "DateFromString" => time::DATE_FROM_STRING.clone(),
        "DateFromSelf" => time::DATE_FROM_SELF.clone(),
        _ => return None,
    };
    Some(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ErrorMode;
    use crate::parser::{decode_either, encode_either};
    use serde_json::json;

    fn load(doc: serde_json::Value) -> Loaded {
        load_str(&doc.to_string()).unwrap()
    }

    #[test]
    fn recursive_definitions_resolve_lazily() {
        let loaded = load(json!({
            "definitions": {
                "Category": {
                    "kind": "struct",
                    "properties": {
                        "name": "string",
                        "subcategories": { "kind": "array", "item": "Category" }
                    }
                }
            },
            "schema": "Category",
            "options": { "errors": "all" }
        }));
        assert_eq!(loaded.options.errors, ErrorMode::All);
        let input = Value::from(json!({"name": "a", "subcategories": [{"name": "b", "subcategories": []}]}));
        assert_eq!(decode_either(&loaded.schema, &input, &loaded.options).unwrap(), input);

        let bad = Value::from(json!({"name": "a", "subcategories": [{"name": 1, "subcategories": []}]}));
        let err = decode_either(&loaded.schema, &bad, &loaded.options).unwrap_err();
        let expected = "Category
└─ [\"subcategories\"]
   └─ ReadonlyArray<Category>
      └─ [0]
         └─ Category
            └─ [\"name\"]
               └─ Expected string, actual 1";
        assert_eq!(err.render(), expected);
    }

    #[test]
    fn property_forms() {
        let loaded = load(json!({
            "schema": {
                "kind": "struct",
                "identifier": "Settings",
                "properties": {
                    "host": "string",
                    "port?": "NumberFromString",
                    "retries": { "schema": "number", "default": 3 },
                    "tag": { "kind": "literals", "values": ["a", "b"] }
                }
            }
        }));
        let out = decode_either(&loaded.schema, &Value::from(json!({"host": "h", "tag": "a"})), &loaded.options).unwrap();
        assert_eq!(out, Value::from(json!({"host": "h", "retries": 3, "tag": "a"})));
        let out = decode_either(&loaded.schema, &Value::from(json!({"host": "h", "port": "80", "tag": "b"})), &loaded.options)
            .unwrap();
        assert_eq!(out, Value::from(json!({"host": "h", "port": 80, "retries": 3, "tag": "b"})));
        assert_eq!(
            encode_either(&loaded.schema, &out, &loaded.options).unwrap(),
            Value::from(json!({"host": "h", "port": "80", "retries": 3, "tag": "b"}))
        );
    }

    #[test]
    fn annotations_and_refinements() {
        let loaded = load(json!({
            "schema": {
                "kind": "min_length",
                "from": "string",
                "length": 2,
                "message": "too short"
            }
        }));
        let err = decode_either(&loaded.schema, &Value::from("a"), &loaded.options).unwrap_err();
        assert_eq!(err.render(), "too short");
    }

    #[test]
    fn unknown_names_fail_up_front() {
        let err = load_str(r#"{"schema": {"kind": "array", "item": "Nope"}}"#).unwrap_err();
        assert!(matches!(err, DocError::UnknownName(ref n) if n == "Nope"));
    }

    #[test]
    fn self_referencing_aliases_are_rejected() {
        let cycle = |src: &str| match load_str(src) {
            Err(DocError::ReferenceCycle(chain)) => chain,
            other => panic!("expected a reference cycle, got {other:?}"),
        };
        assert_eq!(cycle(r#"{"definitions": {"A": "A"}, "schema": "A"}"#), "A -> A");
        assert_eq!(
            cycle(r#"{"definitions": {"A": "B", "B": {"kind": "ref", "name": "A"}}, "schema": "string"}"#),
            "A -> B -> A"
        );
        assert_eq!(
            cycle(r#"{"definitions": {"A": {"kind": "union", "members": ["string", {"kind": "min_length", "from": "A", "length": 1}]}}, "schema": "A"}"#),
            "A -> A"
        );
    }

    #[test]
    fn cycles_through_nested_values_still_load() {
        let loaded = load(json!({
            "definitions": {
                "Tree": { "kind": "union", "members": ["number", { "kind": "array", "item": "Tree" }] }
            },
            "schema": "Tree"
        }));
        let input = Value::from(json!([1, [2, []]]));
        assert_eq!(decode_either(&loaded.schema, &input, &loaded.options).unwrap(), input);
    }

    #[test]
    fn structural_errors_carry_the_path() {
        let err = load_str(r#"{"schema": "string", "options": {"errors": "sometimes"}}"#).unwrap_err();
        match err {
            DocError::Parse { path, .. } => assert_eq!(path, "options.errors"),
            other => panic!("expected a parse error, got {other}"),
        }
    }

    #[test]
    fn invalid_literals_are_rejected() {
        let err = load_str(r#"{"schema": {"kind": "literal", "value": [1]}}"#).unwrap_err();
        assert!(matches!(err, DocError::InvalidLiteral(_)));
    }
}
