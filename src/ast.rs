//! Schema AST.
//!
//! A schema is an immutable tree of tagged nodes. Composition never mutates an
//! existing node: combinators build new `Schema` handles that share subtrees
//! through `Arc`. Every operation (decode, encode, describe, derive) is a
//! single recursive function over `Kind`.
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use ordered_float::OrderedFloat;

use crate::issue::Issue;
use crate::options::ParseOptions;
use crate::value::{format_number, Value};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;
pub type TransformFn = Arc<dyn Fn(Value, &TransformCtx<'_>) -> Transformed + Send + Sync>;
pub type DefaultFn = Arc<dyn Fn() -> Value + Send + Sync>;
pub type Thunk = Arc<dyn Fn() -> Schema + Send + Sync>;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// Cheap-clone handle to an immutable schema node.
#[derive(Clone)]
pub struct Schema(Arc<Node>);

#[derive(Clone)]
pub struct Node {
    pub kind: Kind,
    pub annotations: Annotations,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Annotations {
    pub identifier: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Replaces the rendered subtree of any issue raised by this node.
    pub message: Option<String>,
}

#[derive(Clone)]
pub enum Kind {
    Primitive(Keyword),
    Literal(Vec<Literal>),
    Declaration(Declared),
    Refinement(Refinement),
    Transformation(Transformation),
    Struct(Struct),
    Tuple(Tuple),
    Union(Vec<Schema>),
    Suspend(Thunk),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Keyword {
    String,
    Number,
    Boolean,
    BigInt,
    Symbol,
    Unknown,
    Any,
    Void,
    Undefined,
    Object,
    Never,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Literal {
    String(String),
    Number(OrderedFloat<f64>),
    Boolean(bool),
    BigInt(i128),
    Null,
}

/// Opaque Type-side values with a fixed runtime check.
#[derive(Clone)]
pub enum Declared {
    Duration,
    Date,
    Option(Schema),
}

#[derive(Clone)]
pub struct Refinement {
    pub from: Schema,
    pub predicate: Predicate,
}

#[derive(Clone)]
pub struct Transformation {
    pub from: Schema,
    pub to: Schema,
    pub decode: TransformFn,
    pub encode: TransformFn,
    /// Check the function output against the destination's encoded shape
    /// before handing it on.
    pub strict: bool,
}

#[derive(Clone, Default)]
pub struct Struct {
    pub properties: Vec<PropertySignature>,
    pub index_signatures: Vec<IndexSignature>,
}

#[derive(Clone)]
pub struct PropertySignature {
    pub name: String,
    pub schema: Schema,
    pub optional: bool,
    /// Exact optional properties reject an explicit `undefined`.
    pub exact: bool,
    /// Substituted on decode when the key is absent.
    pub default: Option<DefaultFn>,
}

#[derive(Clone)]
pub struct IndexSignature {
    pub key: Schema,
    pub value: Schema,
}

#[derive(Clone, Default)]
pub struct Tuple {
    pub elements: Vec<Element>,
    pub rest: Option<Schema>,
}

#[derive(Clone)]
pub struct Element {
    pub schema: Schema,
    pub optional: bool,
}

/// What a transformation function hands back: either a finished result or
/// asynchronous work that only the async entry points may wait for.
pub enum Transformed {
    Ready(Result<Value, Issue>),
    Pending(BoxFuture<'static, Result<Value, Issue>>),
}

/// Side information handed to transformation functions.
pub struct TransformCtx<'a> {
    pub options: &'a ParseOptions,
    /// The value the transformation node itself received.
    pub input: &'a Value,
    /// The transformation node, for building issues.
    pub node: &'a Schema,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl Schema {
    pub fn new(kind: Kind) -> Self {
        Schema(Arc::new(Node { kind, annotations: Annotations::default() }))
    }

    pub fn kind(&self) -> &Kind { &self.0.kind }
    pub fn annotations(&self) -> &Annotations { &self.0.annotations }

    pub fn ptr_eq(&self, other: &Schema) -> bool { Arc::ptr_eq(&self.0, &other.0) }

    /// New node with the same kind and the given annotations merged over the
    /// existing ones.
    pub fn annotate(&self, annotations: Annotations) -> Self {
        let current = &self.0.annotations;
        let merged = Annotations {
            identifier: annotations.identifier.or_else(|| current.identifier.clone()),
            title: annotations.title.or_else(|| current.title.clone()),
            description: annotations.description.or_else(|| current.description.clone()),
            message: annotations.message.or_else(|| current.message.clone()),
        };
        Schema(Arc::new(Node { kind: self.0.kind.clone(), annotations: merged }))
    }

    pub fn identifier(&self, identifier: impl Into<String>) -> Self {
        self.annotate(Annotations { identifier: Some(identifier.into()), ..Annotations::default() })
    }

    pub fn title(&self, title: impl Into<String>) -> Self {
        self.annotate(Annotations { title: Some(title.into()), ..Annotations::default() })
    }

    pub fn description(&self, description: impl Into<String>) -> Self {
        self.annotate(Annotations { description: Some(description.into()), ..Annotations::default() })
    }

    pub fn message(&self, message: impl Into<String>) -> Self {
        self.annotate(Annotations { message: Some(message.into()), ..Annotations::default() })
    }

    /// Name used as the heading of issue subtrees.
    pub fn label(&self) -> String {
        let a = self.annotations();
        a.identifier.clone()
            .or_else(|| a.title.clone())
            .unwrap_or_else(|| self.structural())
    }

    /// Name used in "Expected X, actual Y" messages.
    pub fn expected(&self) -> String {
        match self.kind() {
            Kind::Refinement(_) => self.annotations().description.clone().unwrap_or_else(|| self.label()),
            _ => self.label(),
        }
    }

    fn structural(&self) -> String {
        match self.kind() {
            Kind::Primitive(k) => k.name().to_string(),
            Kind::Literal(lits) => lits.iter().map(|l| l.to_string()).collect::<Vec<_>>().join(" | "),
            Kind::Declaration(d) => match d {
                Declared::Duration => "Duration".to_string(),
                Declared::Date => "Date".to_string(),
                Declared::Option(inner) => format!("Option<{}>", inner.label()),
            },
            Kind::Refinement(r) => format!("{{ {} | filter }}", r.from.label()),
            Kind::Transformation(t) => format!("({} <-> {})", t.from.label(), t.to.label()),
            Kind::Struct(s) => s.describe(),
            Kind::Tuple(t) => t.describe(),
            Kind::Union(members) => members.iter().map(|m| m.label()).collect::<Vec<_>>().join(" | "),
            Kind::Suspend(_) => "<suspended schema>".to_string(),
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Schema({})", self.label())
    }
}

impl Keyword {
    pub fn name(self) -> &'static str {
        match self {
            Keyword::String => "string",
            Keyword::Number => "number",
            Keyword::Boolean => "boolean",
            Keyword::BigInt => "bigint",
            Keyword::Symbol => "symbol",
            Keyword::Unknown => "unknown",
            Keyword::Any => "any",
            Keyword::Void => "void",
            Keyword::Undefined => "undefined",
            Keyword::Object => "object",
            Keyword::Never => "never",
        }
    }

    pub fn accepts(self, v: &Value) -> bool {
        match self {
            Keyword::String => matches!(v, Value::String(_)),
            Keyword::Number => matches!(v, Value::Number(_)),
            Keyword::Boolean => matches!(v, Value::Bool(_)),
            Keyword::BigInt => matches!(v, Value::BigInt(_)),
            Keyword::Symbol => matches!(v, Value::Symbol(_)),
            Keyword::Unknown | Keyword::Any => true,
            Keyword::Void | Keyword::Undefined => v.is_undefined(),
            // anything that is not a primitive
            Keyword::Object => matches!(
                v,
                Value::Array(_) | Value::Object(_) | Value::Duration(_) | Value::Date(_) | Value::Option(_)
            ),
            Keyword::Never => false,
        }
    }
}

impl Literal {
    pub fn matches(&self, v: &Value) -> bool {
        match (self, v) {
            (Literal::String(a), Value::String(b)) => a == b,
            (Literal::Number(a), Value::Number(b)) => *a == OrderedFloat(*b),
            (Literal::Boolean(a), Value::Bool(b)) => a == b,
            (Literal::BigInt(a), Value::BigInt(b)) => a == b,
            (Literal::Null, Value::Null) => true,
            _ => false,
        }
    }

    pub fn to_value(&self) -> Value {
        match self {
            Literal::String(s) => Value::String(s.clone()),
            Literal::Number(n) => Value::Number(n.0),
            Literal::Boolean(b) => Value::Bool(*b),
            Literal::BigInt(n) => Value::BigInt(*n),
            Literal::Null => Value::Null,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => f.write_str(&format_number(n.0)),
            other => write!(f, "{}", other.to_value()),
        }
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self { Literal::String(s.to_string()) }
}

impl From<f64> for Literal {
    fn from(n: f64) -> Self { Literal::Number(OrderedFloat(n)) }
}

impl From<i64> for Literal {
    fn from(n: i64) -> Self { Literal::Number(OrderedFloat(n as f64)) }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self { Literal::Boolean(b) }
}

impl Struct {
    pub fn property(&self, name: &str) -> Option<&PropertySignature> {
        self.properties.iter().find(|p| p.name == name)
    }

    fn describe(&self) -> String {
        let mut parts: Vec<String> = self.properties.iter()
            .map(|p| {
                let q = if p.optional { "?" } else { "" };
                format!("readonly {}{q}: {}", property_key(&p.name), p.schema.label())
            })
            .collect();
        parts.extend(self.index_signatures.iter().map(|is| {
            format!("readonly [x: {}]: {}", is.key.label(), is.value.label())
        }));
        if parts.is_empty() {
            "{}".to_string()
        } else {
            format!("{{ {} }}", parts.join("; "))
        }
    }
}

impl Tuple {
    pub fn is_array(&self) -> bool {
        self.elements.is_empty() && self.rest.is_some()
    }

    fn describe(&self) -> String {
        if let (true, Some(rest)) = (self.elements.is_empty(), &self.rest) {
            return format!("ReadonlyArray<{}>", rest.label());
        }
        let mut parts: Vec<String> = self.elements.iter()
            .map(|e| format!("{}{}", e.schema.label(), if e.optional { "?" } else { "" }))
            .collect();
        if let Some(rest) = &self.rest {
            parts.push(format!("...{}[]", rest.label()));
        }
        format!("readonly [{}]", parts.join(", "))
    }
}

impl Transformed {
    pub fn ok(v: Value) -> Self { Transformed::Ready(Ok(v)) }
    pub fn fail(issue: Issue) -> Self { Transformed::Ready(Err(issue)) }

    pub fn pending<F>(fut: F) -> Self
    where
        F: Future<Output = Result<Value, Issue>> + Send + 'static,
    {
        Transformed::Pending(Box::pin(fut))
    }
}

impl From<Result<Value, Issue>> for Transformed {
    fn from(r: Result<Value, Issue>) -> Self { Transformed::Ready(r) }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

// Plain identifiers print bare, anything else JSON-quoted.
fn property_key(name: &str) -> String {
    let mut chars = name.chars();
    let ident = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if ident { name.to_string() } else { Value::from(name).to_string() }
}
