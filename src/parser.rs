//! Decode / encode / validate pipeline.
//!
//! One recursive evaluator interprets every node kind for both directions.
//! The evaluator is asynchronous so that transformation functions may hand
//! back pending work; the synchronous entry points drive it with a single
//! poll and never wait: pending work reached in synchronous mode becomes a
//! `Forbidden` issue on the transformation that produced it.
use std::task::{Context, Poll, Waker};

use tracing::{debug, trace};

use crate::ast::{
    BoxFuture, Declared, Kind, Refinement, Schema, Struct, TransformCtx, TransformFn, Transformed,
    Tuple,
};
use crate::derive::{conforms, type_schema, Side};
use crate::error::ParseError;
use crate::issue::{Issue, IssueKind, MemberIssue, PathSegment, RefinementKind, TransformationKind};
use crate::options::{ExcessProperty, ParseOptions};
use crate::value::{Object, Value};

pub type ParseResult = Result<Value, Issue>;

// ————————————————————————————————————————————————————————————————————————————
// ENTRY POINTS
// ————————————————————————————————————————————————————————————————————————————

/// Decode, surfacing the issue tree as data.
pub fn decode_either(schema: &Schema, input: &Value, options: &ParseOptions) -> ParseResult {
    run_sync(schema, input, &Run::new(options, Direction::Decode))
}

/// Decode, surfacing failure as a `ParseError` carrying the rendered tree.
pub fn decode_sync(schema: &Schema, input: &Value, options: &ParseOptions) -> Result<Value, ParseError> {
    decode_either(schema, input, options).map_err(ParseError::from)
}

pub fn decode_option(schema: &Schema, input: &Value, options: &ParseOptions) -> Option<Value> {
    decode_either(schema, input, options).ok()
}

/// Decode, awaiting any asynchronous transformation along the way.
pub async fn decode(schema: &Schema, input: &Value, options: &ParseOptions) -> Result<Value, ParseError> {
    let run = Run::new(options, Direction::Decode).asynchronous();
    go(schema, input, &run).await.map_err(ParseError::from)
}

pub fn encode_either(schema: &Schema, input: &Value, options: &ParseOptions) -> ParseResult {
    run_sync(schema, input, &Run::new(options, Direction::Encode))
}

pub fn encode_sync(schema: &Schema, input: &Value, options: &ParseOptions) -> Result<Value, ParseError> {
    encode_either(schema, input, options).map_err(ParseError::from)
}

pub fn encode_option(schema: &Schema, input: &Value, options: &ParseOptions) -> Option<Value> {
    encode_either(schema, input, options).ok()
}

pub async fn encode(schema: &Schema, input: &Value, options: &ParseOptions) -> Result<Value, ParseError> {
    let run = Run::new(options, Direction::Encode).asynchronous();
    go(schema, input, &run).await.map_err(ParseError::from)
}

/// Check a Type-side value against the schema's type side.
pub fn validate_either(schema: &Schema, input: &Value, options: &ParseOptions) -> ParseResult {
    decode_either(&type_schema(schema), input, options)
}

pub fn validate_sync(schema: &Schema, input: &Value, options: &ParseOptions) -> Result<Value, ParseError> {
    validate_either(schema, input, options).map_err(ParseError::from)
}

pub fn validate_option(schema: &Schema, input: &Value, options: &ParseOptions) -> Option<Value> {
    validate_either(schema, input, options).ok()
}

pub async fn validate(schema: &Schema, input: &Value, options: &ParseOptions) -> Result<Value, ParseError> {
    decode(&type_schema(schema), input, options).await
}

/// Type guard: does the value already conform to the schema's type side?
pub fn is(schema: &Schema, input: &Value) -> bool {
    conforms(schema, input, Side::Type)
}

// ————————————————————————————————————————————————————————————————————————————
// EVALUATOR
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Decode,
    Encode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Sync,
    Async,
}

/// Per-call state. Nothing here is shared between calls.
struct Run {
    options: ParseOptions,
    direction: Direction,
    mode: Mode,
}

impl Run {
    fn new(options: &ParseOptions, direction: Direction) -> Self {
        Run { options: *options, direction, mode: Mode::Sync }
    }

    fn asynchronous(self) -> Self {
        Run { mode: Mode::Async, ..self }
    }

    /// Which side of a schema the input of this run lives on.
    fn input_side(&self) -> Side {
        match self.direction {
            Direction::Decode => Side::Encoded,
            Direction::Encode => Side::Type,
        }
    }
}

fn run_sync(schema: &Schema, input: &Value, run: &Run) -> ParseResult {
    let mut fut = go(schema, input, run);
    let mut cx = Context::from_waker(Waker::noop());
    match fut.as_mut().poll(&mut cx) {
        Poll::Ready(result) => result,
        // unreachable in practice: synchronous runs never await pending work
        Poll::Pending => Err(Issue::forbidden(schema, input)),
    }
}

fn go<'a>(node: &'a Schema, input: &'a Value, run: &'a Run) -> BoxFuture<'a, ParseResult> {
    Box::pin(eval(node, input, run))
}

async fn eval(node: &Schema, input: &Value, run: &Run) -> ParseResult {
    match node.kind() {
        Kind::Primitive(keyword) => {
            if keyword.accepts(input) { Ok(input.clone()) } else { Err(Issue::type_mismatch(node, input)) }
        }
        Kind::Literal(lits) => {
            if lits.iter().any(|l| l.matches(input)) { Ok(input.clone()) } else { Err(Issue::type_mismatch(node, input)) }
        }
        Kind::Declaration(declared) => parse_declaration(node, declared, input, run).await,
        Kind::Refinement(r) => parse_refinement(node, r, input, run).await,
        Kind::Transformation(t) => {
            let (first, function, last, first_kind, last_kind) = match run.direction {
                Direction::Decode => (&t.from, &t.decode, &t.to, TransformationKind::Encoded, TransformationKind::Type),
                Direction::Encode => (&t.to, &t.encode, &t.from, TransformationKind::Type, TransformationKind::Encoded),
            };
            let intermediate = go(first, input, run).await
                .map_err(|e| transformation_failure(node, input, first_kind, e))?;
            let out = apply(function, intermediate, node, input, run).await?;
            // the next leg receives `out` on its input side
            if t.strict && !conforms(last, &out, run.input_side()) {
                return Err(transformation_failure(
                    node,
                    input,
                    TransformationKind::Transformation,
                    Issue::type_mismatch(last, &out),
                ));
            }
            go(last, &out, run).await.map_err(|e| transformation_failure(node, input, last_kind, e))
        }
        Kind::Struct(s) => parse_struct(node, s, input, run).await,
        Kind::Tuple(t) => parse_tuple(node, t, input, run).await,
        Kind::Union(members) => parse_union(node, members, input, run).await,
        Kind::Suspend(thunk) => {
            let resolved = thunk();
            trace!(schema = %resolved, "resolved suspended schema");
            go(&resolved, input, run).await
        }
    }
}

async fn parse_declaration(node: &Schema, declared: &Declared, input: &Value, run: &Run) -> ParseResult {
    match (declared, input) {
        (Declared::Duration, Value::Duration(_)) | (Declared::Date, Value::Date(_)) => Ok(input.clone()),
        (Declared::Option(_), Value::Option(None)) => Ok(input.clone()),
        (Declared::Option(inner), Value::Option(Some(v))) => match go(inner, v, run).await {
            Ok(out) => Ok(Value::some(out)),
            Err(e) => Err(Issue::Composite {
                node: node.clone(),
                actual: input.clone(),
                issues: vec![e],
                output: None,
            }),
        },
        _ => Err(Issue::type_mismatch(node, input)),
    }
}

async fn parse_refinement(node: &Schema, r: &Refinement, input: &Value, run: &Run) -> ParseResult {
    let failed = |checked: &Value| Issue::Refinement {
        node: node.clone(),
        actual: input.clone(),
        kind: RefinementKind::Predicate,
        issue: Box::new(Issue::type_mismatch(node, checked)),
    };
    // the predicate always sees the Type-side value
    if run.direction == Direction::Encode && !(r.predicate)(input) {
        return Err(failed(input));
    }
    let out = go(&r.from, input, run).await.map_err(|e| Issue::Refinement {
        node: node.clone(),
        actual: input.clone(),
        kind: RefinementKind::From,
        issue: Box::new(e),
    })?;
    match run.direction {
        Direction::Decode if !(r.predicate)(&out) => Err(failed(&out)),
        _ => Ok(out),
    }
}

async fn apply(function: &TransformFn, value: Value, node: &Schema, input: &Value, run: &Run) -> ParseResult {
    let transformed = {
        let ctx = TransformCtx { options: &run.options, input, node };
        function(value, &ctx)
    };
    let result = match transformed {
        Transformed::Ready(result) => result,
        Transformed::Pending(fut) => match run.mode {
            Mode::Async => fut.await,
            Mode::Sync => {
                debug!(schema = %node, "asynchronous transformation reached from a synchronous entry point");
                return Err(Issue::forbidden(node, input));
            }
        },
    };
    result.map_err(|e| match e {
        Issue::Forbidden { .. } => e,
        other => transformation_failure(node, input, TransformationKind::Transformation, other),
    })
}

async fn parse_struct(node: &Schema, s: &Struct, input: &Value, run: &Run) -> ParseResult {
    let Value::Object(obj) = input else {
        return Err(Issue::type_mismatch(node, input));
    };
    let collect_all = run.options.collect_all();
    let mut issues: Vec<Issue> = Vec::new();
    let mut out = Object::new();

    if run.options.on_excess_property == ExcessProperty::Error {
        let expected = expected_keys(s);
        for (key, value) in obj {
            if s.property(key).is_some() || matches_index(s, key, run) {
                continue;
            }
            issues.push(Issue::pointer(
                PathSegment::Key(key.clone()),
                input,
                Issue::Unexpected { actual: value.clone(), expected: expected.clone() },
            ));
            if !collect_all {
                return Err(composite(node, input, issues, Value::Object(out)));
            }
        }
    }

    for p in &s.properties {
        let default = match run.direction {
            Direction::Decode => p.default.as_ref(),
            Direction::Encode => None,
        };
        let failure = match obj.get(&p.name) {
            None => {
                if let Some(default) = default {
                    out.insert(p.name.clone(), default());
                    None
                } else if p.optional {
                    None
                } else {
                    Some(Issue::Missing { node: p.schema.clone(), message: None })
                }
            }
            Some(Value::Undefined) if p.optional && !p.exact => {
                out.insert(p.name.clone(), default.map_or(Value::Undefined, |d| d()));
                None
            }
            Some(value) => match go(&p.schema, value, run).await {
                Ok(decoded) => {
                    out.insert(p.name.clone(), decoded);
                    None
                }
                Err(e) => Some(e),
            },
        };
        if let Some(issue) = failure {
            let stop = !collect_all || is_forbidden(&issue);
            issues.push(Issue::pointer(PathSegment::Key(p.name.clone()), input, issue));
            if stop {
                return Err(composite(node, input, issues, Value::Object(out)));
            }
        }
    }

    for (key, value) in obj {
        if s.property(key).is_some() {
            continue;
        }
        let key_in = Value::String(key.clone());
        let mut matched = false;
        for sig in &s.index_signatures {
            if !conforms(&sig.key, &key_in, run.input_side()) {
                continue;
            }
            matched = true;
            let parsed = match go(&sig.key, &key_in, run).await {
                Ok(key_out) => go(&sig.value, value, run).await.map(|v| (key_out, v)),
                Err(e) => Err(e),
            };
            match parsed {
                Ok((key_out, v)) => {
                    let key_out = match key_out {
                        Value::String(s) => s,
                        other => other.to_string(),
                    };
                    out.insert(key_out, v);
                }
                Err(e) => {
                    let stop = !collect_all || is_forbidden(&e);
                    issues.push(Issue::pointer(PathSegment::Key(key.clone()), input, e));
                    if stop {
                        return Err(composite(node, input, issues, Value::Object(out)));
                    }
                }
            }
        }
        if !matched && run.options.on_excess_property == ExcessProperty::Ignore {
            out.insert(key.clone(), value.clone());
        }
    }

    if issues.is_empty() {
        Ok(Value::Object(out))
    } else {
        Err(composite(node, input, issues, Value::Object(out)))
    }
}

async fn parse_tuple(node: &Schema, t: &Tuple, input: &Value, run: &Run) -> ParseResult {
    let Value::Array(xs) = input else {
        return Err(Issue::type_mismatch(node, input));
    };
    let collect_all = run.options.collect_all();
    let mut issues: Vec<Issue> = Vec::new();
    let mut out: Vec<Value> = Vec::with_capacity(xs.len());

    // an absent position is fine only when no required element follows it
    let min_len = t.elements.iter().rposition(|e| !e.optional).map_or(0, |i| i + 1);
    for i in xs.len()..min_len {
        let missing = Issue::Missing { node: t.elements[i].schema.clone(), message: None };
        issues.push(Issue::pointer(PathSegment::Index(i), input, missing));
        if !collect_all {
            return Err(composite(node, input, issues, Value::Array(out)));
        }
    }

    if t.rest.is_none() && xs.len() > t.elements.len() {
        let expected = if t.elements.is_empty() {
            "never".to_string()
        } else {
            (0..t.elements.len()).map(|i| i.to_string()).collect::<Vec<_>>().join(" | ")
        };
        for (i, x) in xs.iter().enumerate().skip(t.elements.len()) {
            let unexpected = Issue::Unexpected { actual: x.clone(), expected: expected.clone() };
            issues.push(Issue::pointer(PathSegment::Index(i), input, unexpected));
            if !collect_all {
                return Err(composite(node, input, issues, Value::Array(out)));
            }
        }
    }

    let positional = t.elements.iter().map(|e| &e.schema);
    let trailing = std::iter::repeat(t.rest.as_ref()).flatten();
    for (i, (x, schema)) in xs.iter().zip(positional.chain(trailing)).enumerate() {
        match go(schema, x, run).await {
            Ok(decoded) => out.push(decoded),
            Err(e) => {
                let stop = !collect_all || is_forbidden(&e);
                issues.push(Issue::pointer(PathSegment::Index(i), input, e));
                if stop {
                    return Err(composite(node, input, issues, Value::Array(out)));
                }
            }
        }
    }

    if issues.is_empty() {
        Ok(Value::Array(out))
    } else {
        Err(composite(node, input, issues, Value::Array(out)))
    }
}

async fn parse_union(node: &Schema, members: &[Schema], input: &Value, run: &Run) -> ParseResult {
    let mut failures: Vec<MemberIssue> = Vec::with_capacity(members.len());
    for (index, member) in members.iter().enumerate() {
        match go(member, input, run).await {
            Ok(out) => return Ok(out),
            Err(issue) => {
                trace!(union = %node, member = index, "union member ruled out");
                let stop = is_forbidden(&issue);
                failures.push(MemberIssue { index, issue });
                if stop {
                    break;
                }
            }
        }
    }
    Err(Issue::Union { node: node.clone(), actual: input.clone(), members: failures })
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn transformation_failure(node: &Schema, input: &Value, kind: TransformationKind, issue: Issue) -> Issue {
    Issue::Transformation { node: node.clone(), actual: input.clone(), kind, issue: Box::new(issue) }
}

fn composite(node: &Schema, input: &Value, issues: Vec<Issue>, output: Value) -> Issue {
    Issue::Composite { node: node.clone(), actual: input.clone(), issues, output: Some(output) }
}

fn is_forbidden(issue: &Issue) -> bool {
    issue.find(IssueKind::AsyncNotAllowed).is_some()
}

fn matches_index(s: &Struct, key: &str, run: &Run) -> bool {
    let key = Value::from(key);
    s.index_signatures.iter().any(|sig| conforms(&sig.key, &key, run.input_side()))
}

fn expected_keys(s: &Struct) -> String {
    let mut keys: Vec<String> = s.properties.iter().map(|p| Value::from(p.name.as_str()).to_string()).collect();
    keys.extend(s.index_signatures.iter().map(|sig| sig.key.label()));
    if keys.is_empty() { "never".to_string() } else { keys.join(" | ") }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{
        array, literal, number, optional, prop, record, string, struct_, transform, tuple, union,
        elem, optional_element, optional_with_default,
    };
    use serde_json::json;

    fn v(j: serde_json::Value) -> Value { Value::from(j) }
    fn opts() -> ParseOptions { ParseOptions::default() }

    #[test]
    fn primitives_match_strictly() {
        assert_eq!(decode_either(&string(), &v(json!("a")), &opts()).unwrap(), v(json!("a")));
        let err = decode_either(&string(), &v(json!(1)), &opts()).unwrap_err();
        assert_eq!(err.render(), "Expected string, actual 1");
        let err = decode_either(&number(), &Value::Undefined, &opts()).unwrap_err();
        assert_eq!(err.render(), "Expected number, actual undefined");
    }

    #[test]
    fn struct_reports_missing_key() {
        let s = struct_(vec![prop("a", string()), prop("b", number())]);
        let err = decode_either(&s, &v(json!({"b": 1})), &opts()).unwrap_err();
        assert_eq!(
            err.render(),
            "{ readonly a: string; readonly b: number }\n└─ [\"a\"]\n   └─ is missing"
        );
    }

    #[test]
    fn struct_collects_all_errors_when_asked() {
        let s = struct_(vec![prop("a", string()), prop("b", number())]);
        let input = v(json!({"a": 1, "b": "x"}));
        let first = decode_either(&s, &input, &opts()).unwrap_err();
        assert_eq!(first.children().len(), 1);

        let all = decode_either(&s, &input, &ParseOptions::all_errors()).unwrap_err();
        let expected = "{ readonly a: string; readonly b: number }
├─ [\"a\"]
│  └─ Expected string, actual 1
└─ [\"b\"]
   └─ Expected number, actual \"x\"";
        assert_eq!(all.render(), expected);
    }

    #[test]
    fn excess_property_policies() {
        let s = struct_(vec![prop("a", number())]);
        let input = v(json!({"a": 1, "b": 2}));

        let stripped = decode_either(&s, &input, &opts()).unwrap();
        assert_eq!(stripped, v(json!({"a": 1})));

        let kept = decode_either(&s, &input, &opts().with_excess_property(ExcessProperty::Ignore)).unwrap();
        assert_eq!(kept, v(json!({"a": 1, "b": 2})));

        let err = decode_either(&s, &input, &opts().with_excess_property(ExcessProperty::Error)).unwrap_err();
        assert_eq!(
            err.render(),
            "{ readonly a: number }\n└─ [\"b\"]\n   └─ is unexpected, expected: \"a\""
        );
        assert!(err.find(IssueKind::UnexpectedProperty).is_some());
    }

    #[test]
    fn optional_and_default_properties() {
        let s = struct_(vec![
            optional("nick", string()),
            optional_with_default("count", number(), || Value::from(0)),
        ]);
        assert_eq!(decode_either(&s, &v(json!({})), &opts()).unwrap(), v(json!({"count": 0})));
        assert_eq!(
            decode_either(&s, &v(json!({"nick": "x", "count": 3})), &opts()).unwrap(),
            v(json!({"nick": "x", "count": 3}))
        );
        // defaults never repair invalid values
        assert!(decode_either(&s, &v(json!({"count": "3"})), &opts()).is_err());
        // encoding keeps what the Type side holds
        assert_eq!(encode_either(&s, &v(json!({"count": 0})), &opts()).unwrap(), v(json!({"count": 0})));
    }

    #[test]
    fn records_decode_through_index_signatures() {
        let r = record(string(), number());
        assert_eq!(decode_either(&r, &v(json!({"a": 1, "b": 2})), &opts()).unwrap(), v(json!({"a": 1, "b": 2})));
        let err = decode_either(&r, &v(json!({"a": "x"})), &opts()).unwrap_err();
        assert_eq!(
            err.render(),
            "{ readonly [x: string]: number }\n└─ [\"a\"]\n   └─ Expected number, actual \"x\""
        );
    }

    #[test]
    fn tuple_positions_missing_and_unexpected() {
        let t = tuple(vec![elem(string()), elem(number())]);
        let err = decode_either(&t, &v(json!(["a"])), &opts()).unwrap_err();
        assert_eq!(err.render(), "readonly [string, number]\n└─ [1]\n   └─ is missing");

        let err = decode_either(&t, &v(json!(["a", 1, true])), &opts()).unwrap_err();
        assert_eq!(err.render(), "readonly [string, number]\n└─ [2]\n   └─ is unexpected, expected: 0 | 1");

        let t = tuple(vec![elem(string()), optional_element(number())]);
        assert_eq!(decode_either(&t, &v(json!(["a"])), &opts()).unwrap(), v(json!(["a"])));
    }

    #[test]
    fn array_rest_issues_are_keyed_by_index() {
        let a = array(number());
        let err = decode_either(&a, &v(json!([1, "x", 3, "y"])), &ParseOptions::all_errors()).unwrap_err();
        let expected = "ReadonlyArray<number>
├─ [1]
│  └─ Expected number, actual \"x\"
└─ [3]
   └─ Expected number, actual \"y\"";
        assert_eq!(err.render(), expected);
    }

    #[test]
    fn union_lists_every_member_failure() {
        let u = union(vec![string(), number(), literal(true)]);
        assert_eq!(decode_either(&u, &v(json!(1)), &opts()).unwrap(), v(json!(1)));
        let err = decode_either(&u, &Value::Null, &opts()).unwrap_err();
        let expected = "string | number | true
├─ Expected string, actual null
├─ Expected number, actual null
└─ Expected true, actual null";
        assert_eq!(err.render(), expected);
        match err {
            Issue::Union { members, .. } => {
                assert_eq!(members.iter().map(|m| m.index).collect::<Vec<_>>(), vec![0, 1, 2]);
            }
            other => panic!("expected a union issue, got {other:?}"),
        }
    }

    #[test]
    fn strict_transformation_checks_function_output() {
        let loose = |strict: bool| {
            let t = transform(string(), number(), |v| v, |v| v);
            if strict { t } else { crate::schema::non_strict(&t) }
        };
        let err = decode_either(&loose(true), &v(json!("a")), &opts()).unwrap_err();
        assert_eq!(
            err.render(),
            "(string <-> number)\n└─ Transformation process failure\n   └─ Expected number, actual \"a\""
        );
        let err = decode_either(&loose(false), &v(json!("a")), &opts()).unwrap_err();
        assert_eq!(
            err.render(),
            "(string <-> number)\n└─ Type side transformation failure\n   └─ Expected number, actual \"a\""
        );
    }

    #[test]
    fn refinement_encode_checks_the_predicate_first() {
        let positive = crate::schema::num::POSITIVE.clone();
        let err = encode_either(&positive, &v(json!("a")), &opts()).unwrap_err();
        assert_eq!(
            err.render(),
            "Positive\n└─ Predicate refinement failure\n   └─ Expected a positive number, actual \"a\""
        );
        let err = encode_either(&positive, &v(json!(-1)), &opts()).unwrap_err();
        assert_eq!(err.kind(), IssueKind::RefinementFailure(RefinementKind::Predicate));
        assert_eq!(encode_either(&positive, &v(json!(2)), &opts()).unwrap(), v(json!(2)));
    }

    #[test]
    fn validate_checks_the_type_side() {
        let n = crate::schema::num::NUMBER_FROM_STRING.clone();
        assert!(validate_either(&n, &v(json!(1)), &opts()).is_ok());
        assert!(validate_either(&n, &v(json!("1")), &opts()).is_err());
        assert!(is(&n, &v(json!(1))));
        assert!(!is(&n, &v(json!("1"))));
        assert_eq!(validate_option(&n, &v(json!(2)), &opts()), Some(v(json!(2))));
    }
}
