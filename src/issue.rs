//! Structured parse failures.
//!
//! An `Issue` mirrors the part of the schema tree that rejected a value: each
//! composite node wraps the failures of its children with its own keyed or
//! positional context. `Issue::render` turns the tree into the stable,
//! indentation-based text format:
//!
//! ```text
//! Duration
//! └─ Encoded side transformation failure
//!    └─ HRTime
//!       └─ [0]
//!          └─ ...
//! ```
use std::fmt;

use crate::ast::Schema;
use crate::value::Value;

pub const FORBIDDEN_MESSAGE: &str =
    "cannot be resolved synchronously, this is caused by using runSync on an effect that performs async work";

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

#[derive(Debug, Clone)]
pub enum Issue {
    /// The value has the wrong runtime kind or literal.
    Type { node: Schema, actual: Value, message: Option<String> },
    /// A required key or position is absent.
    Missing { node: Schema, message: Option<String> },
    /// A key or position the schema does not declare.
    Unexpected { actual: Value, expected: String },
    /// Asynchronous work reached from a synchronous entry point.
    Forbidden { node: Schema, actual: Value, message: Option<String> },
    Pointer { path: PathSegment, actual: Value, issue: Box<Issue> },
    Refinement { node: Schema, actual: Value, kind: RefinementKind, issue: Box<Issue> },
    Transformation { node: Schema, actual: Value, kind: TransformationKind, issue: Box<Issue> },
    /// Struct, tuple and declaration failures. `output` holds whatever was
    /// decoded successfully before the failure.
    Composite { node: Schema, actual: Value, issues: Vec<Issue>, output: Option<Value> },
    /// Every member of a union rejected the value.
    Union { node: Schema, actual: Value, members: Vec<MemberIssue> },
}

#[derive(Debug, Clone)]
pub struct MemberIssue {
    pub index: usize,
    pub issue: Issue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefinementKind {
    /// The base schema failed before the predicate ran.
    From,
    Predicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformationKind {
    Encoded,
    Transformation,
    Type,
}

/// Error taxonomy, one tag per issue variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    TypeMismatch,
    MissingProperty,
    UnexpectedProperty,
    AsyncNotAllowed,
    Pointer,
    RefinementFailure(RefinementKind),
    TransformationFailure(TransformationKind),
    Composite,
    UnionExhausted,
}

// ————————————————————————————————————————————————————————————————————————————
// CONSTRUCTION
// ————————————————————————————————————————————————————————————————————————————

impl Issue {
    pub fn type_mismatch(node: &Schema, actual: &Value) -> Self {
        Issue::Type { node: node.clone(), actual: actual.clone(), message: None }
    }

    pub fn with_message(node: &Schema, actual: &Value, message: impl Into<String>) -> Self {
        Issue::Type { node: node.clone(), actual: actual.clone(), message: Some(message.into()) }
    }

    pub fn forbidden(node: &Schema, actual: &Value) -> Self {
        Issue::Forbidden { node: node.clone(), actual: actual.clone(), message: None }
    }

    pub fn pointer(path: PathSegment, actual: &Value, issue: Issue) -> Self {
        Issue::Pointer { path, actual: actual.clone(), issue: Box::new(issue) }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INSPECTION
// ————————————————————————————————————————————————————————————————————————————

impl Issue {
    pub fn kind(&self) -> IssueKind {
        match self {
            Issue::Type { .. } => IssueKind::TypeMismatch,
            Issue::Missing { .. } => IssueKind::MissingProperty,
            Issue::Unexpected { .. } => IssueKind::UnexpectedProperty,
            Issue::Forbidden { .. } => IssueKind::AsyncNotAllowed,
            Issue::Pointer { .. } => IssueKind::Pointer,
            Issue::Refinement { kind, .. } => IssueKind::RefinementFailure(*kind),
            Issue::Transformation { kind, .. } => IssueKind::TransformationFailure(*kind),
            Issue::Composite { .. } => IssueKind::Composite,
            Issue::Union { .. } => IssueKind::UnionExhausted,
        }
    }

    /// The value that reached the failing node (absent for `Missing`).
    pub fn actual(&self) -> Option<&Value> {
        match self {
            Issue::Missing { .. } => None,
            Issue::Type { actual, .. }
            | Issue::Unexpected { actual, .. }
            | Issue::Forbidden { actual, .. }
            | Issue::Pointer { actual, .. }
            | Issue::Refinement { actual, .. }
            | Issue::Transformation { actual, .. }
            | Issue::Composite { actual, .. }
            | Issue::Union { actual, .. } => Some(actual),
        }
    }

    pub fn children(&self) -> Vec<&Issue> {
        match self {
            Issue::Pointer { issue, .. }
            | Issue::Refinement { issue, .. }
            | Issue::Transformation { issue, .. } => vec![issue.as_ref()],
            Issue::Composite { issues, .. } => issues.iter().collect(),
            Issue::Union { members, .. } => members.iter().map(|m| &m.issue).collect(),
            _ => Vec::new(),
        }
    }

    /// Depth-first search for the first issue of the given kind.
    pub fn find(&self, kind: IssueKind) -> Option<&Issue> {
        if self.kind() == kind {
            return Some(self);
        }
        self.children().into_iter().find_map(|c| c.find(kind))
    }

    fn node(&self) -> Option<&Schema> {
        match self {
            Issue::Type { node, .. }
            | Issue::Missing { node, .. }
            | Issue::Forbidden { node, .. }
            | Issue::Refinement { node, .. }
            | Issue::Transformation { node, .. }
            | Issue::Composite { node, .. }
            | Issue::Union { node, .. } => Some(node),
            Issue::Unexpected { .. } | Issue::Pointer { .. } => None,
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// RENDERING
// ————————————————————————————————————————————————————————————————————————————

struct Tree {
    value: String,
    forest: Vec<Tree>,
}

impl Tree {
    fn leaf(value: impl Into<String>) -> Self {
        Tree { value: value.into(), forest: Vec::new() }
    }

    fn node(value: impl Into<String>, forest: Vec<Tree>) -> Self {
        Tree { value: value.into(), forest }
    }
}

impl Issue {
    /// Multi-line tree text, the stable human-readable form of the issue.
    pub fn render(&self) -> String {
        let tree = self.tree();
        let mut out = tree.value.clone();
        draw(&mut out, "\n", &tree.forest);
        out
    }

    fn tree(&self) -> Tree {
        // a `message` annotation collapses the whole subtree
        if let Some(message) = self.node().and_then(|n| n.annotations().message.clone()) {
            return Tree::leaf(message);
        }
        match self {
            Issue::Type { node, actual, message } => Tree::leaf(
                message.clone().unwrap_or_else(|| format!("Expected {}, actual {actual}", node.expected())),
            ),
            Issue::Missing { message, .. } => Tree::leaf(message.as_deref().unwrap_or("is missing")),
            Issue::Unexpected { expected, .. } => Tree::leaf(format!("is unexpected, expected: {expected}")),
            Issue::Forbidden { node, message, .. } => Tree::node(
                node.label(),
                vec![Tree::leaf(message.as_deref().unwrap_or(FORBIDDEN_MESSAGE))],
            ),
            Issue::Pointer { path, issue, .. } => Tree::node(path.to_string(), vec![issue.tree()]),
            Issue::Refinement { node, kind, issue, .. } => Tree::node(
                node.label(),
                vec![Tree::node(kind.to_string(), vec![issue.tree()])],
            ),
            Issue::Transformation { node, kind, issue, .. } => Tree::node(
                node.label(),
                vec![Tree::node(kind.to_string(), vec![issue.tree()])],
            ),
            Issue::Composite { node, issues, .. } => {
                Tree::node(node.label(), issues.iter().map(Issue::tree).collect())
            }
            Issue::Union { node, members, .. } => {
                Tree::node(node.label(), members.iter().map(|m| m.issue.tree()).collect())
            }
        }
    }
}

fn draw(out: &mut String, indentation: &str, forest: &[Tree]) {
    let len = forest.len();
    for (i, tree) in forest.iter().enumerate() {
        let is_last = i + 1 == len;
        out.push_str(indentation);
        out.push_str(if is_last { "└─ " } else { "├─ " });
        out.push_str(&tree.value);
        let next = if len > 1 && !is_last {
            format!("{indentation}│  ")
        } else {
            format!("{indentation}   ")
        };
        draw(out, &next, &tree.forest);
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => write!(f, "[{}]", Value::from(k.as_str())),
            PathSegment::Index(i) => write!(f, "[{i}]"),
        }
    }
}

impl fmt::Display for RefinementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefinementKind::From => f.write_str("From side refinement failure"),
            RefinementKind::Predicate => f.write_str("Predicate refinement failure"),
        }
    }
}

impl fmt::Display for TransformationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformationKind::Encoded => f.write_str("Encoded side transformation failure"),
            TransformationKind::Transformation => f.write_str("Transformation process failure"),
            TransformationKind::Type => f.write_str("Type side transformation failure"),
        }
    }
}
