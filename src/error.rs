use thiserror::Error;

use crate::issue::Issue;

/// Failure surfaced by the `*_sync` and async entry points. Displays the
/// rendered issue tree.
#[derive(Debug, Clone, Error)]
#[error("{issue}")]
pub struct ParseError {
    pub issue: Issue,
}

impl ParseError {
    pub fn message(&self) -> String {
        self.issue.render()
    }
}

impl From<Issue> for ParseError {
    fn from(issue: Issue) -> Self {
        ParseError { issue }
    }
}

/// A schema derivation or combinator was applied to a node it does not
/// support.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("{operation}: unsupported schema {schema}")]
    Unsupported { operation: &'static str, schema: String },
    #[error("duplicate property signature {0:?}")]
    DuplicateProperty(String),
    #[error("{operation}: unknown property {name:?}")]
    UnknownProperty { operation: &'static str, name: String },
    #[error("invalid regular expression: {0}")]
    Pattern(String),
}

/// Errors while loading a schema description document.
#[derive(Debug, Error)]
pub enum DocError {
    #[error("at JSON path {path} → {message}")]
    Parse { path: String, message: String },
    #[error("unknown schema name {0:?}")]
    UnknownName(String),
    #[error("definitions refer to themselves without consuming any input: {0}")]
    ReferenceCycle(String),
    #[error("invalid literal {0}: expected string, number, boolean or null")]
    InvalidLiteral(serde_json::Value),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
