//! Runtime schemas: build an immutable schema tree with combinators, then
//! decode external values into domain values, encode them back, and get a
//! structured issue tree when a value does not fit.
//!
//! ```
//! use schema_codec::{decode_either, schema, ParseOptions, Value};
//!
//! let person = schema::struct_(vec![
//!     schema::prop("name", schema::string()),
//!     schema::prop("age", schema::num::NUMBER_FROM_STRING.clone()),
//! ]);
//! let decoded = decode_either(&person, &Value::from(serde_json::json!({"name": "a", "age": "1"})), &ParseOptions::default());
//! assert_eq!(decoded.unwrap(), Value::from(serde_json::json!({"name": "a", "age": 1})));
//! ```
pub mod ast;
pub mod cli;
pub mod derive;
pub mod doc;
pub mod error;
pub mod issue;
pub mod jq_exec;
pub mod options;
pub mod parser;
pub mod path_de;
pub mod schema;
pub mod value;

pub use ast::{Annotations, Schema, TransformCtx, Transformed};
pub use derive::{encoded_schema, number_indexed_access, type_schema};
pub use error::{DocError, ParseError, SchemaError};
pub use issue::{Issue, IssueKind};
pub use options::{ErrorMode, ExcessProperty, ParseOptions};
pub use parser::{
    decode, decode_either, decode_option, decode_sync, encode, encode_either, encode_option, encode_sync, is,
    validate, validate_either, validate_option, validate_sync,
};
pub use value::Value;
