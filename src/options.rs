//! Per-call parse options.
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ErrorMode {
    /// Stop at the first failing child.
    #[default]
    First,
    /// Attempt every child and report all failures as siblings.
    All,
}

/// What to do with object keys a struct does not declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ExcessProperty {
    /// Drop them from the output.
    #[default]
    Strip,
    /// Pass them through untouched.
    Ignore,
    /// Report each one as unexpected.
    Error,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    pub errors: ErrorMode,
    pub on_excess_property: ExcessProperty,
}

impl ParseOptions {
    pub fn all_errors() -> Self {
        Self { errors: ErrorMode::All, ..Self::default() }
    }

    pub fn with_excess_property(self, on_excess_property: ExcessProperty) -> Self {
        Self { on_excess_property, ..self }
    }

    pub(crate) fn collect_all(&self) -> bool {
        self.errors == ErrorMode::All
    }
}
