//! Minimal CLI: load a schema document, then decode | encode | validate
//! every input document against it.
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;

use crate::doc;
use crate::options::{ErrorMode, ExcessProperty, ParseOptions};
use crate::parser;
use crate::value::Value;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// run JSON documents through a schema description and report the decoded value or the issue tree
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// decode each input from its encoded form
    Decode(RunSettings),
    /// encode each input from its type-side form
    Encode(RunSettings),
    /// check each input against the schema's type side
    Validate(RunSettings),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON)
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select a subnode in each document (e.g. /data/items/0/payload)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter for each document; every output is checked separately
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(Args, Debug)]
struct RunSettings {
    #[command(flatten)]
    input_settings: InputSettings,

    /// schema description document (.json)
    #[arg(long, short)]
    schema: PathBuf,

    /// override the document's error mode
    #[arg(long, value_enum)]
    errors: Option<ErrorMode>,

    /// override the document's excess property policy
    #[arg(long, value_enum)]
    on_excess_property: Option<ExcessProperty>,

    /// emit one JSON object per input instead of the human-readable report
    #[arg(long)]
    json: bool,

    /// output file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy)]
enum Operation {
    Decode,
    Encode,
    Validate,
}

/// One document pulled out of an input file.
#[derive(Debug)]
struct Input {
    source: String,
    value: serde_json::Value,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_process(&self) -> Result<Vec<Input>> {
        let source_paths = resolve_file_path_patterns(&self.input)?;
        let mut inputs = Vec::new();
        for source_path in source_paths {
            let source_path_str = source_path.to_string_lossy().to_string();
            let source = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read source file {source_path_str}"))?;
            let documents = if self.ndjson {
                source.lines()
                    .enumerate()
                    .filter(|(_, line)| !line.trim().is_empty())
                    .map(|(i, line)| {
                        let value = serde_json::from_str(line)
                            .with_context(|| format!("failed to parse JSON ({source_path_str}:{})", i + 1))?;
                        Ok((format!("{source_path_str}:{}", i + 1), value))
                    })
                    .collect::<Result<Vec<_>>>()?
            } else {
                let value = serde_json::from_str(&source)
                    .with_context(|| format!("failed to parse JSON source file ({source_path_str})"))?;
                vec![(source_path_str.clone(), value)]
            };
            for (source, value) in documents {
                self.select(source, value, &mut inputs)?;
            }
        }
        tracing::debug!(count = inputs.len(), "loaded input documents");
        Ok(inputs)
    }

    fn select(&self, source: String, value: serde_json::Value, out: &mut Vec<Input>) -> Result<()> {
        let value = match self.json_pointer.as_deref() {
            None => value,
            Some(pointer) => value.pointer(pointer).cloned()
                .ok_or_else(|| anyhow!("JSON pointer {pointer} matched nothing in {source}"))?,
        };
        match self.jq_expr.as_deref() {
            None => out.push(Input { source, value }),
            Some(jq_expr) => {
                let results = crate::jq_exec::run_jaq(jq_expr, &value)
                    .with_context(|| format!("failed to apply jq expression to {source}"))?;
                if results.len() == 1 {
                    out.extend(results.into_iter().map(|value| Input { source: source.clone(), value }));
                } else {
                    out.extend(results.into_iter().enumerate().map(|(i, value)| Input {
                        source: format!("{source}#{i}"),
                        value,
                    }));
                }
            }
        }
        Ok(())
    }
}

impl RunSettings {
    fn options(&self, from_document: ParseOptions) -> ParseOptions {
        ParseOptions {
            errors: self.errors.unwrap_or(from_document.errors),
            on_excess_property: self.on_excess_property.unwrap_or(from_document.on_excess_property),
        }
    }

    /// Returns whether every input passed.
    fn run(&self, operation: Operation) -> Result<bool> {
        let loaded = doc::load_file(&self.schema)
            .with_context(|| format!("failed to load schema document {}", self.schema.display()))?;
        let options = self.options(loaded.options);
        let inputs = self.input_settings.load_process()?;
        tracing::info!(schema = %loaded.schema, ?operation, inputs = inputs.len(), "running");

        // every document gets its own evaluation and issue tree
        let results: Vec<(&Input, parser::ParseResult)> = inputs
            .par_iter()
            .map(|input| {
                let value = Value::from(input.value.clone());
                let result = match operation {
                    Operation::Decode => parser::decode_either(&loaded.schema, &value, &options),
                    Operation::Encode => parser::encode_either(&loaded.schema, &value, &options),
                    Operation::Validate => parser::validate_either(&loaded.schema, &value, &options),
                };
                (input, result)
            })
            .collect();

        let mut report = String::new();
        for (input, result) in &results {
            report.push_str(&if self.json { json_line(input, result)? } else { human(input, result)? });
            report.push('\n');
        }
        write_report(self.out.as_deref(), &report)?;
        Ok(results.iter().all(|(_, r)| r.is_ok()))
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<bool> {
        match &self.cmd {
            Command::Decode(settings) => settings.run(Operation::Decode),
            Command::Encode(settings) => settings.run(Operation::Encode),
            Command::Validate(settings) => settings.run(Operation::Validate),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn human(input: &Input, result: &parser::ParseResult) -> Result<String> {
    Ok(match result {
        Ok(value) => format!("{} {}\n{}", "✔".green(), input.source, serde_json::to_string_pretty(value)?),
        Err(issue) => format!("{} {}\n{}", "✘".red(), input.source.bold(), issue.render()),
    })
}

fn json_line(input: &Input, result: &parser::ParseResult) -> Result<String> {
    let line = match result {
        Ok(value) => serde_json::json!({ "source": input.source, "ok": true, "value": value }),
        Err(issue) => serde_json::json!({ "source": input.source, "ok": false, "issue": issue.render() }),
    };
    Ok(serde_json::to_string(&line)?)
}

fn write_report(out: Option<&Path>, report: &str) -> Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(out, report)?;
        }
        None => print!("{report}"),
    }
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();
    for raw in patterns {
        let pattern = raw.as_ref();
        if !has_glob_chars(pattern) {
            out.push(PathBuf::from(pattern));
            continue;
        }
        let mut matched_any = false;
        for entry in glob::glob(pattern)? {
            out.push(entry?);
            matched_any = true;
        }
        if !matched_any {
            bail!("glob pattern matched no files: {pattern}");
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings(json_pointer: Option<&str>, jq_expr: Option<&str>) -> InputSettings {
        InputSettings {
            ndjson: false,
            json_pointer: json_pointer.map(str::to_string),
            jq_expr: jq_expr.map(str::to_string),
            input: Vec::new(),
        }
    }

    #[test]
    fn pointer_then_jq_fans_out() {
        let mut out = Vec::new();
        let doc = json!({"data": {"items": [1, 2]}});
        settings(Some("/data"), Some(".items[]")).select("f.json".into(), doc, &mut out).unwrap();
        let sources: Vec<_> = out.iter().map(|i| i.source.as_str()).collect();
        assert_eq!(sources, vec!["f.json#0", "f.json#1"]);
        assert_eq!(out[1].value, json!(2));
    }

    #[test]
    fn missing_pointer_is_an_error() {
        let mut out = Vec::new();
        let err = settings(Some("/nope"), None).select("f.json".into(), json!({}), &mut out).unwrap_err();
        assert!(err.to_string().contains("/nope"));
    }

    #[test]
    fn cli_flags_override_document_options() {
        let cli = CommandLineInterface::try_parse_from([
            "schema-codec", "decode", "--schema", "s.json", "--errors", "all", "--input", "a.json",
        ])
        .unwrap();
        let Command::Decode(settings) = cli.cmd else { panic!("expected decode") };
        let options = settings.options(ParseOptions::default().with_excess_property(ExcessProperty::Error));
        assert_eq!(options.errors, ErrorMode::All);
        assert_eq!(options.on_excess_property, ExcessProperty::Error);
    }

    #[test]
    fn json_lines_carry_the_rendered_issue() {
        let input = Input { source: "a".into(), value: json!(1) };
        let issue = parser::decode_either(&crate::schema::string(), &Value::from(1), &ParseOptions::default());
        let line = json_line(&input, &issue).unwrap();
        assert_eq!(line, r#"{"source":"a","ok":false,"issue":"Expected string, actual 1"}"#);
    }
}
