//! Environment source
//!
//! Reads `PREFIX_FIELD__NESTED=value` variables from dotenv-formatted bytes or from the process
//! environment and overlays them on the current value. Variable names are normalized by the
//! `config` crate's environment source, so prefixes match case-insensitively and keys are
//! lowercased (`APP_SERVER__PORT` sets `server.port`). Values for non-string fields are parsed
//! as JSON scalars.
//!
//! Unlike the file encodings this source is partial: fields with no matching variable keep
//! their current value. A prefixed variable that matches no field is an error.

use super::{binding_builders, Binding, Marshaler, ENV_PRIORITY};
use crate::defaults::child_pointer;
use crate::error::MarshalError;
use config::{Environment, Map, Source};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::trace;

const DEFAULT_SEPARATOR: &str = "__";

/// Environment-variable source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Env {
    binding: Binding,
    prefix: String,
    separator: String,
}

impl Env {
    pub const DEFAULT_LOCATION: &'static str = ".env";

    /// Source for variables starting with `{prefix}_`; an empty prefix accepts every variable.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            binding: Binding::new("env", ENV_PRIORITY, None),
            prefix: prefix.into(),
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }

    /// Back the source with a dotenv file.
    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.binding.set_location(Some(path.into()));
        self
    }

    /// Separator between nesting levels (default `__`).
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Overlay the process environment on `target`.
    ///
    /// Variables that are not valid UTF-8 are skipped. With an empty prefix the whole
    /// environment is visible, so variables that match no field are ignored; with a prefix
    /// they are reported.
    pub fn overlay_process<T>(&self, target: &mut T) -> Result<(), MarshalError>
    where
        T: Serialize + DeserializeOwned,
    {
        let strict = !self.prefix.is_empty();
        self.overlay(utf8_vars(std::env::vars_os()), target, strict)
    }

    fn overlay<T>(
        &self,
        vars: Map<String, String>,
        target: &mut T,
        strict: bool,
    ) -> Result<(), MarshalError>
    where
        T: Serialize + DeserializeOwned,
    {
        let mut source = Environment::default()
            .separator(&self.separator)
            .source(Some(vars));
        if !self.prefix.is_empty() {
            source = source.prefix(&self.prefix).prefix_separator("_");
        }

        let mut overrides: Vec<(String, String)> = source
            .collect()?
            .into_iter()
            .map(|(key, value)| Ok((key, value.into_string()?)))
            .collect::<Result<_, config::ConfigError>>()?;
        if overrides.is_empty() {
            return Ok(());
        }
        overrides.sort();

        let mut tree = serde_json::to_value(&*target)?;
        for (key, raw) in &overrides {
            set_path(&mut tree, key, raw.clone())?;
        }
        let value: T = serde_json::from_value(tree)?;

        // Keys the type does not know are dropped by deserialization.
        if strict {
            let kept = serde_json::to_value(&value)?;
            for (key, _) in &overrides {
                let pointer = key
                    .split('.')
                    .fold(String::new(), |parent, token| child_pointer(&parent, token));
                if kept.pointer(&pointer).is_none() {
                    return Err(MarshalError::Unsupported(format!(
                        "'{}' does not match a field (keys are matched in lowercase)",
                        key
                    )));
                }
            }
        }

        *target = value;
        Ok(())
    }

    fn variable_name(&self, path: &[String]) -> String {
        let key = path.join(&self.separator).to_uppercase();
        if self.prefix.is_empty() {
            key
        } else {
            format!("{}_{}", self.prefix.to_uppercase(), key)
        }
    }

    fn flatten(
        &self,
        value: &Value,
        path: &mut Vec<String>,
        out: &mut Vec<(String, String)>,
    ) -> Result<(), MarshalError> {
        let rendered = match value {
            Value::Null => return Ok(()),
            Value::Object(map) => {
                for (key, child) in map {
                    path.push(key.clone());
                    self.flatten(child, path, out)?;
                    path.pop();
                }
                return Ok(());
            }
            Value::Array(_) => {
                return Err(MarshalError::Unsupported(format!(
                    "sequence at '{}' cannot be expressed as an environment variable",
                    path.join(".")
                )))
            }
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
        };

        if rendered.contains('\n') {
            return Err(MarshalError::Unsupported(format!(
                "multi-line value at '{}'",
                path.join(".")
            )));
        }
        out.push((self.variable_name(path), quote(&rendered)));
        Ok(())
    }
}

binding_builders!(Env);

impl<T> Marshaler<T> for Env
where
    T: Serialize + DeserializeOwned,
{
    /// Encode scalar leaves as sorted `KEY=value` lines.
    fn marshal(&self, value: &T) -> Result<Vec<u8>, MarshalError> {
        let tree = serde_json::to_value(value)?;
        let mut lines = Vec::new();
        self.flatten(&tree, &mut Vec::new(), &mut lines)?;
        lines.sort();

        let mut out = String::new();
        for (key, value) in lines {
            out.push_str(&key);
            out.push('=');
            out.push_str(&value);
            out.push('\n');
        }
        Ok(out.into_bytes())
    }

    fn unmarshal(&self, bytes: &[u8], target: &mut T) -> Result<(), MarshalError> {
        let vars = parse_dotenv(std::str::from_utf8(bytes)?);
        trace!(prefix = %self.prefix, count = vars.len(), "Overlaying environment variables");
        self.overlay(vars, target, true)
    }

    fn identity(&self) -> String {
        self.binding.identity()
    }

    fn priority(&self) -> i32 {
        self.binding.priority()
    }

    fn location(&self) -> Option<&Path> {
        self.binding.location()
    }
}

/// Keep the variables whose name and value are both valid UTF-8.
fn utf8_vars(vars: impl Iterator<Item = (OsString, OsString)>) -> Map<String, String> {
    vars.filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
        (Ok(key), Ok(value)) => Some((key, value)),
        (key, _) => {
            trace!(variable = ?key, "Skipping non-UTF-8 environment variable");
            None
        }
    })
    .collect()
}

/// Set the field at dotted `key`, creating intermediate maps as needed.
///
/// String fields take `raw` verbatim; other fields parse it as JSON, falling back to a string
/// so the final deserialization reports the mismatch.
fn set_path(tree: &mut Value, key: &str, raw: String) -> Result<(), MarshalError> {
    let segments: Vec<&str> = key.split('.').collect();
    let (leaf, parents) = match segments.split_last() {
        Some(split) => split,
        None => return Ok(()),
    };

    let mut node = tree;
    for segment in parents {
        if node.is_null() {
            *node = Value::Object(serde_json::Map::new());
        }
        node = match node {
            Value::Object(map) => map
                .entry((*segment).to_string())
                .or_insert(Value::Null),
            _ => {
                return Err(MarshalError::Unsupported(format!(
                    "'{}' does not address a field",
                    key
                )))
            }
        };
    }

    if node.is_null() {
        *node = Value::Object(serde_json::Map::new());
    }
    let Value::Object(map) = node else {
        return Err(MarshalError::Unsupported(format!(
            "'{}' does not address a field",
            key
        )));
    };

    let value = match map.get(*leaf) {
        Some(Value::String(_)) => Value::String(raw),
        _ => serde_json::from_str(&raw).unwrap_or(Value::String(raw)),
    };
    map.insert((*leaf).to_string(), value);
    Ok(())
}

/// Parse `KEY=value` lines; blank lines, `#` comments and an `export ` prefix are allowed.
fn parse_dotenv(text: &str) -> Map<String, String> {
    let mut vars = Map::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line);
        if let Some((key, value)) = line.split_once('=') {
            vars.insert(key.trim().to_string(), unquote(value.trim()));
        }
    }
    vars
}

fn quote(value: &str) -> String {
    let needs_quotes = value.trim() != value
        || value.starts_with('"')
        || value.starts_with('\'')
        || value.starts_with('#');
    if needs_quotes {
        format!("\"{}\"", value.replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

fn unquote(value: &str) -> String {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        return value[1..value.len() - 1].replace("\\\"", "\"");
    }
    if value.len() >= 2 && value.starts_with('\'') && value.ends_with('\'') {
        return value[1..value.len() - 1].to_string();
    }
    value.to_string()
}
