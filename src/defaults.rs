//! Declarative Defaults
//!
//! A [`DefaultTable`] maps dotted field paths to default literals. Applying the table to a
//! value fills every zero-valued field it names and leaves caller-supplied values alone.
//!
//! Paths follow the serialized field names. A `*` segment matches every element of a
//! sequence or every value of a map, and a numeric segment indexes into a sequence:
//!
//! ```text
//! port              top-level field
//! server.host       nested struct field
//! listeners.*.tls   field of every listener
//! ```
//!
//! Literals are parsed per the field's type: string fields take the literal verbatim, every
//! other field parses it as JSON (`42`, `true`, `[1, 2]`, `{"a": 1}`).

use crate::error::DefaultsError;
use serde::de::{DeserializeOwned, Error as _};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// A type that can be held by a [`Config`](crate::config::Config).
///
/// `default_table` plays the role of per-field default annotations; the default
/// implementation declares none.
///
/// Table defaults are applied through the type's serde form, so that form must convert
/// without loss: fields marked `#[serde(skip)]` or holding non-finite floats are reset
/// whenever a default is actually filled. A value with nothing left to fill is never
/// rewritten.
pub trait Settings: Serialize + DeserializeOwned {
    fn default_table() -> DefaultTable {
        DefaultTable::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum DefaultValue {
    Literal(String),
    Value(Value),
}

/// Field path -> default value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefaultTable {
    // Sorted so parents are filled before their children.
    entries: BTreeMap<String, DefaultValue>,
}

impl DefaultTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a default literal for `path`.
    pub fn set(mut self, path: impl Into<String>, literal: impl Into<String>) -> Self {
        self.entries
            .insert(path.into(), DefaultValue::Literal(literal.into()));
        self
    }

    /// Declare an already-typed default for `path`.
    pub fn set_value<V: Serialize>(
        mut self,
        path: impl Into<String>,
        value: V,
    ) -> Result<Self, DefaultsError> {
        let value = serde_json::to_value(value).map_err(DefaultsError::Serialize)?;
        self.entries.insert(path.into(), DefaultValue::Value(value));
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Declared paths in application order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Fill the zero-valued fields of `target`.
    ///
    /// The work happens on a serialized projection of `target`; `target` is only replaced
    /// once every entry applied and the result deserialized back into `T`. When no field
    /// needed a default `target` is not touched at all.
    pub fn apply<T>(&self, target: &mut T) -> Result<(), DefaultsError>
    where
        T: Serialize + DeserializeOwned,
    {
        if self.entries.is_empty() {
            return Ok(());
        }

        let mut tree = serde_json::to_value(&*target).map_err(DefaultsError::Serialize)?;
        let mut filled = 0;
        let mut inserted = Vec::new();
        for (path, default) in &self.entries {
            let segments: Vec<&str> = path.split('.').collect();
            let mut fill = Fill {
                path,
                default,
                filled: 0,
                inserted: Vec::new(),
            };
            fill.visit(&mut tree, &segments, "")?;
            filled += fill.filled;
            inserted.extend(fill.inserted.into_iter().map(|pointer| (pointer, path)));
        }

        if filled == 0 {
            return Ok(());
        }

        let value: T = serde_json::from_value(tree).map_err(|source| DefaultsError::TypeMismatch {
            path: "(root)".to_string(),
            literal: String::new(),
            source,
        })?;

        // Keys the type does not know are dropped by deserialization.
        if !inserted.is_empty() {
            let kept = serde_json::to_value(&value).map_err(DefaultsError::Serialize)?;
            let dropped = inserted
                .iter()
                .find(|(pointer, _)| kept.pointer(pointer).is_none());
            if let Some((_, path)) = dropped {
                return Err(unknown(path));
            }
        }

        *target = value;
        Ok(())
    }
}

/// One table entry walking the projection
struct Fill<'a> {
    path: &'a str,
    default: &'a DefaultValue,
    filled: usize,
    // JSON pointers of leaf keys added to the projection.
    inserted: Vec<String>,
}

impl Fill<'_> {
    fn visit(
        &mut self,
        node: &mut Value,
        segments: &[&str],
        pointer: &str,
    ) -> Result<(), DefaultsError> {
        let path = self.path;
        let Some((head, rest)) = segments.split_first() else {
            if is_zero(node) {
                *node = resolve(node, self.default, path)?;
                self.filled += 1;
            }
            return Ok(());
        };

        match node {
            // Unset optional parent; nothing to descend into.
            Value::Null => Ok(()),
            Value::Array(items) if *head == "*" => {
                for (index, item) in items.iter_mut().enumerate() {
                    self.visit(item, rest, &child_pointer(pointer, &index.to_string()))?;
                }
                Ok(())
            }
            Value::Object(map) if *head == "*" => {
                for (key, value) in map.iter_mut() {
                    self.visit(value, rest, &child_pointer(pointer, key))?;
                }
                Ok(())
            }
            Value::Array(items) => {
                let child = head
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| items.get_mut(index))
                    .ok_or_else(|| unknown(path))?;
                self.visit(child, rest, &child_pointer(pointer, head))
            }
            Value::Object(map) => {
                let at = child_pointer(pointer, head);
                // Skipped optional fields serialize as absent keys.
                if rest.is_empty() && !map.contains_key(*head) {
                    map.insert((*head).to_string(), Value::Null);
                    self.inserted.push(at.clone());
                }
                let child = map.get_mut(*head).ok_or_else(|| unknown(path))?;
                self.visit(child, rest, &at)
            }
            _ => Err(unknown(path)),
        }
    }
}

/// Append `token` to a JSON pointer, escaped per RFC 6901.
pub(crate) fn child_pointer(parent: &str, token: &str) -> String {
    format!("{}/{}", parent, token.replace('~', "~0").replace('/', "~1"))
}

fn unknown(path: &str) -> DefaultsError {
    DefaultsError::UnknownField {
        path: path.to_string(),
    }
}

/// Zero value of the serialized field
fn is_zero(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

fn resolve(current: &Value, default: &DefaultValue, path: &str) -> Result<Value, DefaultsError> {
    let literal = match default {
        DefaultValue::Value(value) => return Ok(value.clone()),
        DefaultValue::Literal(literal) => literal,
    };

    let mismatch = |source| DefaultsError::TypeMismatch {
        path: path.to_string(),
        literal: literal.clone(),
        source,
    };

    match current {
        Value::String(_) => Ok(Value::String(literal.clone())),
        Value::Null => {
            Ok(serde_json::from_str(literal).unwrap_or_else(|_| Value::String(literal.clone())))
        }
        _ => {
            let parsed: Value = serde_json::from_str(literal).map_err(mismatch)?;
            if same_kind(current, &parsed) {
                Ok(parsed)
            } else {
                Err(mismatch(serde_json::Error::custom(format!(
                    "expected {}, found {}",
                    kind(current),
                    kind(&parsed)
                ))))
            }
        }
    }
}

fn same_kind(a: &Value, b: &Value) -> bool {
    kind(a) == kind(b)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "sequence",
        Value::Object(_) => "map",
    }
}
