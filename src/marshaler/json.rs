//! JSON marshaler backed by `serde_json`.

use super::{binding_builders, Binding, Marshaler, FILE_PRIORITY};
use crate::error::MarshalError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// JSON encoding, indented unless minified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Json {
    binding: Binding,
    minified: bool,
}

impl Json {
    pub const DEFAULT_LOCATION: &'static str = "config.json";

    /// File-backed JSON marshaler
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            binding: Binding::new("json", FILE_PRIORITY, Some(path.into())),
            minified: false,
        }
    }

    /// JSON marshaler with no backing file
    pub fn in_memory() -> Self {
        Self {
            binding: Binding::new("json", FILE_PRIORITY, None),
            minified: false,
        }
    }

    /// Emit compact output.
    pub fn minified(mut self, minified: bool) -> Self {
        self.minified = minified;
        self
    }
}

binding_builders!(Json);

impl<T> Marshaler<T> for Json
where
    T: Serialize + DeserializeOwned,
{
    fn marshal(&self, value: &T) -> Result<Vec<u8>, MarshalError> {
        let bytes = if self.minified {
            serde_json::to_vec(value)?
        } else {
            serde_json::to_vec_pretty(value)?
        };
        Ok(bytes)
    }

    fn unmarshal(&self, bytes: &[u8], target: &mut T) -> Result<(), MarshalError> {
        *target = serde_json::from_slice(bytes)?;
        Ok(())
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
