//! TOML marshaler backed by the `toml` crate.

use super::{binding_builders, Binding, Marshaler, FILE_PRIORITY};
use crate::error::MarshalError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// TOML encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toml {
    binding: Binding,
}

impl Toml {
    pub const DEFAULT_LOCATION: &'static str = "config.toml";

    /// File-backed TOML marshaler
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            binding: Binding::new("toml", FILE_PRIORITY, Some(path.into())),
        }
    }

    /// TOML marshaler with no backing file
    pub fn in_memory() -> Self {
        Self {
            binding: Binding::new("toml", FILE_PRIORITY, None),
        }
    }
}

binding_builders!(Toml);

impl<T> Marshaler<T> for Toml
where
    T: Serialize + DeserializeOwned,
{
    fn marshal(&self, value: &T) -> Result<Vec<u8>, MarshalError> {
        Ok(::toml::to_string(value)?.into_bytes())
    }

    fn unmarshal(&self, bytes: &[u8], target: &mut T) -> Result<(), MarshalError> {
        let text = std::str::from_utf8(bytes)?;
        *target = ::toml::from_str(text)?;
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
