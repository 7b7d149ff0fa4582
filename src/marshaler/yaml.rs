//! YAML marshaler backed by `serde_yaml`.

use super::{binding_builders, Binding, Marshaler, FILE_PRIORITY};
use crate::error::MarshalError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// YAML encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Yaml {
    binding: Binding,
}

impl Yaml {
    pub const DEFAULT_LOCATION: &'static str = "config.yml";

    /// File-backed YAML marshaler
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            binding: Binding::new("yaml", FILE_PRIORITY, Some(path.into())),
        }
    }

    /// YAML marshaler with no backing file
    pub fn in_memory() -> Self {
        Self {
            binding: Binding::new("yaml", FILE_PRIORITY, None),
        }
    }
}

binding_builders!(Yaml);

impl<T> Marshaler<T> for Yaml
where
    T: Serialize + DeserializeOwned,
{
    fn marshal(&self, value: &T) -> Result<Vec<u8>, MarshalError> {
        Ok(serde_yaml::to_string(value)?.into_bytes())
    }

    fn unmarshal(&self, bytes: &[u8], target: &mut T) -> Result<(), MarshalError> {
        *target = serde_yaml::from_slice(bytes)?;
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
