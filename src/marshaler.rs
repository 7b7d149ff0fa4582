//! Marshalers
//!
//! A marshaler is a stateless encode/decode capability that a [`Config`](crate::config::Config)
//! runs during save and load. Each one carries an identity (the de-duplication key), a priority
//! (lower runs first, higher runs last and wins on load) and an optional backing file.

use crate::error::MarshalError;
use std::path::{Path, PathBuf};

/// Builder methods common to every bundled marshaler.
macro_rules! binding_builders {
    ($ty:ty) => {
        impl $ty {
            /// Override the de-duplication key.
            pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
                self.binding.set_identity(identity.into());
                self
            }

            pub fn with_priority(mut self, priority: i32) -> Self {
                self.binding.set_priority(priority);
                self
            }
        }
    };
}

pub(crate) use binding_builders;

mod env;
mod format;
mod json;
mod toml;
mod yaml;

pub use self::env::Env;
pub use self::format::{Format, FormatMask};
pub use self::json::Json;
pub use self::toml::Toml;
pub use self::yaml::Yaml;

/// Priority of the bundled file encodings
pub const FILE_PRIORITY: i32 = 0;

/// Priority of the environment source; runs after file encodings
pub const ENV_PRIORITY: i32 = 100;

/// Encode/decode capability bound to a configuration container
pub trait Marshaler<T>: Send + Sync {
    /// Encode `value` to bytes.
    fn marshal(&self, value: &T) -> Result<Vec<u8>, MarshalError>;

    /// Decode `bytes` into `target`.
    fn unmarshal(&self, bytes: &[u8], target: &mut T) -> Result<(), MarshalError>;

    /// Stable de-duplication key
    fn identity(&self) -> String;

    fn priority(&self) -> i32;

    /// Backing file; `None` means in-memory only
    fn location(&self) -> Option<&Path>;
}

/// Identity, priority and location shared by the bundled marshalers
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Binding {
    kind: &'static str,
    identity: Option<String>,
    priority: i32,
    location: Option<PathBuf>,
}

impl Binding {
    pub(crate) fn new(kind: &'static str, priority: i32, location: Option<PathBuf>) -> Self {
        Self {
            kind,
            identity: None,
            priority,
            // An empty path is the same as no backing file.
            location: location.filter(|path| !path.as_os_str().is_empty()),
        }
    }

    /// `kind` for in-memory marshalers, `kind:path` for file-backed ones, unless overridden
    pub(crate) fn identity(&self) -> String {
        if let Some(identity) = &self.identity {
            return identity.clone();
        }
        match &self.location {
            Some(path) => format!("{}:{}", self.kind, path.display()),
            None => self.kind.to_string(),
        }
    }

    pub(crate) fn priority(&self) -> i32 {
        self.priority
    }

    pub(crate) fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    pub(crate) fn set_identity(&mut self, identity: String) {
        self.identity = Some(identity);
    }

    pub(crate) fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    pub(crate) fn set_location(&mut self, location: Option<PathBuf>) {
        self.location = location.filter(|path| !path.as_os_str().is_empty());
    }
}
