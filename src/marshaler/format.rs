//! Format selection: pick bundled marshalers by name, file extension or bitmask.

use super::{Env, Json, Marshaler, Toml, Yaml};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Bundled encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum Format {
    /// Environment variables; always layered over the file encodings.
    Env = 0b0001,
    Json = 0b0010,
    Toml = 0b0100,
    Yaml = 0b1000,
}

impl Format {
    pub const ALL: [Format; 4] = [Format::Env, Format::Json, Format::Toml, Format::Yaml];

    pub fn bits(self) -> u32 {
        self as u32
    }

    pub fn extension(self) -> &'static str {
        match self {
            Format::Env => "env",
            Format::Json => "json",
            Format::Toml => "toml",
            Format::Yaml => "yml",
        }
    }

    /// Detect a format from a file extension.
    pub fn from_path(path: &Path) -> Option<Format> {
        if path.file_name().and_then(|name| name.to_str()) == Some(".env") {
            return Some(Format::Env);
        }
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "env" => Some(Format::Env),
            "json" => Some(Format::Json),
            "toml" => Some(Format::Toml),
            "yml" | "yaml" => Some(Format::Yaml),
            _ => None,
        }
    }

    /// Marshaler of this format backed by `path`.
    ///
    /// The environment format reads unprefixed variables from the file.
    pub fn marshaler<T>(self, path: impl Into<PathBuf>) -> Box<dyn Marshaler<T>>
    where
        T: Serialize + DeserializeOwned,
    {
        match self {
            Format::Env => Box::new(Env::new("").with_location(path)),
            Format::Json => Box::new(Json::new(path)),
            Format::Toml => Box::new(Toml::new(path)),
            Format::Yaml => Box::new(Yaml::new(path)),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Env => "env",
            Format::Json => "json",
            Format::Toml => "toml",
            Format::Yaml => "yaml",
        };
        f.write_str(name)
    }
}

/// Set of formats stored as a bitmask
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FormatMask(u32);

impl FormatMask {
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    /// Add every format in `formats`.
    pub fn mask(self, formats: &[Format]) -> Self {
        Self(formats.iter().fold(self.0, |acc, f| acc | f.bits()))
    }

    /// Formats present in the mask, in `Format::ALL` order
    pub fn unmask(self) -> Vec<Format> {
        Format::ALL
            .into_iter()
            .filter(|f| self.contains(*f))
            .collect()
    }

    pub fn contains(self, format: Format) -> bool {
        self.0 & format.bits() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// One marshaler per format, each at `{stem}.{extension}`.
    pub fn marshalers<T>(self, stem: &Path) -> Vec<Box<dyn Marshaler<T>>>
    where
        T: Serialize + DeserializeOwned,
    {
        self.unmask()
            .into_iter()
            .map(|format| format.marshaler(stem.with_extension(format.extension())))
            .collect()
    }
}

impl From<Format> for FormatMask {
    fn from(format: Format) -> Self {
        Self(format.bits())
    }
}
