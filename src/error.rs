//! Error types for the configuration container.

use std::path::PathBuf;
use thiserror::Error;

/// Boxed error returned by user-supplied defaults providers
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Container-level errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot marshal/unmarshal: no marshalers are bound to this object")]
    NoMarshalersBound,

    #[error(
        "marshaler at position {position} is already bound: identity '{identity}' (existing priority {existing_priority})"
    )]
    MarshalerAlreadyBound {
        position: usize,
        identity: String,
        existing_priority: i32,
    },

    #[error("mismatched marshaler and input counts: marshalers: {marshalers}, inputs: {inputs}")]
    MismatchedInputCount { marshalers: usize, inputs: usize },

    #[error("config (load path): failed to open {path:?} for marshaler '{identity}': {source}")]
    OpenFailed {
        identity: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config (load path): failed to read {path:?} for marshaler '{identity}': {source}")]
    ReadFailed {
        identity: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config (save): marshaler '{identity}' failed to encode: {source}")]
    EncodeFailed {
        identity: String,
        #[source]
        source: MarshalError,
    },

    #[error("config (save): marshaler '{identity}' failed to write {path:?}: {source}")]
    WriteFailed {
        identity: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config (load): marshaler '{identity}' failed to decode: {source}")]
    DecodeFailed {
        identity: String,
        #[source]
        source: MarshalError,
    },

    #[error("defaults provider failed: {0}")]
    DefaultsProvider(#[source] BoxError),

    #[error("defaults: {0}")]
    Defaults(#[from] DefaultsError),

    #[error("logging: {0}")]
    Logging(String),
}

/// Errors raised by a marshaler while encoding or decoding
#[derive(Debug, Error)]
pub enum MarshalError {
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML encode: {0}")]
    TomlEncode(#[from] toml::ser::Error),

    #[error("TOML decode: {0}")]
    TomlDecode(#[from] toml::de::Error),

    #[error("YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("environment: {0}")]
    Env(#[from] config::ConfigError),

    #[error("input is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("unsupported: {0}")]
    Unsupported(String),
}

/// Errors raised while applying a default table
#[derive(Debug, Error)]
pub enum DefaultsError {
    #[error("failed to project value for defaulting: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("no field at path '{path}'")]
    UnknownField { path: String },

    #[error("default for '{path}' does not match the field type (literal {literal:?}): {source}")]
    TypeMismatch {
        path: String,
        literal: String,
        #[source]
        source: serde_json::Error,
    },
}
