//! cfgkit: Typed Configuration Containers
//!
//! Holds a user-defined configuration type, fills its defaults from a declarative per-field
//! table or a user provider, and saves/loads it through priority-ordered marshalers (JSON,
//! TOML, YAML and environment variables).

pub mod config;
pub mod defaults;
pub mod error;
pub mod logging;
pub mod marshaler;

pub use config::{Config, DefaultsProvider};
pub use defaults::{DefaultTable, Settings};
pub use error::{BoxError, ConfigError, DefaultsError, MarshalError};
pub use marshaler::{Env, Format, FormatMask, Json, Marshaler, Toml, Yaml};
