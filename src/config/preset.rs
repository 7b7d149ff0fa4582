//! Preset constructors: a defaulted container, optionally bound to one file encoding at its
//! default location.

use super::Config;
use crate::defaults::Settings;
use crate::error::ConfigError;
use crate::marshaler::{Json, Marshaler, Toml, Yaml};

impl<T: Settings + Default> Config<T> {
    /// Container around `T::default()` with defaults applied.
    pub fn with_defaults() -> Result<Self, ConfigError> {
        let mut config = Self::new(T::default());
        config.defaults()?;
        Ok(config)
    }

    /// Defaulted container bound to `config.json`.
    pub fn with_json() -> Result<Self, ConfigError> {
        Self::preset(Json::new(Json::DEFAULT_LOCATION))
    }

    /// Defaulted container bound to `config.toml`.
    pub fn with_toml() -> Result<Self, ConfigError> {
        Self::preset(Toml::new(Toml::DEFAULT_LOCATION))
    }

    /// Defaulted container bound to `config.yml`.
    pub fn with_yaml() -> Result<Self, ConfigError> {
        Self::preset(Yaml::new(Yaml::DEFAULT_LOCATION))
    }

    fn preset<M>(marshaler: M) -> Result<Self, ConfigError>
    where
        M: Marshaler<T> + 'static,
    {
        let mut config = Self::with_defaults()?;
        config.bind(marshaler)?;
        Ok(config)
    }
}
