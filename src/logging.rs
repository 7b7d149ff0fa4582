//! Logging System
//!
//! Structured logging via the `tracing` crate. The library itself only emits `debug`/`trace`
//! events; applications call [`init_logging`] to install a subscriber. [`LoggingConfig`] is a
//! [`Settings`] type, so it can be defaulted, saved and loaded through a
//! [`Config`](crate::config::Config) like any other configuration.

use crate::defaults::{DefaultTable, Settings};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Environment variable holding a full filter directive; overrides the configured level.
pub const LOG_ENV: &str = "CFGKIT_LOG";

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error, off
    #[serde(default)]
    pub level: String,

    /// Output format: json, text
    #[serde(default)]
    pub format: String,

    /// Output destination: stdout, stderr
    #[serde(default)]
    pub output: String,

    /// Disable ANSI colors (text format only)
    #[serde(default)]
    pub no_color: bool,

    /// Module-specific log levels
    #[serde(default)]
    pub modules: BTreeMap<String, String>,
}

impl Settings for LoggingConfig {
    fn default_table() -> DefaultTable {
        DefaultTable::new()
            .set("level", "info")
            .set("format", "text")
            .set("output", "stdout")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Output {
    Stdout,
    Stderr,
}

/// Install the global subscriber.
///
/// Fails if the configuration is invalid or a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<(), ConfigError> {
    let filter = build_env_filter(config)?;
    let json = parse_format(&config.format)?;
    let writer = match parse_output(&config.output)? {
        Output::Stdout => BoxMakeWriter::new(std::io::stdout),
        Output::Stderr => BoxMakeWriter::new(std::io::stderr),
    };

    let registry = Registry::default().with(filter);
    let result = if json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(writer),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(!config.no_color)
                    .with_writer(writer),
            )
            .try_init()
    };

    result.map_err(|e| ConfigError::Logging(format!("Failed to install subscriber: {}", e)))
}

/// Filter from `CFGKIT_LOG` if set, else from the configured level and module overrides.
fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter, ConfigError> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }
    filter_from_config(config)
}

fn filter_from_config(config: &LoggingConfig) -> Result<EnvFilter, ConfigError> {
    let level = if config.level.is_empty() {
        "info"
    } else {
        config.level.as_str()
    };
    if level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let mut filter = EnvFilter::try_new(level)
        .map_err(|e| ConfigError::Logging(format!("Invalid log level '{}': {}", level, e)))?;
    for (module, module_level) in &config.modules {
        let directive = format!("{}={}", module, module_level);
        filter = filter.add_directive(
            directive
                .parse()
                .map_err(|e| ConfigError::Logging(format!("Invalid log directive: {}", e)))?,
        );
    }
    Ok(filter)
}

/// `true` for JSON output
fn parse_format(format: &str) -> Result<bool, ConfigError> {
    match format {
        "json" => Ok(true),
        "" | "text" => Ok(false),
        other => Err(ConfigError::Logging(format!(
            "Invalid log format: {} (must be 'json' or 'text')",
            other
        ))),
    }
}

fn parse_output(output: &str) -> Result<Output, ConfigError> {
    match output {
        "" | "stdout" => Ok(Output::Stdout),
        "stderr" => Ok(Output::Stderr),
        other => Err(ConfigError::Logging(format!(
            "Invalid log output: {} (must be 'stdout' or 'stderr')",
            other
        ))),
    }
}
