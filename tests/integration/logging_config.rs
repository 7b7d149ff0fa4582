//! Logging configuration loaded through a container.

use cfgkit::logging::{init_logging, LoggingConfig};
use cfgkit::{Config, Toml};
use tempfile::TempDir;

#[test]
fn test_logging_config_from_toml_keeps_defaults_for_missing_keys() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("logging.toml");
    std::fs::write(
        &path,
        r#"
level = "debug"

[modules]
"cfgkit::config" = "trace"
"#,
    )
    .unwrap();

    let mut config = Config::new(LoggingConfig::default());
    config.bind(Toml::new(&path)).unwrap();
    config.load_path().unwrap();
    config.defaults().unwrap();

    let logging = config.data();
    assert_eq!(logging.level, "debug");
    assert_eq!(logging.format, "text");
    assert_eq!(logging.output, "stdout");
    assert_eq!(
        logging.modules.get("cfgkit::config").map(String::as_str),
        Some("trace")
    );
}

#[test]
fn test_init_logging_rejects_invalid_format() {
    let logging = LoggingConfig {
        format: "xml".to_string(),
        ..Default::default()
    };
    assert!(init_logging(&logging).is_err());
}
