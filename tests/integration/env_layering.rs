//! Environment source layered over file encodings.

use super::test_utils::{sample_defaults, with_env_vars, Sample};
use cfgkit::{Config, ConfigError, DefaultTable, Env, MarshalError, Settings, Toml};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct Storage {
    path: String,
    retention: u32,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct Node {
    name: String,
    port: u16,
    debug: bool,
    storage: Storage,
}

impl Settings for Node {
    fn default_table() -> DefaultTable {
        DefaultTable::new()
            .set("name", "node")
            .set("port", "7000")
            .set("storage.path", "/var/lib/node")
            .set("storage.retention", "14")
    }
}

#[test]
fn test_dotenv_file_overrides_toml_file() {
    let temp_dir = TempDir::new().unwrap();
    let toml_path = temp_dir.path().join("node.toml");
    let env_path = temp_dir.path().join(".env");

    std::fs::write(
        &toml_path,
        r#"
name = "alpha"
port = 7100
debug = false

[storage]
path = "/srv/alpha"
retention = 30
"#,
    )
    .unwrap();
    std::fs::write(&env_path, "# overrides\nNODE_PORT=7200\nNODE_STORAGE__RETENTION=3\n").unwrap();

    let mut config = Config::new(Node::default());
    // Bound first, still runs last.
    config
        .bind(Env::new("NODE").with_location(&env_path))
        .unwrap();
    config.bind(Toml::new(&toml_path)).unwrap();
    config.load_path().unwrap();

    let node = config.data();
    assert_eq!(node.name, "alpha");
    assert_eq!(node.port, 7200);
    assert_eq!(node.storage.path, "/srv/alpha");
    assert_eq!(node.storage.retention, 3);
}

#[test]
fn test_load_env_from_process() {
    let mut config = Config::<Node>::with_defaults().unwrap();

    with_env_vars(
        &[
            ("CFGKIT_IT_NAME", "from-env"),
            ("CFGKIT_IT_DEBUG", "true"),
            ("CFGKIT_IT_STORAGE__PATH", "/tmp/node"),
        ],
        || config.load_env(&Env::new("CFGKIT_IT")).map(|_| ()),
    )
    .unwrap();

    let node = config.data();
    assert_eq!(node.name, "from-env");
    assert!(node.debug);
    assert_eq!(node.port, 7000);
    assert_eq!(node.storage.path, "/tmp/node");
    assert_eq!(node.storage.retention, 14);
}

#[test]
fn test_load_env_type_error_keeps_data() {
    let mut config = Config::<Node>::with_defaults().unwrap();
    let before = config.data().clone();

    let err = with_env_vars(&[("CFGKIT_BAD_PORT", "not-a-port")], || {
        config.load_env(&Env::new("CFGKIT_BAD")).map(|_| ())
    })
    .unwrap_err();

    assert!(matches!(err, ConfigError::DecodeFailed { ref identity, .. } if identity == "env"));
    assert_eq!(config.data(), &before);
}

#[test]
fn test_load_env_reports_keys_without_matching_field() {
    let mut config = Config::<Sample>::with_defaults().unwrap();

    let err = with_env_vars(&[("CFGKIT_PASCAL_FOO", "from-env")], || {
        config.load_env(&Env::new("CFGKIT_PASCAL")).map(|_| ())
    })
    .unwrap_err();

    match err {
        ConfigError::DecodeFailed { identity, source } => {
            assert_eq!(identity, "env");
            assert!(matches!(source, MarshalError::Unsupported(ref msg) if msg.contains("'foo'")));
        }
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(config.data(), &sample_defaults());
}

#[test]
fn test_env_save_writes_dotenv() {
    let temp_dir = TempDir::new().unwrap();
    let env_path = temp_dir.path().join("node.env");

    let mut config = Config::<Node>::with_defaults().unwrap();
    config
        .bind(Env::new("NODE").with_location(&env_path))
        .unwrap();
    config.save().unwrap();

    assert_eq!(
        std::fs::read_to_string(&env_path).unwrap(),
        "NODE_DEBUG=false\nNODE_NAME=node\nNODE_PORT=7000\nNODE_STORAGE__PATH=/var/lib/node\nNODE_STORAGE__RETENTION=14\n"
    );
}
