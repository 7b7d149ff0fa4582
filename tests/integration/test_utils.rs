//! Shared test utilities for integration tests
//!
//! Provides the sample configuration type used across tests and serialized access to process
//! environment variables.

use cfgkit::{DefaultTable, Settings};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Serializes environment variable access across tests running in parallel
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Compact JSON of the fully defaulted [`Sample`]
pub const SAMPLE_JSON: &str =
    r#"{"Foo":"hello world","Bar":42,"FooBar":{"bar":2,"baz":3,"foo":1},"Baz":["foo","bar","baz"]}"#;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Sample {
    pub foo: String,
    pub bar: i64,
    pub foo_bar: BTreeMap<String, i64>,
    pub baz: Vec<String>,
}

impl Settings for Sample {
    fn default_table() -> DefaultTable {
        DefaultTable::new()
            .set("Foo", "hello world")
            .set("Bar", "42")
            .set("FooBar", r#"{"foo": 1, "bar": 2, "baz": 3}"#)
            .set("Baz", r#"["foo", "bar", "baz"]"#)
    }
}

/// The value `Sample::default_table` produces from a zero value
pub fn sample_defaults() -> Sample {
    Sample {
        foo: "hello world".to_string(),
        bar: 42,
        foo_bar: [("foo", 1), ("bar", 2), ("baz", 3)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
        baz: vec!["foo".into(), "bar".into(), "baz".into()],
    }
}

/// Run `f` with `vars` set, restoring the previous values afterwards.
pub fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());

    let previous: Vec<(String, Option<String>)> = vars
        .iter()
        .map(|(key, _)| (key.to_string(), std::env::var(key).ok()))
        .collect();
    for (key, value) in vars {
        std::env::set_var(key, value);
    }

    let result = f();

    for (key, value) in previous {
        match value {
            Some(orig) => std::env::set_var(&key, orig),
            None => std::env::remove_var(&key),
        }
    }

    result
}
