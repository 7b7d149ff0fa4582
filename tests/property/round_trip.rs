//! Property-based round-trip tests through the bundled file encodings

use cfgkit::{Config, Json, Marshaler, Settings, Toml, Yaml};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct Limits {
    max_connections: u32,
    burst: i64,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
struct Service {
    name: String,
    enabled: bool,
    tags: Vec<String>,
    weights: BTreeMap<String, i64>,
    limits: Limits,
}

impl Settings for Service {}

fn service_strategy() -> impl Strategy<Value = Service> {
    (
        "svc-[a-zA-Z0-9 _-]{0,12}",
        any::<bool>(),
        proptest::collection::vec("tag-[a-z]{1,6}", 0..4),
        proptest::collection::btree_map("k[a-z]{0,7}", any::<i32>().prop_map(i64::from), 0..4),
        (any::<u32>(), any::<i32>().prop_map(i64::from)),
    )
        .prop_map(|(name, enabled, tags, weights, (max_connections, burst))| Service {
            name,
            enabled,
            tags,
            weights,
            limits: Limits {
                max_connections,
                burst,
            },
        })
}

fn round_trip(marshaler: Box<dyn Marshaler<Service>>, value: &Service) -> Service {
    let bytes = marshaler.marshal(value).unwrap();
    let mut config = Config::new(Service::default());
    config.bind_marshaler([marshaler]).unwrap();
    config.load_bytes(&[bytes]).unwrap().clone()
}

/// Unmarshal(Marshal(v)) equals v for every bundled file encoding
#[test]
fn test_file_encodings_round_trip() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&service_strategy(), |service| {
            let original = Config::new(service.clone());
            for marshaler in [
                Box::new(Json::in_memory()) as Box<dyn Marshaler<Service>>,
                Box::new(Json::in_memory().minified(true)) as Box<dyn Marshaler<Service>>,
                Box::new(Toml::in_memory()) as Box<dyn Marshaler<Service>>,
                Box::new(Yaml::in_memory()) as Box<dyn Marshaler<Service>>,
            ] {
                let identity = marshaler.identity();
                let decoded = Config::new(round_trip(marshaler, &service));
                prop_assert!(decoded.equal(&original), "{} round trip differs", identity);
            }
            Ok(())
        })
        .unwrap();
}
