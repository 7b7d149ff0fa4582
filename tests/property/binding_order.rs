//! Property-based tests for marshaler ordering and de-duplication

use cfgkit::{Config, Json, Marshaler};
use proptest::prelude::*;
use std::collections::HashSet;

fn json(id: usize, priority: i32) -> Box<dyn Marshaler<()>> {
    Box::new(
        Json::in_memory()
            .with_identity(format!("m{}", id))
            .with_priority(priority),
    )
}

/// Bound marshalers always run in ascending priority, equal priorities in bind order
#[test]
fn test_binding_is_sorted_and_stable() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &proptest::collection::vec(
                proptest::collection::vec(-3i32..3, 0..4),
                0..6,
            ),
            |batches| {
                let mut config = Config::new(());
                let mut expected = Vec::new();
                let mut next_id = 0usize;

                for batch in &batches {
                    let marshalers: Vec<_> = batch
                        .iter()
                        .map(|&priority| {
                            let id = next_id;
                            next_id += 1;
                            expected.push((priority, id));
                            json(id, priority)
                        })
                        .collect();
                    config.bind_marshaler(marshalers).unwrap();
                }

                // Stable sort by priority matches insertion semantics.
                expected.sort_by_key(|&(priority, _)| priority);
                let expected: Vec<String> =
                    expected.iter().map(|(_, id)| format!("m{}", id)).collect();
                prop_assert_eq!(config.marshaler_identities(), expected);
                Ok(())
            },
        )
        .unwrap();
}

/// A rejected batch never changes the bound set
#[test]
fn test_rejected_batch_is_atomic() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &(
                proptest::collection::vec(0usize..8, 1..6),
                proptest::collection::vec(0usize..8, 1..6),
            ),
            |(first, second)| {
                let first: Vec<usize> = first
                    .into_iter()
                    .collect::<HashSet<_>>()
                    .into_iter()
                    .collect();
                let mut config = Config::new(());
                config
                    .bind_marshaler(first.iter().map(|&id| json(id, 0)))
                    .unwrap();
                let before = config.marshaler_identities();

                let mut seen: HashSet<usize> = first.iter().copied().collect();
                let collides = second.iter().any(|id| !seen.insert(*id));

                let rejected = config
                    .bind_marshaler(second.iter().map(|&id| json(id, 1)))
                    .is_err();
                prop_assert_eq!(rejected, collides);
                if collides {
                    prop_assert_eq!(config.marshaler_identities(), before);
                } else {
                    prop_assert_eq!(config.marshaler_count(), first.len() + second.len());
                }
                Ok(())
            },
        )
        .unwrap();
}
