//! Binding rules: identity de-duplication and priority ordering.

use crate::error::ConfigError;
use crate::marshaler::Marshaler;
use std::collections::HashMap;
use tracing::debug;

/// Merge `incoming` into `bound`, all or nothing.
///
/// `bound` must already be sorted by priority. Each accepted marshaler is inserted after every
/// marshaler whose priority is less than or equal to its own, so equal priorities keep
/// insertion order.
pub(crate) fn merge_marshalers<T>(
    bound: &mut Vec<Box<dyn Marshaler<T>>>,
    incoming: Vec<Box<dyn Marshaler<T>>>,
) -> Result<(), ConfigError> {
    check_identities(bound, &incoming)?;

    for marshaler in incoming {
        let priority = marshaler.priority();
        let index = bound.partition_point(|m| m.priority() <= priority);
        debug!(
            identity = %marshaler.identity(),
            priority,
            position = index,
            "Bound marshaler"
        );
        bound.insert(index, marshaler);
    }

    Ok(())
}

/// Reject any incoming identity that is already bound or repeats earlier in the batch.
fn check_identities<T>(
    bound: &[Box<dyn Marshaler<T>>],
    incoming: &[Box<dyn Marshaler<T>>],
) -> Result<(), ConfigError> {
    let mut seen: HashMap<String, i32> = bound
        .iter()
        .map(|m| (m.identity(), m.priority()))
        .collect();

    for (position, marshaler) in incoming.iter().enumerate() {
        let identity = marshaler.identity();
        if let Some(&existing_priority) = seen.get(&identity) {
            return Err(ConfigError::MarshalerAlreadyBound {
                position,
                identity,
                existing_priority,
            });
        }
        seen.insert(identity, marshaler.priority());
    }

    Ok(())
}
