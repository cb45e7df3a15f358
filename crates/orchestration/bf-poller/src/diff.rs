//! Snapshot diffing.

use bf_types::{ChangeEvent, ObjectEntry};
use std::collections::HashSet;

use crate::snapshot::BucketSnapshot;

/// Compute the changes between a retained snapshot and a fresh listing.
///
/// Adds come first, in listing order, each carrying its listing entry.
/// Deletes follow in the snapshot's stored order. Keys present on both sides
/// produce nothing.
pub fn diff(previous: &BucketSnapshot, current: &[ObjectEntry]) -> Vec<ChangeEvent> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(current.len());
    let mut events = Vec::new();

    for entry in current {
        if !seen.insert(entry.key.as_str()) {
            continue;
        }
        if !previous.contains(&entry.key) {
            events.push(ChangeEvent::added(entry.clone()));
        }
    }

    events.extend(
        previous
            .keys()
            .iter()
            .filter(|key| !seen.contains(key.as_str()))
            .map(|key| ChangeEvent::deleted(key.as_str())),
    );

    events
}
