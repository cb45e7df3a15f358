//! Retained bucket state.

use bf_types::ObjectEntry;
use std::collections::HashSet;

/// Keys seen at the end of the last successful poll.
///
/// Keys keep the order they were listed in; membership tests are O(1).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketSnapshot {
    keys: Vec<String>,
    members: HashSet<String>,
}

impl BucketSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a snapshot from keys, dropping repeats.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut snapshot = Self::new();
        for key in keys {
            let key = key.into();
            if snapshot.members.insert(key.clone()) {
                snapshot.keys.push(key);
            }
        }
        snapshot
    }

    pub fn from_entries(entries: &[ObjectEntry]) -> Self {
        Self::from_keys(entries.iter().map(|e| e.key.as_str()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.members.contains(key)
    }

    /// Keys in stored order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
