//! In-memory context store.

use bf_error::Result;
use bf_traits::ContextStore;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;

/// Thread-safe in-memory [`ContextStore`].
#[derive(Debug, Default)]
pub struct MemoryContextStore {
    values: RwLock<HashMap<String, Value>>,
}

impl MemoryContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any previous one.
    pub fn insert(&self, key: impl Into<String>, value: Value) {
        self.values.write().insert(key.into(), value);
    }

    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

impl ContextStore for MemoryContextStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.insert(key, value);
        Ok(())
    }
}
