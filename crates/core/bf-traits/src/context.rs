//! Scoped variable stores.

use bf_error::Result;
use serde_json::Value;

/// A key-value store for flow- or global-scoped variables.
///
/// Lookups may fail (for example a backing store that is unavailable); a
/// missing key is `Ok(None)`, not an error.
pub trait ContextStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>>;

    fn set(&self, key: &str, value: Value) -> Result<()>;
}
