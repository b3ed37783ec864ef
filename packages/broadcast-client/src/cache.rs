//! Scoped group-list cache.
//!
//! Keyed by (account, scope). Entries are written whenever a live fetch for
//! that key succeeds and are only ever overwritten or cleared, never expired.
//! The cache exists to paint a list before the authoritative response
//! arrives; the live result always supersedes it.

use std::sync::Arc;

use crate::storage::KeyValueStore;
use crate::types::{GroupInfo, ScopedListKey};

pub struct GroupCache {
    store: Arc<dyn KeyValueStore>,
}

impl GroupCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Local read only; never performs I/O beyond the injected store.
    pub fn read(&self, key: &ScopedListKey) -> Option<Vec<GroupInfo>> {
        let raw = self.store.get(&key.cache_key())?;
        serde_json::from_str(&raw).ok()
    }

    /// Best-effort write-through; serialization failures are swallowed.
    pub fn write(&self, key: &ScopedListKey, groups: &[GroupInfo]) {
        match serde_json::to_string(groups) {
            Ok(raw) => self.store.set(&key.cache_key(), &raw),
            Err(err) => tracing::debug!(error = %err, "group cache write skipped"),
        }
    }

    pub fn clear(&self, key: &ScopedListKey) {
        self.store.remove(&key.cache_key());
    }
}
