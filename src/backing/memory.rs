//! In-Memory TTL Store
//!
//! Process-local implementation of the backing-store contract. Expired
//! entries are dropped lazily on access; no background pass is needed
//! because every read path checks liveness first.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::backing::{TtlEntry, TtlStore};
use crate::error::{BackingError, BackingResult};

// == Memory Ttl Store ==
#[derive(Debug, Default)]
pub struct MemoryTtlStore {
    entries: RwLock<HashMap<String, TtlEntry>>,
}

impl MemoryTtlStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current number of entries, live or not yet reaped.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl TtlStore for MemoryTtlStore {
    async fn get(&self, key: &str) -> BackingResult<Option<String>> {
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if entry.is_expired() => {
                entries.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String, ttl_seconds: u64) -> BackingResult<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), TtlEntry::new(value, Some(ttl_seconds)));
        Ok(())
    }

    async fn incr(&self, key: &str) -> BackingResult<i64> {
        let mut entries = self.entries.write().await;

        let fresh = match entries.get(key) {
            None => true,
            Some(entry) => entry.is_expired(),
        };
        if fresh {
            entries.insert(key.to_string(), TtlEntry::new("1".to_string(), None));
            return Ok(1);
        }

        let entry = entries
            .get_mut(key)
            .ok_or_else(|| BackingError::Unavailable(key.to_string()))?;
        let current = entry
            .as_int()
            .ok_or_else(|| BackingError::NotAnInteger(key.to_string()))?;
        let next = current + 1;
        entry.value = next.to_string();
        Ok(next)
    }

    async fn expire(&self, key: &str, ttl_seconds: u64) -> BackingResult<()> {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get_mut(key) {
            entry.set_ttl(ttl_seconds);
        }
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> BackingResult<Vec<String>> {
        let entries = self.entries.read().await;
        let matches = |key: &str| -> bool {
            if pattern == "*" {
                true
            } else if let Some(prefix) = pattern.strip_suffix('*') {
                key.starts_with(prefix)
            } else {
                key == pattern
            }
        };

        Ok(entries
            .iter()
            .filter(|(key, entry)| !entry.is_expired() && matches(key))
            .map(|(key, _)| key.clone())
            .collect())
    }

    async fn del(&self, keys: &[String]) -> BackingResult<u64> {
        let mut entries = self.entries.write().await;
        let mut removed = 0;
        for key in keys {
            if entries.remove(key).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }
}
