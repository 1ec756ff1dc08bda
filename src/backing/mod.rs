//! Backing Store Module
//!
//! The networked counter/TTL capability consumed by the response cache and
//! the rate limiter. The trait mirrors the upstream cache server's small
//! contract (get/set/incr/expire/keys/del); `MemoryTtlStore` is the
//! in-process implementation, and tests inject failing implementations to
//! exercise degraded paths.

mod entry;
mod memory;

pub use entry::TtlEntry;
pub use memory::MemoryTtlStore;

use async_trait::async_trait;

use crate::error::BackingResult;

// == Ttl Store Trait ==
#[async_trait]
pub trait TtlStore: Send + Sync {
    /// Returns the live value under `key`, if any.
    async fn get(&self, key: &str) -> BackingResult<Option<String>>;

    /// Stores `value` under `key` with a TTL in seconds.
    async fn set(&self, key: &str, value: String, ttl_seconds: u64) -> BackingResult<()>;

    /// Atomically increments the counter under `key`, creating it at 1.
    /// A fresh counter has no expiry until `expire` is called.
    async fn incr(&self, key: &str) -> BackingResult<i64>;

    /// Attaches a TTL to an existing key; no-op when the key is absent.
    async fn expire(&self, key: &str, ttl_seconds: u64) -> BackingResult<()>;

    /// Lists live keys matching `pattern` (`*` suffix for prefix match,
    /// bare `*` for all, anything else exact).
    async fn keys(&self, pattern: &str) -> BackingResult<Vec<String>>;

    /// Deletes the given keys; returns how many existed.
    async fn del(&self, keys: &[String]) -> BackingResult<u64>;
}
