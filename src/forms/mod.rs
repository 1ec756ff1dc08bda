//! Forms Module
//!
//! Bounded, TTL-based draft-form cache: lets form UIs save and restore
//! partially-filled state without unbounded storage growth, and without
//! re-surfacing data for forms already submitted.

mod cache;
mod debounce;
mod persist;
mod record;
mod stats;
mod store;


// Re-export public types
pub use cache::FormCache;
pub use debounce::DebouncedWriter;
pub use persist::{FileBackend, MemoryBackend, StorageBackend};
pub use record::FormRecord;
pub use stats::FormStats;
pub use store::FormStore;

// == Public Constants ==
/// Per-record serialized byte budget (10 KB)
pub const MAX_RECORD_BYTES: usize = 10 * 1024;

/// Aggregate persisted byte budget (100 KB), applied at flush time only
pub const MAX_STORE_BYTES: usize = 100 * 1024;

/// Maximum number of draft records retained
pub const MAX_FORMS: usize = 10;

/// Draft lifetime in milliseconds (24 hours)
pub const EXPIRATION_MS: u64 = 24 * 60 * 60 * 1000;

/// Debounce quiet window in milliseconds
pub const DEBOUNCE_QUIET_MS: u64 = 500;

/// Hard flush deadline in milliseconds from the first pending write
pub const DEBOUNCE_MAX_WAIT_MS: u64 = 2000;

/// Fixed storage name holding the whole serialized draft map
pub const STORAGE_KEY: &str = "agency-form-storage";
