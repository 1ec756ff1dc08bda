//! Form Cache Statistics Module
//!
//! Tracks draft-store activity: writes, reads, rejections, evictions.

use serde::Serialize;

// == Form Stats ==
/// Counters describing draft-store activity since startup.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FormStats {
    /// Number of successful draft reads
    pub hits: u64,
    /// Number of failed draft reads (missing, expired, or submitted)
    pub misses: u64,
    /// Number of accepted draft writes
    pub writes: u64,
    /// Number of writes rejected for exceeding the per-record byte budget
    pub oversized_rejections: u64,
    /// Number of records evicted under the record-count cap
    pub evictions: u64,
    /// Number of records removed by expiry (eager or swept)
    pub expirations: u64,
    /// Current number of records in the store
    pub total_records: usize,
}

impl FormStats {
    // == Constructor ==
    /// Creates a new FormStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Recorders ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Increments the accepted-write counter.
    pub fn record_write(&mut self) {
        self.writes += 1;
    }

    /// Increments the oversized-rejection counter.
    pub fn record_oversized_rejection(&mut self) {
        self.oversized_rejections += 1;
    }

    /// Increments the eviction counter.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Increments the expiration counter.
    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    /// Updates the total record count.
    pub fn set_total_records(&mut self, count: usize) {
        self.total_records = count;
    }
}
