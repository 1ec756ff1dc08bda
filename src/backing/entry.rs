//! TTL Entry Module
//!
//! One value in the counter/TTL backing store. Unlike draft records, these
//! entries carry an absolute expiry stamp that may be attached after
//! creation (the INCR-then-EXPIRE pattern of fixed-window counters).

use std::time::{SystemTime, UNIX_EPOCH};

// == Ttl Entry ==
#[derive(Debug, Clone)]
pub struct TtlEntry {
    /// Stored value; counters are stringified integers
    pub value: String,
    /// Expiration stamp (Unix milliseconds), None = no expiry yet
    pub expires_at: Option<u64>,
}

impl TtlEntry {
    /// Creates an entry, with expiry when a TTL is given.
    pub fn new(value: String, ttl_seconds: Option<u64>) -> Self {
        Self {
            value,
            expires_at: ttl_seconds.map(|ttl| now_ms() + ttl * 1000),
        }
    }

    /// True once the current time reaches the expiry stamp.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => now_ms() >= expires,
            None => false,
        }
    }

    /// Attaches or replaces the expiry stamp, counted from now.
    pub fn set_ttl(&mut self, ttl_seconds: u64) {
        self.expires_at = Some(now_ms() + ttl_seconds * 1000);
    }

    /// Parses the value as a counter.
    pub fn as_int(&self) -> Option<i64> {
        self.value.trim().parse().ok()
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_without_ttl_never_expires() {
        let entry = TtlEntry::new("v".into(), None);
        assert!(!entry.is_expired());
        assert!(entry.expires_at.is_none());
    }

    #[test]
    fn test_entry_expiry_boundary() {
        let mut entry = TtlEntry::new("v".into(), Some(60));
        assert!(!entry.is_expired());

        // Force the stamp to the current instant
        entry.expires_at = Some(now_ms());
        assert!(entry.is_expired());
    }

    #[test]
    fn test_set_ttl_attaches_expiry() {
        let mut entry = TtlEntry::new("1".into(), None);
        entry.set_ttl(60);
        assert!(entry.expires_at.is_some());
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_as_int() {
        assert_eq!(TtlEntry::new("5".into(), None).as_int(), Some(5));
        assert_eq!(TtlEntry::new(" 12 ".into(), None).as_int(), Some(12));
        assert_eq!(TtlEntry::new("{\"a\":1}".into(), None).as_int(), None);
    }
}
