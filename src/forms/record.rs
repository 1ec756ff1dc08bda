//! Form Record Module
//!
//! Defines the structure of a single in-progress form draft.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// == Form Record ==
/// One draft entry: the partially-filled field values plus bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormRecord {
    /// Field name to value mapping (the in-progress answers)
    pub fields: Map<String, Value>,
    /// Last-write timestamp (Unix milliseconds), refreshed on every write
    pub timestamp: u64,
    /// Set once the form was successfully submitted; a submitted record is
    /// hidden from reads but retained until expiry or explicit clear
    #[serde(default)]
    pub submitted: bool,
}

impl FormRecord {
    // == Constructor ==
    /// Creates a fresh in-progress record stamped with the current time.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self {
            fields,
            timestamp: current_timestamp_ms(),
            submitted: false,
        }
    }

    // == Is Expired ==
    /// Checks whether the record's age exceeds the expiration window.
    ///
    /// Boundary condition: a record is expired when its age is strictly
    /// greater than `expiration_ms`; a record written exactly
    /// `expiration_ms` ago is still live.
    pub fn is_expired(&self, expiration_ms: u64) -> bool {
        self.age_ms() > expiration_ms
    }

    // == Age ==
    /// Returns the record's age in milliseconds.
    ///
    /// A timestamp in the future (clock skew between writes) counts as age 0.
    pub fn age_ms(&self) -> u64 {
        current_timestamp_ms().saturating_sub(self.timestamp)
    }

    // == Serialized Size ==
    /// Returns the record's serialized size in bytes, as counted against the
    /// per-record and aggregate byte budgets.
    pub fn serialized_size(&self) -> usize {
        serde_json::to_vec(self).map(|v| v.len()).unwrap_or(0)
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("Time went backwards")
        .as_millis() as u64
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_record_creation() {
        let record = FormRecord::new(fields(&[("name", json!("Alice"))]));

        assert_eq!(record.fields["name"], json!("Alice"));
        assert!(!record.submitted);
        assert!(!record.is_expired(60_000));
    }

    #[test]
    fn test_record_expiration() {
        let mut record = FormRecord::new(Map::new());

        // Backdate the record past the window
        record.timestamp = current_timestamp_ms() - 1000;

        assert!(record.is_expired(500));
        assert!(!record.is_expired(10_000));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let mut record = FormRecord::new(Map::new());
        record.timestamp = current_timestamp_ms();

        // Age 0 is never past any window, including a zero-length one at
        // the same tick
        assert!(!record.is_expired(60_000));
    }

    #[test]
    fn test_future_timestamp_is_age_zero() {
        let mut record = FormRecord::new(Map::new());
        record.timestamp = current_timestamp_ms() + 60_000;

        assert_eq!(record.age_ms(), 0);
        assert!(!record.is_expired(0));
    }

    #[test]
    fn test_serialized_size_grows_with_fields() {
        let small = FormRecord::new(fields(&[("a", json!(1))]));
        let large = FormRecord::new(fields(&[("a", json!("x".repeat(1000)))]));

        assert!(large.serialized_size() > small.serialized_size());
    }

    #[test]
    fn test_serde_roundtrip_defaults_submitted() {
        // Older persisted records may lack the submitted flag entirely
        let json = r#"{"fields":{"name":"Bob"},"timestamp":123}"#;
        let record: FormRecord = serde_json::from_str(json).unwrap();

        assert!(!record.submitted);
        assert_eq!(record.timestamp, 123);
    }
}
