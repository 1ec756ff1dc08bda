//! Form Store Module
//!
//! Synchronous core of the draft cache: bounded record map with merge
//! semantics, per-record size rejection, oldest-first eviction, expiry
//! sweeps, and submitted-state tracking. The async facade in `cache.rs`
//! wraps this behind a lock and the debounced persistence writer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{FormError, FormResult};
use crate::forms::{FormRecord, FormStats, EXPIRATION_MS, MAX_FORMS, MAX_RECORD_BYTES};

// == Persistence Envelope ==
/// Stable on-disk shape: `{ "state": { "forms": { <form_id>: record } } }`.
#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    state: EnvelopeState,
}

#[derive(Debug, Serialize, Deserialize)]
struct EnvelopeState {
    forms: HashMap<String, FormRecord>,
}

// == Form Store ==
/// Bounded draft-record map with TTL expiry and submitted-state tracking.
#[derive(Debug)]
pub struct FormStore {
    /// Form id to draft record
    records: HashMap<String, FormRecord>,
    /// Activity counters
    stats: FormStats,
    /// Maximum number of records retained
    max_forms: usize,
    /// Record lifetime in milliseconds
    expiration_ms: u64,
    /// Per-record serialized byte budget
    max_record_bytes: usize,
}

impl FormStore {
    // == Constructors ==
    /// Creates a FormStore with the production limits.
    pub fn new() -> Self {
        Self::with_limits(MAX_FORMS, EXPIRATION_MS, MAX_RECORD_BYTES)
    }

    /// Creates a FormStore with explicit limits (tests shrink these).
    pub fn with_limits(max_forms: usize, expiration_ms: u64, max_record_bytes: usize) -> Self {
        Self {
            records: HashMap::new(),
            stats: FormStats::new(),
            max_forms,
            expiration_ms,
            max_record_bytes,
        }
    }

    // == Set ==
    /// Merges `fields` into the record for `form_id`.
    ///
    /// Shallow top-level merge: incoming keys overwrite existing ones, keys
    /// absent from `fields` are kept. The write refreshes the timestamp and
    /// resets `submitted` to false (a write starts a new in-progress
    /// session). The size budget is checked against the serialized *merged*
    /// record; an oversized write is rejected and the store left unchanged.
    /// After an accepted write, oldest records are evicted until the count
    /// is within the cap.
    pub fn set(&mut self, form_id: &str, fields: Map<String, Value>) -> FormResult<()> {
        let mut merged = self
            .records
            .get(form_id)
            .map(|record| record.fields.clone())
            .unwrap_or_default();
        for (key, value) in fields {
            merged.insert(key, value);
        }

        let record = FormRecord::new(merged);
        let size = record.serialized_size();
        if size > self.max_record_bytes {
            self.stats.record_oversized_rejection();
            return Err(FormError::RecordTooLarge {
                form_id: form_id.to_string(),
                size,
                limit: self.max_record_bytes,
            });
        }

        self.records.insert(form_id.to_string(), record);
        self.evict_over_cap();

        self.stats.record_write();
        self.stats.set_total_records(self.records.len());
        Ok(())
    }

    // == Get ==
    /// Retrieves the draft fields for `form_id`.
    ///
    /// An expired record is removed eagerly and reported as `Expired`; a
    /// submitted record is retained but reported as `AlreadySubmitted`.
    /// Both count as misses.
    pub fn get(&mut self, form_id: &str) -> FormResult<Map<String, Value>> {
        match self.records.get(form_id) {
            None => {
                self.stats.record_miss();
                Err(FormError::NotFound(form_id.to_string()))
            }
            Some(record) if record.is_expired(self.expiration_ms) => {
                self.records.remove(form_id);
                self.stats.record_expiration();
                self.stats.record_miss();
                self.stats.set_total_records(self.records.len());
                Err(FormError::Expired(form_id.to_string()))
            }
            Some(record) if record.submitted => {
                self.stats.record_miss();
                Err(FormError::AlreadySubmitted(form_id.to_string()))
            }
            Some(record) => {
                let fields = record.fields.clone();
                self.stats.record_hit();
                Ok(fields)
            }
        }
    }

    // == Remove ==
    /// Removes the record for `form_id`; returns whether one existed.
    pub fn remove(&mut self, form_id: &str) -> bool {
        let removed = self.records.remove(form_id).is_some();
        self.stats.set_total_records(self.records.len());
        removed
    }

    // == Clear ==
    /// Empties the store.
    pub fn clear(&mut self) {
        self.records.clear();
        self.stats.set_total_records(0);
    }

    // == Sweep Expired ==
    /// Removes every expired record. Returns the number removed.
    pub fn sweep_expired(&mut self) -> usize {
        let expired: Vec<String> = self
            .records
            .iter()
            .filter(|(_, record)| record.is_expired(self.expiration_ms))
            .map(|(id, _)| id.clone())
            .collect();

        let count = expired.len();
        for id in expired {
            self.records.remove(&id);
            self.stats.record_expiration();
        }
        self.stats.set_total_records(self.records.len());
        count
    }

    // == Mark Submitted ==
    /// Flags the record for `form_id` as submitted. Does not create a
    /// record when none exists; returns whether a record was flagged.
    pub fn mark_submitted(&mut self, form_id: &str) -> bool {
        match self.records.get_mut(form_id) {
            Some(record) => {
                record.submitted = true;
                true
            }
            None => false,
        }
    }

    // == Is Submitted ==
    /// True iff a record exists and its submitted flag is set.
    ///
    /// Expiry is deliberately ignored here: a submitted-but-expired record
    /// still reads as submitted until actually swept, which blocks a
    /// resubmission race right at the expiry boundary. Reads through
    /// `get` treat the same record as absent.
    pub fn is_submitted(&self, form_id: &str) -> bool {
        self.records
            .get(form_id)
            .map(|record| record.submitted)
            .unwrap_or(false)
    }

    // == Persist Payload ==
    /// Builds the persistence envelope, re-applying the aggregate byte
    /// budget.
    ///
    /// Records are taken newest-timestamp-first (id-ascending tie-break)
    /// and accumulation stops once the running serialized size would pass
    /// `max_total_bytes`, so the oldest drafts are the ones dropped and the
    /// payload is a deterministic function of store contents. The running
    /// total counts the full serialized cost of each entry, key punctuation
    /// and envelope wrapper included, so the serialized payload never
    /// exceeds the budget. The in-memory store itself is left untouched; it
    /// may transiently exceed the persisted budget between flushes.
    pub fn persist_payload(&self, max_total_bytes: usize) -> Value {
        // Serialized `{"state":{"forms":{}}}` wrapper
        const ENVELOPE_BYTES: usize = 22;
        // Key quotes, colon, and separating comma per entry
        const ENTRY_BYTES: usize = 4;

        let mut ordered: Vec<(&String, &FormRecord)> = self.records.iter().collect();
        ordered.sort_by(|(id_a, rec_a), (id_b, rec_b)| {
            rec_b
                .timestamp
                .cmp(&rec_a.timestamp)
                .then_with(|| id_a.cmp(id_b))
        });

        let mut total = ENVELOPE_BYTES;
        let mut forms = Map::new();
        for (id, record) in ordered {
            let size = record.serialized_size() + id.len() + ENTRY_BYTES;
            if total + size > max_total_bytes {
                break;
            }
            total += size;
            if let Ok(value) = serde_json::to_value(record) {
                forms.insert(id.clone(), value);
            }
        }

        serde_json::json!({ "state": { "forms": forms } })
    }

    // == Load ==
    /// Replaces the record map from a previously persisted envelope.
    ///
    /// Returns the number of records loaded. A malformed envelope is a
    /// serialization error; the caller discards it as a cold cache.
    pub fn load(&mut self, value: Value) -> FormResult<usize> {
        let envelope: Envelope = serde_json::from_value(value)?;
        self.records = envelope.state.forms;
        self.stats.set_total_records(self.records.len());
        Ok(self.records.len())
    }

    // == Accessors ==
    /// Returns the current number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns current activity counters.
    pub fn stats(&self) -> FormStats {
        let mut stats = self.stats.clone();
        stats.set_total_records(self.records.len());
        stats
    }

    /// Whether any record (live, expired, or submitted) exists for the id.
    pub fn contains(&self, form_id: &str) -> bool {
        self.records.contains_key(form_id)
    }

    // == Eviction ==
    /// Evicts oldest-by-timestamp records until the count is within the
    /// cap. Equal timestamps break toward evicting the lexicographically
    /// greatest id, keeping the survivor set deterministic.
    fn evict_over_cap(&mut self) {
        while self.records.len() > self.max_forms {
            let victim = self
                .records
                .iter()
                .min_by(|(id_a, rec_a), (id_b, rec_b)| {
                    rec_a
                        .timestamp
                        .cmp(&rec_b.timestamp)
                        .then_with(|| id_b.cmp(id_a))
                })
                .map(|(id, _)| id.clone());

            match victim {
                Some(id) => {
                    self.records.remove(&id);
                    self.stats.record_eviction();
                }
                None => break,
            }
        }
    }

    /// Backdates a record's timestamp; test-only clock control.
    #[cfg(test)]
    pub(crate) fn backdate(&mut self, form_id: &str, age_ms: u64) {
        use crate::forms::record::current_timestamp_ms;
        if let Some(record) = self.records.get_mut(form_id) {
            record.timestamp = current_timestamp_ms() - age_ms;
        }
    }
}

impl Default for FormStore {
    fn default() -> Self {
        Self::new()
    }
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
    fn test_store_new() {
        let store = FormStore::new();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = FormStore::new();

        store
            .set("quote", fields(&[("name", json!("Alice"))]))
            .unwrap();
        let draft = store.get("quote").unwrap();

        assert_eq!(draft["name"], json!("Alice"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = FormStore::new();

        let result = store.get("nonexistent");
        assert!(matches!(result, Err(FormError::NotFound(_))));
    }

    #[test]
    fn test_store_shallow_merge() {
        let mut store = FormStore::new();

        store
            .set("quote", fields(&[("name", json!("Alice")), ("age", json!(30))]))
            .unwrap();
        store
            .set("quote", fields(&[("age", json!(31)), ("city", json!("Lyon"))]))
            .unwrap();

        let draft = store.get("quote").unwrap();
        assert_eq!(draft["name"], json!("Alice"));
        assert_eq!(draft["age"], json!(31));
        assert_eq!(draft["city"], json!("Lyon"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_oversized_write_rejected_and_state_unchanged() {
        let mut store = FormStore::with_limits(10, EXPIRATION_MS, 256);

        store
            .set("quote", fields(&[("name", json!("Alice"))]))
            .unwrap();

        // The merged record (existing fields plus the big delta) is what
        // gets measured
        let result = store.set("quote", fields(&[("blob", json!("x".repeat(300)))]));
        assert!(matches!(result, Err(FormError::RecordTooLarge { .. })));

        let draft = store.get("quote").unwrap();
        assert_eq!(draft["name"], json!("Alice"));
        assert!(!draft.contains_key("blob"));
        assert_eq!(store.stats().oversized_rejections, 1);
    }

    #[test]
    fn test_store_oversized_merge_of_small_delta() {
        let mut store = FormStore::with_limits(10, EXPIRATION_MS, 256);

        store
            .set("quote", fields(&[("blob", json!("x".repeat(180)))]))
            .unwrap();

        // The delta alone is tiny but the merged record crosses the budget
        let result = store.set("quote", fields(&[("more", json!("y".repeat(100)))]));
        assert!(matches!(result, Err(FormError::RecordTooLarge { .. })));

        let draft = store.get("quote").unwrap();
        assert!(!draft.contains_key("more"));
    }

    #[test]
    fn test_store_expiry_removes_on_read() {
        let mut store = FormStore::new();

        store
            .set("quote", fields(&[("name", json!("Alice"))]))
            .unwrap();
        store.backdate("quote", EXPIRATION_MS + 1);

        let result = store.get("quote");
        assert!(matches!(result, Err(FormError::Expired(_))));

        // Eager cleanup: the record is gone, a re-write starts fresh
        assert!(!store.contains("quote"));
        store.set("quote", fields(&[("name", json!("Bob"))])).unwrap();
        assert!(!store.is_submitted("quote"));
        assert_eq!(store.get("quote").unwrap()["name"], json!("Bob"));
    }

    #[test]
    fn test_store_eviction_keeps_most_recent() {
        let mut store = FormStore::with_limits(10, EXPIRATION_MS, MAX_RECORD_BYTES);

        for i in 0..11 {
            let id = format!("form-{i:02}");
            store.set(&id, fields(&[("n", json!(i))])).unwrap();
            // Distinct timestamps, oldest first
            store.backdate(&id, (10 - i) * 1000);
        }
        // One more write triggers the eviction pass over 11 records
        store.set("form-10", fields(&[("n", json!(10))])).unwrap();

        assert_eq!(store.len(), 10);
        assert!(!store.contains("form-00"), "oldest record should be evicted");
        for i in 1..11 {
            assert!(store.contains(&format!("form-{i:02}")));
        }
    }

    #[test]
    fn test_store_eviction_tie_break_is_deterministic() {
        let mut store = FormStore::with_limits(3, EXPIRATION_MS, MAX_RECORD_BYTES);

        store.set("a", fields(&[("n", json!(1))])).unwrap();
        store.set("b", fields(&[("n", json!(2))])).unwrap();
        store.set("c", fields(&[("n", json!(3))])).unwrap();
        for id in ["a", "b", "c"] {
            store.backdate(id, 5000);
        }
        store.set("d", fields(&[("n", json!(4))])).unwrap();

        // Among the three equal-timestamp records, the greatest id goes
        assert_eq!(store.len(), 3);
        assert!(store.contains("a"));
        assert!(store.contains("b"));
        assert!(!store.contains("c"));
        assert!(store.contains("d"));
    }

    #[test]
    fn test_store_remove_idempotent() {
        let mut store = FormStore::new();

        store.set("quote", fields(&[("n", json!(1))])).unwrap();
        assert!(store.remove("quote"));
        assert!(!store.remove("quote"));
        assert!(!store.remove("never-existed"));
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_clear() {
        let mut store = FormStore::new();

        store.set("a", fields(&[("n", json!(1))])).unwrap();
        store.set("b", fields(&[("n", json!(2))])).unwrap();
        store.clear();

        assert!(store.is_empty());
    }

    #[test]
    fn test_store_sweep_expired() {
        let mut store = FormStore::new();

        store.set("old", fields(&[("n", json!(1))])).unwrap();
        store.set("fresh", fields(&[("n", json!(2))])).unwrap();
        store.backdate("old", EXPIRATION_MS + 1);

        let removed = store.sweep_expired();
        assert_eq!(removed, 1);
        assert!(!store.contains("old"));
        assert!(store.contains("fresh"));
        assert_eq!(store.stats().expirations, 1);
    }

    #[test]
    fn test_store_submission_gating() {
        let mut store = FormStore::new();

        store
            .set("contact", fields(&[("email", json!("a@b.c"))]))
            .unwrap();
        assert!(store.mark_submitted("contact"));

        // Reads hide the record, the flag reads true, the record remains
        assert!(matches!(
            store.get("contact"),
            Err(FormError::AlreadySubmitted(_))
        ));
        assert!(store.is_submitted("contact"));
        assert!(store.contains("contact"));

        // Explicit clear flips the flag off with the record
        store.remove("contact");
        assert!(!store.is_submitted("contact"));
    }

    #[test]
    fn test_store_mark_submitted_absent_is_noop() {
        let mut store = FormStore::new();

        assert!(!store.mark_submitted("ghost"));
        assert!(!store.contains("ghost"));
    }

    #[test]
    fn test_store_rewrite_resets_submitted() {
        let mut store = FormStore::new();

        store.set("contact", fields(&[("n", json!(1))])).unwrap();
        store.mark_submitted("contact");

        // A fresh write starts a new in-progress session
        store.set("contact", fields(&[("n", json!(2))])).unwrap();
        assert!(!store.is_submitted("contact"));
        assert_eq!(store.get("contact").unwrap()["n"], json!(2));
    }

    #[test]
    fn test_store_submitted_but_expired_still_reads_submitted() {
        let mut store = FormStore::new();

        store.set("contact", fields(&[("n", json!(1))])).unwrap();
        store.mark_submitted("contact");
        store.backdate("contact", EXPIRATION_MS + 1);

        // The documented asymmetry: get() sees nothing, the flag holds
        // until the record is actually swept
        assert!(store.is_submitted("contact"));
        assert!(matches!(store.get("contact"), Err(FormError::Expired(_))));
        assert!(!store.is_submitted("contact"));
    }

    #[test]
    fn test_persist_payload_envelope_shape() {
        let mut store = FormStore::new();
        store.set("quote", fields(&[("n", json!(1))])).unwrap();

        let payload = store.persist_payload(100 * 1024);
        assert!(payload["state"]["forms"]["quote"]["fields"]["n"].is_number());
        assert_eq!(payload["state"]["forms"]["quote"]["submitted"], json!(false));
    }

    #[test]
    fn test_persist_payload_drops_oldest_over_budget() {
        let mut store = FormStore::new();

        for i in 0..5 {
            let id = format!("f{i}");
            store
                .set(&id, fields(&[("pad", json!("x".repeat(100)))]))
                .unwrap();
            store.backdate(&id, (5 - i) * 1000);
        }

        // Budget fits roughly two records
        let one_size = 100 + 60;
        let payload = store.persist_payload(one_size * 2 + one_size / 2);
        let forms = payload["state"]["forms"].as_object().unwrap();

        assert!(forms.len() < 5);
        // Newest-first retention: the most recent record always survives
        assert!(forms.contains_key("f4"));
        assert!(!forms.contains_key("f0"));
        // In-memory store is untouched
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_persist_payload_serialized_size_within_budget() {
        let mut store = FormStore::new();
        for i in 0..5 {
            store
                .set(&format!("f{i}"), fields(&[("pad", json!("x".repeat(100)))]))
                .unwrap();
        }

        for budget in [64usize, 200, 300, 450, 600, 100 * 1024] {
            let payload = store.persist_payload(budget);
            let serialized = serde_json::to_vec(&payload).unwrap();
            assert!(
                serialized.len() <= budget,
                "payload of {} bytes over the {} byte budget",
                serialized.len(),
                budget
            );
        }
    }

    #[test]
    fn test_persist_payload_exact_budget_boundary() {
        let mut store = FormStore::new();
        store
            .set("quote", fields(&[("pad", json!("x".repeat(100)))]))
            .unwrap();

        // Tightest budget that still fits the record
        let exact = serde_json::to_vec(&store.persist_payload(100 * 1024))
            .unwrap()
            .len()
            + 1;
        let kept = store.persist_payload(exact);
        assert!(kept["state"]["forms"]["quote"].is_object());

        // One byte under and the record is dropped, never a budget overrun
        let dropped = store.persist_payload(exact - 2);
        assert!(dropped["state"]["forms"].as_object().unwrap().is_empty());
        assert!(serde_json::to_vec(&dropped).unwrap().len() <= exact - 2);
    }

    #[test]
    fn test_persist_payload_is_deterministic() {
        let mut store = FormStore::new();
        for i in 0..6 {
            store
                .set(&format!("f{i}"), fields(&[("pad", json!("x".repeat(80)))]))
                .unwrap();
            store.backdate(&format!("f{i}"), 1000);
        }

        let a = store.persist_payload(400);
        let b = store.persist_payload(400);
        assert_eq!(a, b);
    }

    #[test]
    fn test_load_roundtrip() {
        let mut store = FormStore::new();
        store.set("quote", fields(&[("name", json!("Alice"))])).unwrap();
        store.mark_submitted("quote");

        let payload = store.persist_payload(100 * 1024);

        let mut restored = FormStore::new();
        let count = restored.load(payload).unwrap();
        assert_eq!(count, 1);
        assert!(restored.is_submitted("quote"));
    }

    #[test]
    fn test_load_rejects_malformed_envelope() {
        let mut store = FormStore::new();

        let result = store.load(json!({ "state": "not-an-object" }));
        assert!(matches!(result, Err(FormError::Serialization(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_stats() {
        let mut store = FormStore::new();

        store.set("a", fields(&[("n", json!(1))])).unwrap();
        store.get("a").unwrap(); // hit
        let _ = store.get("ghost"); // miss

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.writes, 1);
        assert_eq!(stats.total_records, 1);
    }
}
