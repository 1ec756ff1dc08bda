//! Form Cache Facade
//!
//! Public API of the draft cache: the bounded store behind a lock, wired to
//! the debounced persistence writer. Every failure mode here is a soft one:
//! oversized writes, corrupt persisted data, and backend trouble are logged
//! and the operation degrades to cold-cache behavior. No method returns an
//! error.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::FormError;
use crate::forms::debounce::DebouncedWriter;
use crate::forms::persist::StorageBackend;
use crate::forms::store::FormStore;
use crate::forms::{FormStats, STORAGE_KEY};

// == Form Cache ==
/// Shared handle to the draft-form cache.
#[derive(Clone)]
pub struct FormCache {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<RwLock<FormStore>>,
    writer: DebouncedWriter,
}

impl FormCache {
    // == Constructors ==
    /// Creates a FormCache with production limits, restoring any state the
    /// backend holds. Must be called from within a tokio runtime (the
    /// writer task is spawned here).
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self::with_store(backend, FormStore::new(), None)
    }

    /// Creates a FormCache around an explicit store and debounce windows;
    /// tests shrink both.
    pub fn with_store(
        backend: Arc<dyn StorageBackend>,
        mut store: FormStore,
        windows: Option<(Duration, Duration)>,
    ) -> Self {
        if let Some(value) = backend.read(STORAGE_KEY) {
            match store.load(value) {
                Ok(count) => info!("Restored {} draft record(s) from storage", count),
                Err(err) => {
                    // Unusable envelope: start cold rather than propagate
                    warn!("Discarding unreadable draft storage: {}", err);
                    backend.remove(STORAGE_KEY);
                }
            }
        }

        let store = Arc::new(RwLock::new(store));
        let writer = match windows {
            Some((quiet, max_wait)) => {
                DebouncedWriter::spawn_with_windows(store.clone(), backend, quiet, max_wait)
            }
            None => DebouncedWriter::spawn(store.clone(), backend),
        };

        Self {
            inner: Arc::new(Inner { store, writer }),
        }
    }

    // == Set Form Data ==
    /// Merges `fields` into the draft for `form_id` and schedules a
    /// debounced persist.
    ///
    /// An oversized merged record is rejected softly: the store is left
    /// unchanged and a warning logged. An empty `form_id` is ignored.
    pub async fn set_form_data(&self, form_id: &str, fields: Map<String, Value>) {
        if form_id.is_empty() {
            warn!("Ignoring draft write with empty form id");
            return;
        }

        let result = {
            let mut store = self.inner.store.write().await;
            store.set(form_id, fields)
        };

        match result {
            Ok(()) => self.inner.writer.schedule(),
            Err(err) => warn!("Draft write for '{}' rejected: {}", form_id, err),
        }
    }

    // == Get Form Data ==
    /// Returns the draft fields for `form_id`, or None when the draft is
    /// missing, expired (removed eagerly), or already submitted.
    pub async fn get_form_data(&self, form_id: &str) -> Option<Map<String, Value>> {
        let result = {
            let mut store = self.inner.store.write().await;
            store.get(form_id)
        };

        match result {
            Ok(fields) => Some(fields),
            Err(FormError::Expired(_)) => {
                // The read removed the record; persist the shrunken state
                debug!("Draft '{}' expired on read", form_id);
                self.inner.writer.schedule();
                None
            }
            Err(_) => None,
        }
    }

    // == Clear Form Data ==
    /// Removes the draft for `form_id`; no-op when absent.
    pub async fn clear_form_data(&self, form_id: &str) {
        let removed = {
            let mut store = self.inner.store.write().await;
            store.remove(form_id)
        };
        if removed {
            self.inner.writer.schedule();
        }
    }

    // == Clear All Forms ==
    /// Empties the draft store.
    pub async fn clear_all_forms(&self) {
        {
            let mut store = self.inner.store.write().await;
            store.clear();
        }
        self.inner.writer.schedule();
    }

    // == Clear Expired Forms ==
    /// Sweeps every expired draft. Returns the number removed; safe to call
    /// repeatedly.
    pub async fn clear_expired_forms(&self) -> usize {
        let removed = {
            let mut store = self.inner.store.write().await;
            store.sweep_expired()
        };
        if removed > 0 {
            self.inner.writer.schedule();
        }
        removed
    }

    // == Mark Form As Submitted ==
    /// Flags the draft for `form_id` as submitted; no-op when absent.
    pub async fn mark_form_as_submitted(&self, form_id: &str) {
        let marked = {
            let mut store = self.inner.store.write().await;
            store.mark_submitted(form_id)
        };
        if marked {
            self.inner.writer.schedule();
        }
    }

    // == Is Form Submitted ==
    /// True iff a draft exists and was submitted. Expiry is deliberately
    /// not consulted (see `FormStore::is_submitted`).
    pub async fn is_form_submitted(&self, form_id: &str) -> bool {
        let store = self.inner.store.read().await;
        store.is_submitted(form_id)
    }

    // == Stats ==
    /// Returns current draft-store activity counters.
    pub async fn stats(&self) -> FormStats {
        let store = self.inner.store.read().await;
        store.stats()
    }

    // == Shutdown ==
    /// Persists the current state and stops the writer task.
    pub async fn shutdown(&self) {
        self.inner.writer.flush_now().await;
        self.inner.writer.abort();
    }
}
