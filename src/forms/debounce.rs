//! Debounced Persistence Writer
//!
//! Coalesces draft mutations into storage writes: a trailing-edge debounce
//! with a quiet window, plus a hard deadline from the first pending call so
//! continuous typing cannot postpone persistence forever. A flush reads the
//! store state current at flush time, so the persisted snapshot always
//! reflects the latest mutations.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::{Notify, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::debug;

use crate::forms::persist::StorageBackend;
use crate::forms::store::FormStore;
use crate::forms::{DEBOUNCE_MAX_WAIT_MS, DEBOUNCE_QUIET_MS, MAX_STORE_BYTES, STORAGE_KEY};

// == Deadlines ==
/// Pending-flush state shared between callers and the writer task.
#[derive(Debug, Default)]
struct Deadlines {
    /// Trailing-edge deadline, pushed forward by every schedule call
    quiet: Option<Instant>,
    /// Hard deadline fixed at the first schedule call of a burst
    hard: Option<Instant>,
}

impl Deadlines {
    /// Earliest of the two deadlines, if a flush is pending at all.
    fn next(&self) -> Option<Instant> {
        match (self.quiet, self.hard) {
            (Some(q), Some(h)) => Some(q.min(h)),
            (q, h) => q.or(h),
        }
    }
}

// == Debounced Writer ==
/// Background writer persisting the draft store on a debounced schedule.
pub struct DebouncedWriter {
    store: Arc<RwLock<FormStore>>,
    backend: Arc<dyn StorageBackend>,
    deadlines: Arc<Mutex<Deadlines>>,
    notify: Arc<Notify>,
    quiet: Duration,
    max_wait: Duration,
    handle: JoinHandle<()>,
}

impl DebouncedWriter {
    // == Spawn ==
    /// Spawns the writer task with the production debounce windows.
    pub fn spawn(store: Arc<RwLock<FormStore>>, backend: Arc<dyn StorageBackend>) -> Self {
        Self::spawn_with_windows(
            store,
            backend,
            Duration::from_millis(DEBOUNCE_QUIET_MS),
            Duration::from_millis(DEBOUNCE_MAX_WAIT_MS),
        )
    }

    /// Spawns the writer task with explicit windows (tests shrink these).
    pub fn spawn_with_windows(
        store: Arc<RwLock<FormStore>>,
        backend: Arc<dyn StorageBackend>,
        quiet: Duration,
        max_wait: Duration,
    ) -> Self {
        let deadlines = Arc::new(Mutex::new(Deadlines::default()));
        let notify = Arc::new(Notify::new());

        let handle = tokio::spawn(run_writer(
            store.clone(),
            backend.clone(),
            deadlines.clone(),
            notify.clone(),
        ));

        Self {
            store,
            backend,
            deadlines,
            notify,
            quiet,
            max_wait,
            handle,
        }
    }

    // == Schedule ==
    /// Registers a pending flush.
    ///
    /// Resets the quiet deadline; the hard deadline is set only by the
    /// first call of a burst and holds until the flush fires.
    pub fn schedule(&self) {
        let now = Instant::now();
        if let Ok(mut deadlines) = self.deadlines.lock() {
            deadlines.quiet = Some(now + self.quiet);
            if deadlines.hard.is_none() {
                deadlines.hard = Some(now + self.max_wait);
            }
        }
        self.notify.notify_one();
    }

    // == Flush Now ==
    /// Persists immediately, cancelling any pending deadline. Used on
    /// shutdown so the last burst is not lost.
    pub async fn flush_now(&self) {
        if let Ok(mut deadlines) = self.deadlines.lock() {
            *deadlines = Deadlines::default();
        }
        flush(&self.store, &self.backend).await;
    }

    // == Abort ==
    /// Stops the writer task. Pending deadlines are dropped; call
    /// `flush_now` first when the last state matters.
    pub fn abort(&self) {
        self.handle.abort();
    }
}

// == Writer Task ==
/// Waits for the earliest pending deadline, flushes, repeats. A schedule
/// call while sleeping wakes the task to recompute its deadline.
async fn run_writer(
    store: Arc<RwLock<FormStore>>,
    backend: Arc<dyn StorageBackend>,
    deadlines: Arc<Mutex<Deadlines>>,
    notify: Arc<Notify>,
) {
    loop {
        let next = deadlines.lock().ok().and_then(|d| d.next());

        match next {
            None => notify.notified().await,
            Some(at) => {
                tokio::select! {
                    _ = sleep_until(at) => {
                        if let Ok(mut d) = deadlines.lock() {
                            *d = Deadlines::default();
                        }
                        flush(&store, &backend).await;
                    }
                    _ = notify.notified() => {
                        // Deadlines moved; loop and recompute
                    }
                }
            }
        }
    }
}

/// Serializes the current store state (aggregate budget applied) and hands
/// it to the backend.
async fn flush(store: &Arc<RwLock<FormStore>>, backend: &Arc<dyn StorageBackend>) {
    let payload = {
        let guard = store.read().await;
        guard.persist_payload(MAX_STORE_BYTES)
    };
    backend.write(STORAGE_KEY, &payload);
    debug!("Draft store flushed to '{}'", STORAGE_KEY);
}
