//! Expired-Form Sweep Task
//!
//! Background maintenance for the draft store: one sweep shortly after
//! startup, then a periodic sweep, bounding storage growth from abandoned
//! sessions even when nothing reads the affected drafts. The task is an
//! explicit lifecycle object; nothing starts at module load, and `stop`
//! must be called on shutdown or hot-reload so intervals do not leak.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::forms::FormCache;

// == Sweep Task ==
pub struct SweepTask {
    handle: JoinHandle<()>,
}

impl SweepTask {
    // == Start ==
    /// Spawns the sweep loop: one pass after `initial_delay`, then one
    /// every `interval`.
    pub fn start(cache: FormCache, initial_delay: Duration, interval: Duration) -> Self {
        let handle = tokio::spawn(async move {
            info!(
                "Starting draft sweep task: first pass in {:?}, then every {:?}",
                initial_delay, interval
            );

            tokio::time::sleep(initial_delay).await;
            log_sweep(cache.clear_expired_forms().await);

            loop {
                tokio::time::sleep(interval).await;
                log_sweep(cache.clear_expired_forms().await);
            }
        });

        Self { handle }
    }

    // == Stop ==
    /// Aborts the sweep loop.
    pub fn stop(self) {
        self.handle.abort();
    }
}

fn log_sweep(removed: usize) {
    if removed > 0 {
        info!("Draft sweep removed {} expired record(s)", removed);
    } else {
        debug!("Draft sweep found no expired records");
    }
}
