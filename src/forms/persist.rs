//! Persistence Backend Module
//!
//! The storage capability consumed by the draft cache. Every operation is
//! best-effort: failures and corrupt data are logged and degrade to a cold
//! cache, never propagated to callers.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use serde_json::Value;
use tracing::{debug, warn};

// == Storage Backend Trait ==
/// Key-value storage capability for the persisted draft store.
///
/// `read` must tolerate corrupt stored values by discarding them (treated
/// as absent) rather than surfacing a parse error; `write` and `remove`
/// are best-effort.
pub trait StorageBackend: Send + Sync + std::fmt::Debug {
    /// Reads the value stored under `name`, or None if absent or corrupt.
    fn read(&self, name: &str) -> Option<Value>;

    /// Stores `value` under `name`.
    fn write(&self, name: &str, value: &Value);

    /// Removes the value stored under `name`.
    fn remove(&self, name: &str);
}

// == Memory Backend ==
/// In-process backend used by tests and cache-less deployments.
///
/// Counts accepted writes so coalescing behavior is observable.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, Value>>,
    write_count: AtomicUsize,
}

impl MemoryBackend {
    /// Creates an empty MemoryBackend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of writes received so far.
    pub fn write_count(&self) -> usize {
        self.write_count.load(Ordering::SeqCst)
    }

    /// Returns a copy of the value stored under `name`, if any.
    pub fn stored(&self, name: &str) -> Option<Value> {
        self.entries.lock().ok()?.get(name).cloned()
    }
}

impl StorageBackend for MemoryBackend {
    fn read(&self, name: &str) -> Option<Value> {
        self.entries.lock().ok()?.get(name).cloned()
    }

    fn write(&self, name: &str, value: &Value) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(name.to_string(), value.clone());
            self.write_count.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn remove(&self, name: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(name);
        }
    }
}

// == File Backend ==
/// JSON-file backend: each name maps to `<dir>/<name>.json`.
#[derive(Debug)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Creates a FileBackend rooted at `dir`. The directory is created on
    /// the first write, not here.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }
}

impl StorageBackend for FileBackend {
    fn read(&self, name: &str) -> Option<Value> {
        let path = self.path_for(name);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                warn!("Storage read failed for {}: {}", path.display(), err);
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(err) => {
                // Corrupt data is discarded, not surfaced
                warn!(
                    "Discarding corrupt storage file {}: {}",
                    path.display(),
                    err
                );
                self.remove(name);
                None
            }
        }
    }

    fn write(&self, name: &str, value: &Value) {
        if let Err(err) = fs::create_dir_all(&self.dir) {
            warn!("Storage dir {} unavailable: {}", self.dir.display(), err);
            return;
        }

        let path = self.path_for(name);
        match serde_json::to_vec(value) {
            Ok(bytes) => {
                if let Err(err) = fs::write(&path, bytes) {
                    warn!("Storage write failed for {}: {}", path.display(), err);
                } else {
                    debug!("Persisted {} bytes to {}", value.to_string().len(), path.display());
                }
            }
            Err(err) => warn!("Storage serialization failed for '{name}': {err}"),
        }
    }

    fn remove(&self, name: &str) {
        let path = self.path_for(name);
        if let Err(err) = fs::remove_file(&path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!("Storage remove failed for {}: {}", path.display(), err);
            }
        }
    }
}
