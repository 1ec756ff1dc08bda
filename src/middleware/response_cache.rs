//! GET-Response Cache Middleware
//!
//! Caches JSON bodies of idempotent GET endpoints in the backing store.
//! A backing-store failure is never allowed to fail the request: reads
//! degrade to a miss, writes are skipped. The cache write itself is
//! fire-and-forget so the client never waits on it.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, Method, StatusCode, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::backing::TtlStore;

/// Cache key builder; receives the request URI.
pub type KeyFn = dyn Fn(&Uri) -> String + Send + Sync;

// == Response Cache ==
/// Configuration and backing handle for the GET-response cache.
pub struct ResponseCache {
    store: Arc<dyn TtlStore>,
    ttl_seconds: u64,
    key_fn: Arc<KeyFn>,
}

impl ResponseCache {
    // == Constructor ==
    /// Creates a cache with the default path+query key.
    pub fn new(store: Arc<dyn TtlStore>, ttl_seconds: u64) -> Self {
        Self {
            store,
            ttl_seconds,
            key_fn: Arc::new(default_key),
        }
    }

    /// Replaces the key function.
    pub fn with_key_fn<F>(mut self, key_fn: F) -> Self
    where
        F: Fn(&Uri) -> String + Send + Sync + 'static,
    {
        self.key_fn = Arc::new(key_fn);
        self
    }

    /// Builds the cache key for a request URI.
    pub fn key_for(&self, uri: &Uri) -> String {
        (self.key_fn)(uri)
    }

    // == Invalidate ==
    /// Deletes every cached response whose key matches `pattern`.
    /// Returns the number removed; backing errors degrade to zero.
    pub async fn invalidate(&self, pattern: &str) -> u64 {
        let keys = match self.store.keys(pattern).await {
            Ok(keys) => keys,
            Err(err) => {
                warn!("Cache invalidation listing failed for '{}': {}", pattern, err);
                return 0;
            }
        };
        match self.store.del(&keys).await {
            Ok(removed) => removed,
            Err(err) => {
                warn!("Cache invalidation delete failed for '{}': {}", pattern, err);
                0
            }
        }
    }
}

/// Default key: request path plus query under the `api:cache:` namespace.
pub fn default_key(uri: &Uri) -> String {
    match uri.path_and_query() {
        Some(pq) => format!("api:cache:{pq}"),
        None => format!("api:cache:{}", uri.path()),
    }
}

// == Middleware ==
/// Axum middleware wrapping a handler in the response cache.
///
/// Non-GET requests pass straight through. Only 200 JSON responses are
/// stored.
pub async fn response_cache_mw(
    State(cache): State<Arc<ResponseCache>>,
    req: Request,
    next: Next,
) -> Response {
    if req.method() != Method::GET {
        return next.run(req).await;
    }

    let key = cache.key_for(req.uri());
    match cache.store.get(&key).await {
        Ok(Some(body)) => {
            debug!("Response cache hit for '{}'", key);
            return match Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, "application/json")
                .header("x-cache", "HIT")
                .body(Body::from(body))
            {
                Ok(response) => response,
                Err(_) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
            };
        }
        Ok(None) => {}
        Err(err) => {
            // Treated as a miss; the handler still runs
            warn!("Response cache read failed for '{}': {}", key, err);
        }
    }

    let response = next.run(req).await;
    if response.status() != StatusCode::OK || !is_json(&response) {
        return response;
    }

    let (parts, body) = response.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            warn!("Response body could not be buffered for '{}': {}", key, err);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if let Ok(text) = String::from_utf8(bytes.to_vec()) {
        let store = cache.store.clone();
        let ttl = cache.ttl_seconds;
        let write_key = key.clone();
        // The client response is sent without waiting on this write
        tokio::spawn(async move {
            if let Err(err) = store.set(&write_key, text, ttl).await {
                warn!("Response cache write failed for '{}': {}", write_key, err);
            }
        });
    }

    Response::from_parts(parts, Body::from(bytes))
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("application/json"))
        .unwrap_or(false)
}
