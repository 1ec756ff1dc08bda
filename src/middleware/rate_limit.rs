//! Fixed-Window Rate Limiter
//!
//! Bounds contact-form submission volume per sender email and per client
//! IP. Both counters are bumped on every attempt, accepted or not, so the
//! window measures actual pressure. A backing-store failure fails open:
//! losing abuse protection beats refusing legitimate submissions while the
//! cache dependency is down.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::backing::TtlStore;
use crate::error::{ApiError, ApiResult, BackingResult};

// == Rate Limiter ==
pub struct RateLimiter {
    store: Arc<dyn TtlStore>,
    max_per_window: u64,
    window_seconds: u64,
}

impl RateLimiter {
    // == Constructor ==
    /// Creates a limiter allowing `max_per_window` hits per counter per
    /// `window_seconds`.
    pub fn new(store: Arc<dyn TtlStore>, max_per_window: u64, window_seconds: u64) -> Self {
        Self {
            store,
            max_per_window,
            window_seconds,
        }
    }

    // == Check Contact ==
    /// Registers a contact submission attempt and decides whether it may
    /// proceed.
    ///
    /// The email and IP counters are independent, so they are bumped
    /// concurrently; each counter's expire depends only on its own result.
    pub async fn check_contact(&self, email: &str, ip: &str) -> ApiResult<()> {
        let email_key = format!(
            "api:ratelimit:contact:email:{}",
            email.trim().to_lowercase()
        );
        let ip_key = format!("api:ratelimit:contact:ip:{ip}");

        let (email_count, ip_count) = tokio::join!(self.bump(&email_key), self.bump(&ip_key));

        let mut exceeded = false;
        for (key, result) in [(&email_key, &email_count), (&ip_key, &ip_count)] {
            match result {
                Ok(count) if *count > self.max_per_window as i64 => {
                    debug!("Rate limit exceeded on '{}': {}", key, count);
                    exceeded = true;
                }
                Ok(_) => {}
                Err(err) => {
                    // Fail open: the counting backend being down must not
                    // block submissions
                    warn!(
                        "Rate limit backing store failed on '{}', allowing request: {}",
                        key, err
                    );
                }
            }
        }

        if exceeded {
            return Err(ApiError::RateLimited(
                "Too many submissions, please try again later".to_string(),
            ));
        }
        Ok(())
    }

    /// Increments one counter; the first hit of a new window gets the
    /// window-length expiry attached.
    async fn bump(&self, key: &str) -> BackingResult<i64> {
        let count = self.store.incr(key).await?;
        if count == 1 {
            self.store.expire(key, self.window_seconds).await?;
        }
        Ok(count)
    }
}
