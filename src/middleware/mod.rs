//! Middleware Module
//!
//! Request-path cross-cutting concerns backed by the counter/TTL store:
//! GET-response caching, fixed-window rate limiting, CSRF checking.

mod csrf;
mod rate_limit;
mod response_cache;

pub use csrf::{csrf_mw, XSRF_COOKIE, XSRF_HEADER};
pub use rate_limit::RateLimiter;
pub use response_cache::{default_key, response_cache_mw, ResponseCache};
