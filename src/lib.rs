//! Formcache - bounded draft-form cache service
//!
//! Lets form UIs save and restore in-progress state with TTL expiry, size
//! capping, and submitted-state gating, and carries the site's submission
//! API with response-caching and rate-limiting middleware.

pub mod api;
pub mod backing;
pub mod config;
pub mod error;
pub mod forms;
pub mod middleware;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use forms::FormCache;
pub use tasks::SweepTask;
