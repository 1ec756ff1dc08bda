//! API Module
//!
//! HTTP handlers and routing for the form cache service REST API.
//!
//! # Endpoints
//! - `PUT/GET/DELETE /api/forms/:form_id` - draft save/restore/clear
//! - `GET /api/forms/:form_id/submitted` - submitted-flag probe
//! - `POST /api/quote` / `/api/certificate` / `/api/contact` - submissions
//! - `GET /api/products` - cached catalogue
//! - `GET /api/stats` - draft-store statistics
//! - `GET /health` - health check

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
