//! Response DTOs for the API
//!
//! Every success body is wrapped in the uniform envelope
//! `{ "status": "success", "data": ... }`; errors carry
//! `{ "status": "error", "error": { message, code } }` (built in error.rs).

use serde::Serialize;
use serde_json::{Map, Value};

// == Success Envelope ==
#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    /// Always `"success"`
    pub status: String,
    /// Operation-specific payload
    pub data: T,
}

impl<T: Serialize> SuccessResponse<T> {
    /// Wraps a payload in the success envelope.
    pub fn new(data: T) -> Self {
        Self {
            status: "success".to_string(),
            data,
        }
    }
}

// == Draft Payloads ==
/// Payload for draft reads (GET /api/forms/:form_id)
#[derive(Debug, Clone, Serialize)]
pub struct DraftResponse {
    pub form_id: String,
    pub fields: Map<String, Value>,
}

/// Payload for draft writes and clears
#[derive(Debug, Clone, Serialize)]
pub struct DraftSavedResponse {
    pub form_id: String,
}

/// Payload for the submitted-flag probe
#[derive(Debug, Clone, Serialize)]
pub struct SubmittedResponse {
    pub form_id: String,
    pub submitted: bool,
}

// == Submission Payload ==
/// Receipt returned by the quote/certificate/contact endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReceipt {
    /// Opaque reference the requester can quote back
    pub reference: String,
    /// RFC 3339 receipt time
    pub received_at: String,
}

impl SubmissionReceipt {
    /// Creates a receipt stamped now, referenced under the given prefix.
    pub fn new(prefix: &str) -> Self {
        let now = chrono::Utc::now();
        Self {
            reference: format!("{}-{}", prefix, now.timestamp_millis()),
            received_at: now.to_rfc3339(),
        }
    }
}

// == Product Payload ==
/// One entry of the product catalogue (GET /api/products).
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
}

// == Health Payload ==
/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp.
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
