//! Request DTOs for the submission API
//!
//! Defines the structure of incoming HTTP request bodies. Draft saves take
//! a raw field map and have no DTO here.

use serde::Deserialize;

/// Minimal shape check shared by the submission DTOs.
fn valid_email(email: &str) -> bool {
    let trimmed = email.trim();
    trimmed.contains('@') && trimmed.contains('.') && trimmed.len() >= 6
}

/// Request body for POST /api/quote
///
/// # Fields
/// - `first_name` / `last_name`: requester identity
/// - `email`: contact address for the quote
/// - `insurance_type`: requested line of coverage
/// - `phone`, `message`: optional details
/// - `form_id`: optional draft id to mark submitted on success
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub insurance_type: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub form_id: Option<String>,
}

impl QuoteRequest {
    /// Validates the request data.
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            return Some("Name cannot be empty".to_string());
        }
        if !valid_email(&self.email) {
            return Some("A valid email address is required".to_string());
        }
        if self.insurance_type.trim().is_empty() {
            return Some("Insurance type cannot be empty".to_string());
        }
        None
    }
}

/// Request body for POST /api/certificate
#[derive(Debug, Clone, Deserialize)]
pub struct CertificateRequest {
    pub company: String,
    pub email: String,
    pub policy_number: String,
    #[serde(default)]
    pub holder_name: Option<String>,
    #[serde(default)]
    pub form_id: Option<String>,
}

impl CertificateRequest {
    /// Validates the request data.
    pub fn validate(&self) -> Option<String> {
        if self.company.trim().is_empty() {
            return Some("Company cannot be empty".to_string());
        }
        if !valid_email(&self.email) {
            return Some("A valid email address is required".to_string());
        }
        if self.policy_number.trim().is_empty() {
            return Some("Policy number cannot be empty".to_string());
        }
        None
    }
}

/// Request body for POST /api/contact
#[derive(Debug, Clone, Deserialize)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub form_id: Option<String>,
}

impl ContactRequest {
    /// Validates the request data.
    pub fn validate(&self) -> Option<String> {
        if self.name.trim().is_empty() {
            return Some("Name cannot be empty".to_string());
        }
        if !valid_email(&self.email) {
            return Some("A valid email address is required".to_string());
        }
        if self.message.trim().is_empty() {
            return Some("Message cannot be empty".to_string());
        }
        None
    }
}
