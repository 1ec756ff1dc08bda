//! API Handlers
//!
//! HTTP request handlers for the draft, submission, catalogue, and health
//! endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use serde_json::{Map, Value};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::forms::{FormCache, FormStats};
use crate::middleware::RateLimiter;
use crate::models::{
    CertificateRequest, ContactRequest, DraftResponse, DraftSavedResponse, HealthResponse,
    Product, QuoteRequest, SubmissionReceipt, SubmittedResponse, SuccessResponse,
};

// == App State ==
/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Draft-form cache
    pub forms: FormCache,
    /// Contact-submission rate limiter
    pub limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Creates a new AppState.
    pub fn new(forms: FormCache, limiter: Arc<RateLimiter>) -> Self {
        Self { forms, limiter }
    }
}

// == Draft Handlers ==

/// Handler for PUT /api/forms/:form_id
///
/// Saves draft fields. Oversized drafts are dropped silently on the server
/// side too: losing draft persistence is an acceptable degradation and not
/// worth alarming the user over.
pub async fn save_draft(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
    Json(fields): Json<Map<String, Value>>,
) -> Json<SuccessResponse<DraftSavedResponse>> {
    state.forms.set_form_data(&form_id, fields).await;
    Json(SuccessResponse::new(DraftSavedResponse { form_id }))
}

/// Handler for GET /api/forms/:form_id
///
/// Restores a draft. Missing, expired, and submitted drafts all read as
/// not found.
pub async fn get_draft(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
) -> ApiResult<Json<SuccessResponse<DraftResponse>>> {
    match state.forms.get_form_data(&form_id).await {
        Some(fields) => Ok(Json(SuccessResponse::new(DraftResponse { form_id, fields }))),
        None => Err(ApiError::NotFound(format!("No draft for '{form_id}'"))),
    }
}

/// Handler for DELETE /api/forms/:form_id
pub async fn delete_draft(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
) -> Json<SuccessResponse<DraftSavedResponse>> {
    state.forms.clear_form_data(&form_id).await;
    Json(SuccessResponse::new(DraftSavedResponse { form_id }))
}

/// Handler for GET /api/forms/:form_id/submitted
pub async fn draft_submitted(
    State(state): State<AppState>,
    Path(form_id): Path<String>,
) -> Json<SuccessResponse<SubmittedResponse>> {
    let submitted = state.forms.is_form_submitted(&form_id).await;
    Json(SuccessResponse::new(SubmittedResponse { form_id, submitted }))
}

// == Submission Handlers ==

/// Handler for POST /api/quote
pub async fn submit_quote(
    State(state): State<AppState>,
    Json(req): Json<QuoteRequest>,
) -> ApiResult<Json<SuccessResponse<SubmissionReceipt>>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::Validation(error_msg));
    }

    info!("Quote request received for '{}'", req.insurance_type);
    finish_submission(&state, req.form_id.as_deref()).await;
    Ok(Json(SuccessResponse::new(SubmissionReceipt::new("QUOTE"))))
}

/// Handler for POST /api/certificate
pub async fn submit_certificate(
    State(state): State<AppState>,
    Json(req): Json<CertificateRequest>,
) -> ApiResult<Json<SuccessResponse<SubmissionReceipt>>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::Validation(error_msg));
    }

    info!("Certificate request received for policy '{}'", req.policy_number);
    finish_submission(&state, req.form_id.as_deref()).await;
    Ok(Json(SuccessResponse::new(SubmissionReceipt::new("CERT"))))
}

/// Handler for POST /api/contact
///
/// The only rate-limited endpoint: contact is the cheapest form to abuse.
pub async fn submit_contact(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<ContactRequest>,
) -> ApiResult<Json<SuccessResponse<SubmissionReceipt>>> {
    if let Some(error_msg) = req.validate() {
        return Err(ApiError::Validation(error_msg));
    }

    let ip = client_ip(&headers);
    state.limiter.check_contact(&req.email, &ip).await?;

    info!("Contact message received from '{}'", req.email);
    finish_submission(&state, req.form_id.as_deref()).await;
    Ok(Json(SuccessResponse::new(SubmissionReceipt::new("CONTACT"))))
}

/// Marks the originating draft submitted so it is not re-surfaced.
async fn finish_submission(state: &AppState, form_id: Option<&str>) {
    if let Some(form_id) = form_id {
        state.forms.mark_form_as_submitted(form_id).await;
    }
}

/// First X-Forwarded-For entry, or "unknown" when the header is absent.
fn client_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

// == Catalogue Handler ==

/// Handler for GET /api/products
///
/// Static catalogue content; this route sits behind the response cache.
pub async fn list_products() -> Json<SuccessResponse<Vec<Product>>> {
    let products = vec![
        Product {
            id: "auto".to_string(),
            name: "Auto Insurance".to_string(),
            description: "Liability, collision and comprehensive coverage".to_string(),
        },
        Product {
            id: "home".to_string(),
            name: "Homeowners Insurance".to_string(),
            description: "Dwelling, personal property and liability protection".to_string(),
        },
        Product {
            id: "business".to_string(),
            name: "Business Insurance".to_string(),
            description: "General liability, property and workers compensation".to_string(),
        },
        Product {
            id: "life".to_string(),
            name: "Life Insurance".to_string(),
            description: "Term and whole life policies".to_string(),
        },
    ];
    Json(SuccessResponse::new(products))
}

// == Operational Handlers ==

/// Handler for GET /api/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<SuccessResponse<FormStats>> {
    Json(SuccessResponse::new(state.forms.stats().await))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::backing::MemoryTtlStore;
    use crate::forms::MemoryBackend;
    use serde_json::json;

    fn test_state() -> AppState {
        let forms = FormCache::new(Arc::new(MemoryBackend::new()));
        let limiter = Arc::new(RateLimiter::new(Arc::new(MemoryTtlStore::new()), 5, 3600));
        AppState::new(forms, limiter)
    }

    fn fields(pairs: &[(&str, Value)]) -> Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_save_and_get_draft() {
        let state = test_state();

        save_draft(
            State(state.clone()),
            Path("quote".to_string()),
            Json(fields(&[("name", json!("Alice"))])),
        )
        .await;

        let result = get_draft(State(state.clone()), Path("quote".to_string())).await;
        let response = result.unwrap();
        assert_eq!(response.data.fields["name"], json!("Alice"));
        state.forms.shutdown().await;
    }

    #[tokio::test]
    async fn test_get_draft_not_found() {
        let state = test_state();

        let result = get_draft(State(state.clone()), Path("ghost".to_string())).await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
        state.forms.shutdown().await;
    }

    #[tokio::test]
    async fn test_submission_marks_draft() {
        let state = test_state();

        save_draft(
            State(state.clone()),
            Path("contact-form".to_string()),
            Json(fields(&[("email", json!("bob@example.com"))])),
        )
        .await;

        let req = ContactRequest {
            name: "Bob".into(),
            email: "bob@example.com".into(),
            message: "Hello".into(),
            phone: None,
            form_id: Some("contact-form".into()),
        };
        let result = submit_contact(State(state.clone()), HeaderMap::new(), Json(req)).await;
        assert!(result.is_ok());

        // The draft is now gated behind the submitted flag
        let probe = draft_submitted(State(state.clone()), Path("contact-form".to_string())).await;
        assert!(probe.data.submitted);
        let draft = get_draft(State(state.clone()), Path("contact-form".to_string())).await;
        assert!(draft.is_err());
        state.forms.shutdown().await;
    }

    #[tokio::test]
    async fn test_submit_quote_validation_error() {
        let state = test_state();

        let req = QuoteRequest {
            first_name: "".into(),
            last_name: "Martin".into(),
            email: "alice@example.com".into(),
            insurance_type: "auto".into(),
            phone: None,
            message: None,
            form_id: None,
        };
        let result = submit_quote(State(state.clone()), Json(req)).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
        state.forms.shutdown().await;
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }

    #[tokio::test]
    async fn test_stats_handler_counts_writes() {
        let state = test_state();

        save_draft(
            State(state.clone()),
            Path("quote".to_string()),
            Json(fields(&[("n", json!(1))])),
        )
        .await;

        let response = stats_handler(State(state.clone())).await;
        assert_eq!(response.data.writes, 1);
        assert_eq!(response.data.total_records, 1);
        state.forms.shutdown().await;
    }

    #[test]
    fn test_client_ip_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(client_ip(&headers), "unknown");

        headers.insert("x-forwarded-for", "203.0.113.9, 10.0.0.1".parse().unwrap());
        assert_eq!(client_ip(&headers), "203.0.113.9");
    }
}
