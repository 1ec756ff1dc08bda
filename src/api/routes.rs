//! API Routes
//!
//! Configures the Axum router with all endpoints and middleware layers.

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    delete_draft, draft_submitted, get_draft, health_handler, list_products, save_draft,
    stats_handler, submit_certificate, submit_contact, submit_quote, AppState,
};
use crate::middleware::{csrf_mw, response_cache_mw, ResponseCache};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT/GET/DELETE /api/forms/:form_id` - save/restore/clear a draft
/// - `GET /api/forms/:form_id/submitted` - submitted-flag probe
/// - `POST /api/quote` - insurance quote request
/// - `POST /api/certificate` - certificate request
/// - `POST /api/contact` - contact message (rate limited)
/// - `GET /api/products` - product catalogue (response cached)
/// - `GET /api/stats` - draft-store statistics
/// - `GET /health` - health check
///
/// # Middleware
/// - Response cache: catalogue GETs only
/// - CSRF double-submit check: all mutating routes
/// - CORS: allows any origin (configurable for production)
/// - Tracing: logs all requests for debugging
pub fn create_router(state: AppState, response_cache: Arc<ResponseCache>) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Catalogue routes sit behind the response cache; draft routes must
    // stay uncached or restores would go stale
    let cached = Router::new()
        .route("/api/products", get(list_products))
        .layer(middleware::from_fn_with_state(
            response_cache,
            response_cache_mw,
        ));

    Router::new()
        .route(
            "/api/forms/:form_id",
            put(save_draft).get(get_draft).delete(delete_draft),
        )
        .route("/api/forms/:form_id/submitted", get(draft_submitted))
        .route("/api/quote", post(submit_quote))
        .route("/api/certificate", post(submit_certificate))
        .route("/api/contact", post(submit_contact))
        .route("/api/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .merge(cached)
        .layer(middleware::from_fn(csrf_mw))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backing::MemoryTtlStore;
    use crate::forms::{FormCache, MemoryBackend};
    use crate::middleware::RateLimiter;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let forms = FormCache::new(Arc::new(MemoryBackend::new()));
        let backing = Arc::new(MemoryTtlStore::new());
        let limiter = Arc::new(RateLimiter::new(backing.clone(), 5, 3600));
        let cache = Arc::new(ResponseCache::new(backing, 3600));
        create_router(AppState::new(forms, limiter), cache)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_save_draft_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/api/forms/quote")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"name":"Alice"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_draft_not_found() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/forms/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_products_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/products")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
