//! CSRF Double-Submit Check
//!
//! Mutating requests carrying an `XSRF-TOKEN` cookie must echo its value in
//! the `X-XSRF-TOKEN` header. Requests without the cookie pass through; the
//! check only binds once the browser holds a token.

use axum::{
    extract::Request,
    http::{header, HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;

/// Cookie name issued by the site frontend.
pub const XSRF_COOKIE: &str = "XSRF-TOKEN";

/// Header the client must mirror the cookie into.
pub const XSRF_HEADER: &str = "x-xsrf-token";

// == Middleware ==
pub async fn csrf_mw(req: Request, next: Next) -> Response {
    if matches!(*req.method(), Method::GET | Method::HEAD | Method::OPTIONS) {
        return next.run(req).await;
    }

    if let Some(cookie_token) = cookie_value(req.headers(), XSRF_COOKIE) {
        let header_token = req
            .headers()
            .get(XSRF_HEADER)
            .and_then(|value| value.to_str().ok());

        if header_token != Some(cookie_token.as_str()) {
            return ApiError::Forbidden("CSRF token mismatch".to_string()).into_response();
        }
    }

    next.run(req).await
}

/// Extracts a cookie's value from the Cookie header.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(header::COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then(|| value.to_string())
        })
}
