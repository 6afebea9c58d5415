//! API route handlers
//!
//! - `health`: liveness check
//! - `categories`: the keyed category tree, optionally locale scoped
//! - `collections`: normalized record listings per content type
//! - `raw`: by-id lookups passed through unmodified

pub mod categories;
pub mod collections;
pub mod health;
pub mod raw;

use crate::error::{ServerError, ServerResult};
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use axum::Json;
use menufeed::Endpoint;
use serde_json::{json, Value};

/// Number of non-fatal normalization issues behind a response body.
pub const ISSUES_HEADER: &str = "x-normalize-issues";

/// API version and base info
///
/// ```json
/// {
///   "name": "Menufeed Server",
///   "version": "0.1.0",
///   "endpoints": ["..."]
/// }
/// ```
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    let mut endpoints: Vec<String> = Endpoint::ALL
        .iter()
        .map(|endpoint| format!("/api/{endpoint}"))
        .collect();
    endpoints.extend(
        [
            "/api/{locale}/categories",
            "/api/{locale}/categories/{lang}",
            "/api/{lang}/products",
            "/api/{lang}/meals",
            "/api/{locale}/languages",
            "/api/product/{id}",
            "/api/product/type/{id}",
            "/api/deal/{id}",
            "/api/promo/{id}",
            "/health",
        ]
        .map(String::from),
    );

    Ok(Json(json!({
        "name": "Menufeed Server",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": endpoints,
    })))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}

/// JSON body tagged with its issue count.
pub(crate) fn with_issue_count(body: Value, issues: usize) -> Response {
    let mut response = Json(body).into_response();
    response
        .headers_mut()
        .insert(ISSUES_HEADER, HeaderValue::from(issues));
    response
}
