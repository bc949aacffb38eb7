//! Response construction.
//!
//! # Responsibilities
//! - Build the gateway's own JSON error responses
//! - Apply response headers as discrete named steps, so what a response
//!   carries is decided by the pipeline, not by execution order
//!
//! # Design Decisions
//! - Gateway-origin bodies are `{"error": ...}` with an optional `message`;
//!   internal error detail never appears in them
//! - Rate-limit headers are attached on every outcome of a rate-limited
//!   route, 429s included, and never on exempt routes

use axum::body::Body;
use axum::http::{header, HeaderValue, Response, StatusCode};
use axum::response::IntoResponse;
use serde_json::json;

use crate::http::request::X_REQUEST_ID;
use crate::security::RateDecision;

pub const X_RATELIMIT_LIMIT: &str = "x-ratelimit-limit";
pub const X_RATELIMIT_REMAINING: &str = "x-ratelimit-remaining";
pub const X_RATELIMIT_RESET: &str = "x-ratelimit-reset";

/// Build a gateway-origin JSON error response.
pub fn gateway_error(status: StatusCode, error: &str, message: Option<&str>) -> Response<Body> {
    let body = match message {
        Some(message) => json!({ "error": error, "message": message }),
        None => json!({ "error": error }),
    };

    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        body.to_string(),
    )
        .into_response()
}

/// Echo the correlation id on the response.
pub fn apply_request_id(response: &mut Response<Body>, request_id: &str) {
    if let Ok(value) = HeaderValue::from_str(request_id) {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }
}

/// Attach the rate-limit header trio for rate-limited routes.
pub fn apply_rate_limit_headers(response: &mut Response<Body>, decision: &RateDecision) {
    let (limit, remaining, reset_at) = match *decision {
        RateDecision::Exempt => return,
        RateDecision::Allowed {
            limit,
            remaining,
            reset_at,
        } => (limit, remaining, reset_at),
        RateDecision::Denied { limit, reset_at } => (limit, 0, reset_at),
    };

    let headers = response.headers_mut();
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(remaining));
    headers.insert(X_RATELIMIT_RESET, HeaderValue::from(reset_at));
}
