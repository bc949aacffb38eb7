//! Inbound request inspection.
//!
//! # Responsibilities
//! - Establish the correlation id (reuse the inbound header or generate)
//! - Derive the client key for rate limiting
//!
//! # Design Decisions
//! - The correlation id is fixed before any pipeline stage runs, so every
//!   log line and the backend see the same value
//! - X-Forwarded-For is trusted as-is by contract; the transport peer
//!   address is only the fallback

use std::net::SocketAddr;

use axum::http::HeaderMap;
use uuid::Uuid;

/// Correlation id header, echoed to clients and overwritten upstream.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Client identity hint set by upstream proxies.
pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Reuse the inbound correlation id if usable, else generate a UUID v4.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Client key for rate limiting: the forwarding header when present,
/// otherwise the transport peer IP.
pub fn client_key(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get(X_FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| peer.ip().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer() -> SocketAddr {
        "10.1.2.3:55000".parse().unwrap()
    }

    #[test]
    fn inbound_request_id_is_reused() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("abc-123"));
        assert_eq!(request_id(&headers), "abc-123");
    }

    #[test]
    fn missing_request_id_is_generated() {
        let id = request_id(&HeaderMap::new());
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn forwarded_header_wins_over_peer() {
        let mut headers = HeaderMap::new();
        headers.insert(X_FORWARDED_FOR, HeaderValue::from_static("203.0.113.9"));
        assert_eq!(client_key(&headers, peer()), "203.0.113.9");
        assert_eq!(client_key(&HeaderMap::new(), peer()), "10.1.2.3");
    }
}
