//! Streaming request forwarding.
//!
//! # Responsibilities
//! - Build the outbound request: original method and headers, target
//!   authority, remainder path, correlation id overwritten
//! - Stream bodies both directions without buffering
//! - Classify outcomes: the backend answering at all is Success, whatever
//!   its status; only transport failures before response headers count as
//!   Failure
//!
//! # Design Decisions
//! - A 4xx/5xx from the backend passes through untouched; reinterpreting
//!   backend statuses is the one thing a gateway must never do
//! - The response-header timeout lives here, not in an outer layer, so a
//!   timeout is visible to the circuit breaker and long-lived body streams
//!   are never killed mid-transfer
//! - Dropping the returned response aborts the upstream connection, so a
//!   client disconnect releases the backend promptly

use std::time::Duration;

use axum::body::Body;
use axum::http::{header::HeaderValue, Request, Response, Uri};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;

use crate::config::UpstreamConfig;
use crate::http::request::X_REQUEST_ID;
use crate::routing::ResolvedRoute;

/// Terminal failures of the forwarding stage. Each one synthesizes a 502
/// and feeds the circuit breaker; the detail never reaches the client.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),

    #[error("no response headers within {0:?}")]
    HeaderTimeout(Duration),

    #[error("failed to build upstream request: {0}")]
    BadRequest(#[from] axum::http::Error),
}

/// Streams requests to resolved targets and responses back.
pub struct ProxyForwarder {
    client: Client<HttpConnector, Body>,
    response_header_timeout: Duration,
}

impl ProxyForwarder {
    /// Create a forwarder with the configured connect and header timeouts.
    pub fn new(config: &UpstreamConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.connect_timeout_secs)));

        let client = Client::builder(TokioExecutor::new()).build(connector);

        Self {
            client,
            response_header_timeout: Duration::from_secs(config.response_header_timeout_secs),
        }
    }

    /// Forward the request to the resolved target, streaming both bodies.
    ///
    /// On success the returned response carries the backend's status and
    /// headers verbatim and its body still streaming.
    pub async fn forward(
        &self,
        route: &ResolvedRoute<'_>,
        parts: axum::http::request::Parts,
        body: Body,
        request_id: &str,
    ) -> Result<Response<Body>, ForwardError> {
        let uri = upstream_uri(route)?;

        let mut builder = Request::builder()
            .method(parts.method.clone())
            .uri(uri)
            .version(parts.version);

        if let Some(headers) = builder.headers_mut() {
            for (name, value) in parts.headers.iter() {
                headers.insert(name.clone(), value.clone());
            }
            // Overwrite any inbound value.
            if let Ok(value) = HeaderValue::from_str(request_id) {
                headers.insert(X_REQUEST_ID, value);
            }
        }

        let outbound = builder.body(body)?;

        let response_future = self.client.request(outbound);
        match tokio::time::timeout(self.response_header_timeout, response_future).await {
            Ok(Ok(response)) => {
                let (parts, body) = response.into_parts();
                Ok(Response::from_parts(parts, Body::new(body)))
            }
            Ok(Err(e)) => Err(ForwardError::Upstream(e)),
            Err(_) => Err(ForwardError::HeaderTimeout(self.response_header_timeout)),
        }
    }
}

/// Build the outbound URI: target scheme and authority, remainder path.
fn upstream_uri(route: &ResolvedRoute<'_>) -> Result<Uri, axum::http::Error> {
    let host = route.target.host_str().unwrap_or("localhost");
    let authority = match route.target.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    };

    Uri::builder()
        .scheme(route.target.scheme())
        .authority(authority)
        .path_and_query(route.remainder.as_str())
        .build()
}
