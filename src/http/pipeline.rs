//! The request-processing pipeline.
//!
//! Fixed stage order per inbound request, short-circuiting at the first
//! failing stage:
//!
//! ```text
//! normalize path
//!     → route resolve      (404 on miss)
//!     → authenticate       (401 on reject)
//!     → rate-limit check   (429 on reject)
//!     → breaker admit      (503 on reject)
//!     → forward            (502 on transport failure)
//!     → breaker record
//! ```
//!
//! The correlation id is established before any stage runs; it is echoed on
//! the response, propagated to the backend, and carried by the access log.
//! Exactly one access-log record is emitted per request, terminal errors
//! included.

use std::net::SocketAddr;
use std::time::Instant;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{header, Request, Response, StatusCode};

use crate::http::request;
use crate::http::response::{apply_rate_limit_headers, apply_request_id, gateway_error};
use crate::http::server::GatewayState;
use crate::observability::access_log::{self, AccessLogRecord, ANONYMOUS};
use crate::observability::metrics;
use crate::security::RateDecision;

/// Pipeline result: the response plus what the access log needs to know.
struct PipelineOutcome {
    response: Response<Body>,
    rate: RateDecision,
    subject: Option<String>,
    target: Option<String>,
}

impl PipelineOutcome {
    fn terminal(response: Response<Body>) -> Self {
        Self {
            response,
            rate: RateDecision::Exempt,
            subject: None,
            target: None,
        }
    }
}

/// Main gateway handler: every inbound request flows through here.
pub async fn gateway_handler(
    State(state): State<GatewayState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    req: Request<Body>,
) -> Response<Body> {
    let start_time = Instant::now();

    let request_id = request::request_id(req.headers());
    let client_key = request::client_key(req.headers(), peer);
    let method = req.method().to_string();
    let path = crate::routing::normalize_path(
        req.uri()
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or_else(|| req.uri().path()),
    );

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %path,
        client = %client_key,
        "Received request"
    );

    let mut outcome = run_stages(&state, &request_id, &client_key, &path, req).await;

    // Named header steps: correlation id on every response, the rate-limit
    // trio whenever the route was rate limited.
    apply_request_id(&mut outcome.response, &request_id);
    apply_rate_limit_headers(&mut outcome.response, &outcome.rate);

    let status = outcome.response.status();
    metrics::record_request(
        &method,
        status.as_u16(),
        outcome.target.as_deref().unwrap_or("none"),
        start_time,
    );
    access_log::emit(&AccessLogRecord {
        request_id: &request_id,
        method: &method,
        path: &path,
        status: status.as_u16(),
        latency_ms: start_time.elapsed().as_millis() as u64,
        client_key: &client_key,
        subject: outcome.subject.as_deref().unwrap_or(ANONYMOUS),
    });

    outcome.response
}

async fn run_stages(
    state: &GatewayState,
    request_id: &str,
    client_key: &str,
    path: &str,
    req: Request<Body>,
) -> PipelineOutcome {
    // 1. Resolve route
    let Some(route) = state.routes.resolve(path) else {
        tracing::warn!(request_id = %request_id, path = %path, "No route matched");
        return PipelineOutcome::terminal(gateway_error(
            StatusCode::NOT_FOUND,
            "Route not found",
            None,
        ));
    };
    let target = route.target.as_str().to_string();

    // 2. Authentication
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());
    let subject = match state.auth.authenticate(auth_header, route.auth_required) {
        Ok(subject) => subject,
        Err(reason) => {
            tracing::warn!(
                request_id = %request_id,
                path = %path,
                reason = %reason,
                "Unauthorized request"
            );
            return PipelineOutcome::terminal(gateway_error(
                StatusCode::UNAUTHORIZED,
                "Unauthorized",
                Some(&reason.to_string()),
            ));
        }
    };

    // 3. Rate limiting
    let rate = state.limiter.check(client_key, route.rate_limited);
    if let RateDecision::Denied { .. } = rate {
        tracing::warn!(request_id = %request_id, client = %client_key, "Rate limit exceeded");
        metrics::record_rate_limited();
        return PipelineOutcome {
            response: gateway_error(
                StatusCode::TOO_MANY_REQUESTS,
                "Too Many Requests",
                Some("Rate limit exceeded. Try again later."),
            ),
            rate,
            subject,
            target: Some(target),
        };
    }

    // 4. Circuit breaker admission (protected routes only)
    if route.rate_limited && !state.breaker.admit(&target) {
        tracing::error!(request_id = %request_id, target = %target, "Circuit open, failing fast");
        metrics::record_circuit_rejected(&target);
        return PipelineOutcome {
            response: gateway_error(
                StatusCode::SERVICE_UNAVAILABLE,
                "Service Unavailable",
                Some("circuit breaker is open"),
            ),
            rate,
            subject,
            target: Some(target),
        };
    }

    // 5. Forward, streaming both bodies
    let (parts, body) = req.into_parts();
    match state.forwarder.forward(&route, parts, body, request_id).await {
        Ok(response) => {
            if route.rate_limited {
                state.breaker.record_success(&target);
            }
            PipelineOutcome {
                response,
                rate,
                subject,
                target: Some(target),
            }
        }
        Err(e) => {
            // Full detail stays in the log; the client gets a generic body
            // plus the correlation id header.
            tracing::error!(
                request_id = %request_id,
                target = %target,
                error = %e,
                "Upstream request failed"
            );
            metrics::record_upstream_failure(&target);
            if route.rate_limited {
                state.breaker.record_failure(&target);
            }
            PipelineOutcome {
                response: gateway_error(
                    StatusCode::BAD_GATEWAY,
                    "Bad Gateway",
                    Some("backend service unreachable"),
                ),
                rate,
                subject,
                target: Some(target),
            }
        }
    }
}
