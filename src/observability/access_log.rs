//! Structured access logging.
//!
//! One record per request, emitted after the outcome is known, terminal
//! errors included. Lines go through the `api_gateway::access` target.

use serde::Serialize;

/// Subject used when no authenticated identity is attached.
pub const ANONYMOUS: &str = "anonymous";

/// Structured access log entry.
#[derive(Debug, Serialize)]
pub struct AccessLogRecord<'a> {
    pub request_id: &'a str,
    pub method: &'a str,
    pub path: &'a str,
    pub status: u16,
    pub latency_ms: u64,
    pub client_key: &'a str,
    pub subject: &'a str,
}

/// Emit the record as one structured log event.
pub fn emit(record: &AccessLogRecord<'_>) {
    tracing::info!(
        target: "api_gateway::access",
        request_id = %record.request_id,
        method = %record.method,
        path = %record.path,
        status = record.status,
        latency_ms = record.latency_ms,
        client = %record.client_key,
        subject = %record.subject,
        "request completed"
    );
}
