//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the API gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Route definitions mapping path prefixes to backend targets.
    pub routes: Vec<RouteConfig>,

    /// Token verification settings.
    pub auth: AuthConfig,

    /// Rate limiting settings.
    pub rate_limit: RateLimitConfig,

    /// Circuit breaker settings.
    pub circuit_breaker: CircuitBreakerConfig,

    /// Upstream connection settings.
    pub upstream: UpstreamConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Route configuration mapping a path prefix to a backend target.
///
/// The `rate_limited` flag also opts the route into circuit breaking;
/// it marks the route as protected, not just rate-accounted.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Path prefix to match (longest prefix wins).
    pub prefix: String,

    /// Backend base URL (e.g., "http://127.0.0.1:3001").
    pub target: String,

    /// Require a valid bearer token for this route.
    #[serde(default)]
    pub auth_required: bool,

    /// Apply rate limiting and circuit breaking to this route.
    #[serde(default)]
    pub rate_limited: bool,
}

/// Token verification configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Shared HMAC secret for verifying bearer tokens (HS256).
    pub jwt_secret: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            // WARNING: This is a placeholder! Change this in production.
            jwt_secret: "CHANGE_ME_IN_PRODUCTION".to_string(),
        }
    }
}

/// Rate limiting configuration (fixed window per client).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Window length in seconds.
    pub window_secs: u64,

    /// Maximum requests per client per window.
    pub max_requests: u32,

    /// Interval between sweeps of stale client windows, in seconds.
    pub sweep_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: 60,
            max_requests: 10,
            sweep_interval_secs: 60,
        }
    }
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the circuit opens.
    pub failure_threshold: u32,

    /// Time the circuit stays open before a trial request, in milliseconds.
    pub reset_timeout_ms: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            reset_timeout_ms: 5000,
        }
    }
}

/// Upstream connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Time allowed for the backend to produce response headers, in seconds.
    /// Body streaming is not subject to this deadline.
    pub response_header_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 5,
            response_header_timeout_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
