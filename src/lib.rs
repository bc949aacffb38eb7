//! HTTP API Gateway Library
//!
//! A single-ingress gateway that routes client requests to backend
//! services, enforcing authentication, per-client rate limiting, and
//! circuit breaking before streaming bodies through.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod resilience;
pub mod routing;
pub mod security;

pub use config::GatewayConfig;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
