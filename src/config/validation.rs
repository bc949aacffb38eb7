//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check route targets are well-formed HTTP URLs
//! - Validate value ranges (windows and thresholds > 0)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a valid socket address")]
    BindAddress(String),

    #[error("route {index} prefix {prefix:?} must start with '/'")]
    RoutePrefix { index: usize, prefix: String },

    #[error("route {index} target {target:?} is not a valid http URL")]
    RouteTarget { index: usize, target: String },

    #[error("auth.jwt_secret must be set when a route requires authentication")]
    MissingSecret,

    #[error("rate_limit.{field} must be greater than zero")]
    RateLimitRange { field: &'static str },

    #[error("circuit_breaker.failure_threshold must be greater than zero")]
    BreakerThreshold,
}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    for (index, route) in config.routes.iter().enumerate() {
        if !route.prefix.starts_with('/') {
            errors.push(ValidationError::RoutePrefix {
                index,
                prefix: route.prefix.clone(),
            });
        }
        match Url::parse(&route.target) {
            Ok(url) if url.scheme() == "http" && url.host_str().is_some() => {}
            _ => errors.push(ValidationError::RouteTarget {
                index,
                target: route.target.clone(),
            }),
        }
    }

    if config.routes.iter().any(|r| r.auth_required) && config.auth.jwt_secret.is_empty() {
        errors.push(ValidationError::MissingSecret);
    }

    if config.rate_limit.window_secs == 0 {
        errors.push(ValidationError::RateLimitRange {
            field: "window_secs",
        });
    }
    if config.rate_limit.max_requests == 0 {
        errors.push(ValidationError::RateLimitRange {
            field: "max_requests",
        });
    }
    if config.rate_limit.sweep_interval_secs == 0 {
        errors.push(ValidationError::RateLimitRange {
            field: "sweep_interval_secs",
        });
    }

    if config.circuit_breaker.failure_threshold == 0 {
        errors.push(ValidationError::BreakerThreshold);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
