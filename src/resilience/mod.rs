//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Request to backend:
//!     → circuit_breaker.rs admit (fail fast while the circuit is open)
//!     → forward
//!     → circuit_breaker.rs record (success clears, failures trip)
//! ```
//!
//! # Design Decisions
//! - Per-target circuit breaker (not global): one failing backend must not
//!   fail-fast requests to an unrelated one
//! - Fail fast in Open state (no waiting for a timeout)
//! - The gateway never retries; the timed half-open probe is the only
//!   self-healing behavior

pub mod circuit_breaker;

pub use circuit_breaker::{CircuitBreaker, CircuitStatus};
