//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (route already resolved):
//!     → auth.rs (verify bearer token against route policy)
//!     → rate_limit.rs (fixed-window check per client key)
//!     → Pass to circuit breaker / forwarding
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any check failure
//! - Verification failures collapse to one client-visible reason
//! - No trust in client input, except X-Forwarded-For by explicit contract

pub mod auth;
pub mod rate_limit;

pub use auth::{AuthError, Authenticator};
pub use rate_limit::{RateDecision, RateLimiter};
