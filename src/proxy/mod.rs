//! Proxy forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! ResolvedRoute + inbound request parts
//!     → forwarder.rs (rewrite URI, overwrite correlation id)
//!     → hyper client (streams request body up, response body down)
//!     → backend status/headers passed through verbatim
//!     → connect error / reset / header timeout → Failure (502, feeds breaker)
//! ```

pub mod forwarder;

pub use forwarder::{ForwardError, ProxyForwarder};
