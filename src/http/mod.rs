//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, state injection)
//!     → pipeline.rs (fixed stage order per request)
//!     → request.rs (correlation id, client key)
//!     → response.rs (error bodies, named header steps)
//!     → Send to client
//! ```

pub mod pipeline;
pub mod request;
pub mod response;
pub mod server;

pub use server::{GatewayServer, GatewayState};
