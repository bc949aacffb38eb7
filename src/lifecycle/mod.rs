//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Initialize subsystems → Start listener
//!
//! Shutdown (shutdown.rs):
//!     Signal received → Stop accepting → Drain in-flight requests → Exit
//!     Background tasks (rate-limit sweeper) observe the same signal
//! ```
//!
//! # Design Decisions
//! - One broadcast channel fans out to the server and all background tasks
//! - Shutdown is cooperative; tasks exit at their next select point

pub mod shutdown;

pub use shutdown::Shutdown;
