//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events via tracing)
//!     → access_log.rs (one record per completed request)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - The request id flows through every log line touching a request
//! - Access log lines live under their own tracing target so they can be
//!   filtered or redirected independently of diagnostic logs
//! - Metrics are cheap (atomic increments behind the metrics facade)

pub mod access_log;
pub mod logging;
pub mod metrics;
