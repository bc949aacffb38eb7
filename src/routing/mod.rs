//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path + query)
//!     → normalize_path (single leading slash)
//!     → table.rs (longest-prefix lookup)
//!     → Return: ResolvedRoute or NoMatch
//!
//! Route Compilation (at startup):
//!     RouteConfig[]
//!     → Parse target URLs
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (prefix matching only)
//! - Deterministic: ties on prefix length go to the first-registered route
//! - No-match is explicit; the pipeline turns it into a 404

pub mod table;

pub use table::{normalize_path, ResolvedRoute, RouteTable};
