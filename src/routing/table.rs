//! Route lookup.
//!
//! # Responsibilities
//! - Store the immutable prefix → target mapping
//! - Resolve a request path to the longest matching prefix
//! - Rewrite the remainder path for the backend
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) prefix scan (acceptable for typical route counts)
//! - Matching runs against the full path-and-query string, so a request
//!   like `/svc?x=1` still resolves against the `/svc` prefix

use url::Url;

use crate::config::RouteConfig;

/// A single route: path prefix, backend target, and per-route policy.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    /// Path prefix to match.
    pub prefix: String,
    /// Pre-parsed backend base URL.
    pub target: Url,
    /// Require a valid bearer token.
    pub auth_required: bool,
    /// Apply rate limiting and circuit breaking.
    pub rate_limited: bool,
}

/// Result of resolving a request path against the table.
#[derive(Debug)]
pub struct ResolvedRoute<'a> {
    /// The prefix that matched.
    pub matched_prefix: &'a str,
    /// Backend base URL for the matched route.
    pub target: &'a Url,
    /// Path (plus query) to send to the backend, always rooted.
    pub remainder: String,
    /// Route requires authentication.
    pub auth_required: bool,
    /// Route is rate limited and circuit protected.
    pub rate_limited: bool,
}

/// Immutable prefix → target mapping, built once at startup.
#[derive(Debug, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// Build the table from configuration, in registration order.
    ///
    /// Entries with unparseable targets are skipped with a warning rather
    /// than aborting startup; validation normally catches them earlier.
    pub fn from_config(routes: &[RouteConfig]) -> Self {
        let mut entries = Vec::with_capacity(routes.len());
        for route in routes {
            match Url::parse(&route.target) {
                Ok(target) => entries.push(RouteEntry {
                    prefix: route.prefix.clone(),
                    target,
                    auth_required: route.auth_required,
                    rate_limited: route.rate_limited,
                }),
                Err(e) => {
                    tracing::warn!(prefix = %route.prefix, target = %route.target, error = %e, "Skipping route with invalid target URL");
                }
            }
        }
        Self { entries }
    }

    /// Number of routes in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve a normalized path (plus query) to a route.
    ///
    /// Longest-prefix match; ties on length go to the first-registered
    /// entry. Returns `None` when no prefix matches.
    pub fn resolve(&self, path: &str) -> Option<ResolvedRoute<'_>> {
        let mut best: Option<&RouteEntry> = None;

        for entry in &self.entries {
            if path.starts_with(&entry.prefix)
                && best.map_or(true, |b| entry.prefix.len() > b.prefix.len())
            {
                best = Some(entry);
            }
        }

        let entry = best?;
        let stripped = &path[entry.prefix.len()..];
        // The backend must always receive a rooted path; this covers an
        // empty remainder and a remainder that is only a query string.
        let remainder = if stripped.starts_with('/') {
            stripped.to_string()
        } else {
            format!("/{stripped}")
        };

        Some(ResolvedRoute {
            matched_prefix: &entry.prefix,
            target: &entry.target,
            remainder,
            auth_required: entry.auth_required,
            rate_limited: entry.rate_limited,
        })
    }
}

/// Normalize a raw request path: trim whitespace, ensure a leading slash,
/// collapse any run of leading slashes to one.
pub fn normalize_path(raw: &str) -> String {
    format!("/{}", raw.trim().trim_start_matches('/'))
}
