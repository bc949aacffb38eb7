//! Structured logging setup.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the configured level applies to
/// the gateway's own targets.
pub fn init(log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("api_gateway={log_level},tower_http=warn").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
