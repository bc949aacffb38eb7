//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Construct the shared gateway components from configuration
//! - Create the Axum router with the catch-all pipeline handler
//! - Run the server with graceful shutdown
//! - Spawn the rate-limit sweeper alongside the accept loop

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::any, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use crate::http::pipeline::gateway_handler;
use crate::proxy::ProxyForwarder;
use crate::resilience::CircuitBreaker;
use crate::routing::RouteTable;
use crate::security::{rate_limit, Authenticator, RateLimiter};

/// Shared components injected into the pipeline handler.
///
/// Everything here is constructed once at startup and passed by reference;
/// no request path reaches for ambient global state.
#[derive(Clone)]
pub struct GatewayState {
    pub routes: Arc<RouteTable>,
    pub auth: Arc<Authenticator>,
    pub limiter: Arc<RateLimiter>,
    pub breaker: Arc<CircuitBreaker>,
    pub forwarder: Arc<ProxyForwarder>,
}

/// HTTP server for the gateway.
pub struct GatewayServer {
    router: Router,
    state: GatewayState,
    config: GatewayConfig,
}

impl GatewayServer {
    /// Create a new server with the given configuration.
    pub fn new(config: GatewayConfig) -> Self {
        let state = GatewayState {
            routes: Arc::new(RouteTable::from_config(&config.routes)),
            auth: Arc::new(Authenticator::new(&config.auth.jwt_secret)),
            limiter: Arc::new(RateLimiter::new(&config.rate_limit)),
            breaker: Arc::new(CircuitBreaker::new(&config.circuit_breaker)),
            forwarder: Arc::new(ProxyForwarder::new(&config.upstream)),
        };

        let router = Self::build_router(state.clone());

        Self {
            router,
            state,
            config,
        }
    }

    /// Build the Axum router. Every path funnels into the pipeline.
    fn build_router(state: GatewayState) -> Router {
        Router::new()
            .route("/{*path}", any(gateway_handler))
            .route("/", any(gateway_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            routes = self.state.routes.len(),
            "Gateway starting"
        );

        // Sweep stale rate-limit windows until shutdown.
        let sweeper_shutdown = shutdown.resubscribe();
        let limiter = self.state.limiter.clone();
        let sweep_interval = Duration::from_secs(self.config.rate_limit.sweep_interval_secs);
        tokio::spawn(async move {
            rate_limit::sweep_loop(limiter, sweep_interval, sweeper_shutdown).await;
        });

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("Gateway stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}
