//! HTTP API Gateway
//!
//! A production-ready API gateway built with Tokio and Axum.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────┐
//!                      │                   API GATEWAY                     │
//!                      │                                                   │
//!   Client Request     │  ┌─────────┐   ┌──────────┐   ┌──────────────┐  │
//!   ───────────────────┼─▶│  http   │──▶│ routing  │──▶│   security   │  │
//!                      │  │ server  │   │  table   │   │ auth + rate  │  │
//!                      │  └─────────┘   └──────────┘   └──────┬───────┘  │
//!                      │                                       │          │
//!                      │                                       ▼          │
//!   Client Response    │  ┌─────────┐   ┌──────────┐   ┌──────────────┐  │
//!   ◀──────────────────┼──│response │◀──│  proxy   │◀──│  resilience  │◀─┼── Backend
//!                      │  │ headers │   │forwarder │   │   breaker    │  │    Server
//!                      │  └─────────┘   └──────────┘   └──────────────┘  │
//!                      │                                                   │
//!                      │  ┌────────────────────────────────────────────┐  │
//!                      │  │            Cross-Cutting Concerns           │  │
//!                      │  │  ┌────────┐ ┌─────────────┐ ┌───────────┐  │  │
//!                      │  │  │ config │ │observability│ │ lifecycle │  │  │
//!                      │  │  └────────┘ └─────────────┘ └───────────┘  │  │
//!                      │  └────────────────────────────────────────────┘  │
//!                      └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use api_gateway::config::loader::load_config;
use api_gateway::{GatewayConfig, GatewayServer, Shutdown};

#[derive(Parser)]
#[command(name = "api-gateway")]
#[command(about = "HTTP API gateway: routing, auth, rate limiting, circuit breaking", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    api_gateway::observability::logging::init(&config.observability.log_level);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        routes = config.routes.len(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            api_gateway::observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    shutdown.trigger_on_ctrl_c();

    let server = GatewayServer::new(config);
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
