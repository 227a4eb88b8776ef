//! Inference gateway entry point.
//!
//! Loads configuration (first CLI argument, or built-in defaults),
//! initializes logging and metrics, and serves until interrupted.

use std::path::PathBuf;

use tokio::net::TcpListener;

use inference_gateway::config::loader::load_config;
use inference_gateway::config::GatewayConfig;
use inference_gateway::http::HttpServer;
use inference_gateway::lifecycle::Shutdown;
use inference_gateway::observability::{logging, metrics};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => load_config(&PathBuf::from(path))?,
        None => GatewayConfig::default(),
    };

    logging::init_logging(&config.observability);

    tracing::info!("inference-gateway v0.1.0 starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        trace_transport = ?config.trace.transport,
        trace_daemon = %config.trace.daemon_address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            shutdown.trigger();
        }
    });

    let server = HttpServer::new(config).await?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
