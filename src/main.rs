//! Indicator document API.
//!
//! Serves economic time series, articles, charts and daily stock bars stored
//! as JSON documents in an object store, and appends newsletter signups.
//!
//! # Architecture Overview
//!
//! ```text
//!   Client Request
//!   ──────────────▶ http::server ──▶ routing::route ──▶ routing::dispatcher
//!                   (request id,     (path → Route)       │
//!                    trace, cors,                         ├─▶ registry (id → key)
//!                    timeout)                             ├─▶ documents::fetcher ──▶ storage
//!                                                         ├─▶ documents::aggregator
//!                                                         └─▶ documents::range
//!
//!   POST /subscribe ──▶ documents::subscriptions ──▶ storage (read, append, write)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use indicator_api::config::{load_config, ServiceConfig};
use indicator_api::http::ApiServer;
use indicator_api::lifecycle::{wait_for_signal, Shutdown};
use indicator_api::observability::{logging, metrics};
use indicator_api::storage;

#[derive(Parser)]
#[command(name = "indicator-api")]
#[command(about = "JSON document API over object storage", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    logging::init_logging(&config.observability)?;
    tracing::info!("indicator-api v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        backend = ?config.storage.backend,
        storage_timeout_secs = config.storage.timeout_secs,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    let store = storage::from_config(&config.storage).await?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        signal_shutdown.trigger();
    });

    ApiServer::new(config, store).run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
