use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use slice_api::config::{load_config, ServiceConfig};
use slice_api::lifecycle::{Services, Shutdown};
use slice_api::observability::{logging, metrics};

#[derive(Parser, Debug)]
#[command(name = "slice-api", version, about = "Slice account API and realtime gateway")]
struct Cli {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Emit logs as JSON.
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    logging::init_logging(cli.json_logs);

    tracing::info!("slice-api v{} starting", env!("CARGO_PKG_VERSION"));

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    tracing::info!(
        bind_address = %config.listener.bind_address,
        gateway_path = %config.gateway.path,
        accounts = config.accounts.len(),
        "Configuration loaded"
    );

    // Metrics exporter
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let services = Services::build(&config)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = services.http_server(&config);
    let serving = tokio::spawn(server.run(listener, shutdown.subscribe()));

    shutdown.trigger_on_signal().await;

    serving.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
