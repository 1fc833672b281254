use std::path::PathBuf;

use clap::Parser;

use va_relay::config::{load_config, validation::validate_config, RelayConfig};
use va_relay::lifecycle::{wait_for_termination, Shutdown};
use va_relay::observability::{logging, metrics};
use va_relay::{net, RelayServer};

#[derive(Parser)]
#[command(name = "va-relay")]
#[command(about = "Relays JSON-described HTTP requests to arbitrary origins", long_about = None)]
struct Cli {
    /// TOML configuration file; defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Bind address, overriding `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
        validate_config(&config).map_err(|errors| {
            errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        })?;
    }

    logging::init_tracing(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "va-relay starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        max_connections = config.listener.max_connections,
        upstream_timeout_secs = config.upstream.timeout_secs,
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

    let listener = net::bind(&config.listener).await?;

    let shutdown = Shutdown::new();
    let server = RelayServer::new(config)?;
    let server_shutdown = shutdown.subscribe();
    let serving = tokio::spawn(server.run(listener, server_shutdown));

    wait_for_termination().await;
    shutdown.trigger();
    serving.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
