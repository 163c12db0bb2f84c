//! casegate: routes case-management traffic by case type.

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use casegate::config::{load_config, validation::validate_config, ConfigError, GatewayConfig};
use casegate::observability::{logging, metrics};
use casegate::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "casegate")]
#[command(about = "Routes case-management requests to the backend for their case type", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init_logging(&config.observability.log_level);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "casegate starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        case_types = config.proxies.len(),
        custom_routes = !config.routes.is_empty(),
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
    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let signal = shutdown.clone();
    tokio::spawn(async move { signal.trigger_on_ctrl_c().await });

    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
