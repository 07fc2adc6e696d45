//! treeroute service binary.
//!
//! ```text
//!   Client ──▶ axum listener ──▶ Dispatcher ──▶ Router(s) ──▶ PathTree
//!                                    │              │
//!                         dispatcher middleware  router middleware
//!                                    └──────▶ handler ◀─────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use treeroute::config::{load_config, ServiceConfig};
use treeroute::lifecycle::startup;
use treeroute::observability::logging;

#[derive(Parser)]
#[command(name = "treeroute")]
#[command(about = "Segment-tree HTTP router service", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };

    logging::init(&config.observability);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
