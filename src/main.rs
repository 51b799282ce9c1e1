//! Copilot chat-extension relay.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────┐
//!                        │                   COPILOT RELAY                   │
//!                        │                                                   │
//!   Platform request     │  ┌─────────┐    ┌──────────┐    ┌──────────────┐  │
//!   ─────────────────────┼─▶│  http   │───▶│ payload  │───▶│ orchestrator │  │
//!   (X-GitHub-Token)     │  │ server  │    │ decoder  │    │ + persona    │  │
//!                        │  └─────────┘    └──────────┘    └──────┬───────┘  │
//!                        │                                        │          │
//!                        │                                        ▼          │
//!   Upstream body        │  ┌─────────┐                    ┌──────────────┐  │
//!   ◀────────────────────┼──│response │◀───────────────────│   upstream   │◀─┼── Completions
//!                        │  │passthru │                    │    client    │  │   API
//!                        │  └─────────┘                    └──────────────┘  │
//!                        │                                                   │
//!                        │   config · observability · lifecycle             │
//!                        └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use copilot_relay::config::{load_config, validate_config, RelayConfig};
use copilot_relay::lifecycle::signals::spawn_signal_handler;
use copilot_relay::observability::{logging, metrics};
use copilot_relay::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "copilot-relay")]
#[command(about = "Relay Copilot chat-extension conversations to a completions API", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
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

    logging::init_logging(&config.observability);

    tracing::info!("copilot-relay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.completions_url,
        require_credential = config.persona.require_credential,
        demo_chat = config.demo_chat.enabled,
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
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    spawn_signal_handler(shutdown.clone());

    let server = HttpServer::new(config)?;
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
