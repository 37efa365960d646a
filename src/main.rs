//! Resilience patterns demo server.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌───────────────────────────────────────────────────┐
//!                         │                 RESILIENCE DEMO                    │
//!                         │                                                    │
//!     Client Request      │  ┌─────────┐    ┌──────────────┐   ┌────────────┐  │
//!     ────────────────────┼─▶│  http   │───▶│  resilience  │──▶│  service   │  │
//!                         │  │ server  │    │ retry + cb   │   │ simulated  │  │
//!                         │  └────┬────┘    └──────┬───────┘   └────────────┘  │
//!                         │       │                │ Err                        │
//!     Client Response     │       │                ▼                            │
//!     ◀───────────────────┼───────┴──────── fallback text                      │
//!                         │                                                    │
//!                         │  ┌──────────────────────────────────────────────┐  │
//!                         │  │ config │ observability │ lifecycle │ admin   │  │
//!                         │  └──────────────────────────────────────────────┘  │
//!                         └───────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use resilience_demo::lifecycle::startup;
use resilience_demo::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "resilience-demo")]
#[command(about = "Circuit breaker, retry and fallback around a simulated external call", long_about = None)]
struct Args {
    /// TOML configuration file; built-in defaults when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = startup::load(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.listener.bind_address = bind;
    }

    init_logging(&config.observability)?;

    tracing::info!("resilience-demo v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config_file = ?args.config,
        bind_address = %config.listener.bind_address,
        failure_probability = config.simulation.failure_probability,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
