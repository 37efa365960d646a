//! Startup orchestration.
//!
//! # Responsibilities
//! - Load the config file (or defaults)
//! - Start the metrics exporter when enabled
//! - Bind the listener
//! - Wire OS signals to the shutdown coordinator
//! - Run the HTTP server until it has drained
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - `load` turns config problems into `StartupError::Config`; `run` takes
//!   an already validated config
//! - Listener binds last (traffic only when ready)

use metrics_exporter_prometheus::BuildError;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{load_config, ConfigError, DemoConfig};
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("metrics exporter error: {0}")]
    Metrics(#[from] BuildError),

    #[error("invalid address '{0}'")]
    Address(String),
}

/// Load and validate the config file, or fall back to built-in defaults.
pub fn load(path: Option<&Path>) -> Result<DemoConfig, StartupError> {
    match path {
        Some(path) => Ok(load_config(path)?),
        None => Ok(DemoConfig::default()),
    }
}

/// Serve `config` until SIGINT/SIGTERM.
pub async fn run(config: DemoConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::Address(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;
    tracing::info!(address = %local_addr, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::shutdown_signal().await;
        shutdown.trigger();
    });

    HttpServer::new(config).run(listener, server_shutdown).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_file() {
        let config = load(None).unwrap();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = load(Some(Path::new("/nonexistent/demo.toml"))).unwrap_err();
        assert!(matches!(err, StartupError::Config(ConfigError::Io(_))));
        assert!(err.to_string().starts_with("configuration error:"));
    }
}
