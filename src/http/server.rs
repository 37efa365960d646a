//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Build the simulated service and the policy registry from config
//! - Bind server to listener and drain on shutdown

use axum::{routing::get, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::timeout::TimeoutLayer;

use crate::admin;
use crate::config::DemoConfig;
use crate::http::api;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::observability::tracing::trace_layer;
use crate::resilience::{PolicyRegistry, ResiliencePolicy};
use crate::service::{ExternalService, SimulatedExternalService};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<dyn ExternalService>,
    pub policies: Arc<PolicyRegistry>,
    /// Policy guarding `/api/call`.
    pub call_policy: Arc<dyn ResiliencePolicy>,
    /// Policy guarding `/api/callSync`.
    pub sync_policy: Arc<dyn ResiliencePolicy>,
}

impl AppState {
    pub fn new(config: &DemoConfig, service: Arc<dyn ExternalService>) -> Self {
        let policies = Arc::new(PolicyRegistry::from_config(&config.resilience));
        let endpoints = &config.resilience.endpoints;

        Self {
            service,
            call_policy: policies.policy(&endpoints.call),
            sync_policy: policies.policy(&endpoints.call_sync),
            policies,
        }
    }
}

/// HTTP server for the demo service.
pub struct HttpServer {
    router: Router,
    state: AppState,
    config: DemoConfig,
}

impl HttpServer {
    /// Create a new HTTP server backed by the simulated service.
    pub fn new(config: DemoConfig) -> Self {
        let service = Arc::new(SimulatedExternalService::new(config.simulation.clone()));
        Self::with_service(config, service)
    }

    /// Create a new HTTP server backed by the given service.
    pub fn with_service(config: DemoConfig, service: Arc<dyn ExternalService>) -> Self {
        let state = AppState::new(&config, service);
        let router = Self::build_router(&config, state.clone());
        Self {
            router,
            state,
            config,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &DemoConfig, state: AppState) -> Router {
        let mut router = Router::new()
            .route("/api/test", get(api::test_api))
            .route("/api/call", get(api::call_external))
            .route("/api/callSync", get(api::call_sync))
            .route("/api/callAsync", get(api::call_async))
            .route("/api/callback", get(api::callback))
            .route("/health", get(admin::handlers::get_status));

        if config.admin.enabled {
            router = router.merge(admin::routes());
        }

        router
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(propagate_request_id_layer())
            .layer(trace_layer())
            .layer(set_request_id_layer())
    }

    /// A clone of the fully layered router.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            policies = ?self.state.policies.names().collect::<Vec<_>>(),
            request_timeout_secs = self.config.timeouts.request_secs,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received, draining connections");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &DemoConfig {
        &self.config
    }
}
