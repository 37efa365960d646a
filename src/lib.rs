//! Resilience patterns demo: circuit breaker, retry and fallback around a
//! simulated external call, served over HTTP.

pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod service;

pub use config::DemoConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use resilience::{PolicyRegistry, ResiliencePolicy};
pub use service::{ExternalService, SimulatedExternalService};
