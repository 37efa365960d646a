//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → DemoConfig (validated, immutable)
//!     → handed to HttpServer, PolicyRegistry and the simulated service
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Supplying `resilience.instances` replaces the default instances wholesale

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    AdminConfig, CircuitBreakerConfig, DemoConfig, EndpointPolicies, ListenerConfig, LogFormat,
    ObservabilityConfig, PolicyConfig, ResilienceConfig, RetryConfig, SimulationConfig,
    TimeoutConfig, CALL_POLICY, SYNC_POLICY,
};
pub use validation::{validate_config, ValidationError};
