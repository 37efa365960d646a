//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the demo
//! service. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the retry + circuit breaker instance guarding `/api/callSync`.
pub const SYNC_POLICY: &str = "myService";

/// Name of the circuit breaker instance guarding `/api/call`.
pub const CALL_POLICY: &str = "externalService";

/// Root configuration for the demo service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DemoConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Behaviour of the simulated dependency.
    pub simulation: SimulationConfig,

    /// Named resilience policy instances and their endpoint bindings.
    pub resilience: ResilienceConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    #[serde(default)]
    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Simulated dependency behaviour.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Probability that a probabilistic call fails.
    pub failure_probability: f64,

    /// Probability that a future-based call completes exceptionally.
    pub async_failure_probability: f64,

    /// Work duration of a future-based call in milliseconds.
    pub async_delay_ms: u64,

    /// Work duration of a callback-based call in milliseconds.
    pub callback_delay_ms: u64,

    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            failure_probability: 0.6,
            async_failure_probability: 0.5,
            async_delay_ms: 100,
            callback_delay_ms: 500,
            seed: None,
        }
    }
}

/// Resilience configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ResilienceConfig {
    /// Policy instances keyed by name.
    pub instances: BTreeMap<String, PolicyConfig>,

    /// Which instance guards which endpoint.
    pub endpoints: EndpointPolicies,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        let mut instances = BTreeMap::new();
        instances.insert(
            SYNC_POLICY.to_string(),
            PolicyConfig {
                // Retried parity calls buffer one failure per success, peaking
                // at 60% over the minimum; only a dead dependency goes higher.
                circuit_breaker: Some(CircuitBreakerConfig {
                    failure_rate_threshold: 75.0,
                    ..CircuitBreakerConfig::default()
                }),
                retry: Some(RetryConfig::default()),
            },
        );
        instances.insert(
            CALL_POLICY.to_string(),
            PolicyConfig {
                circuit_breaker: Some(CircuitBreakerConfig::default()),
                retry: None,
            },
        );

        Self {
            instances,
            endpoints: EndpointPolicies::default(),
        }
    }
}

/// One named policy instance. Absent sections are not applied.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PolicyConfig {
    pub circuit_breaker: Option<CircuitBreakerConfig>,
    pub retry: Option<RetryConfig>,
}

/// Endpoint to policy instance bindings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EndpointPolicies {
    /// Instance guarding `/api/call`.
    pub call: String,

    /// Instance guarding `/api/callSync`.
    pub call_sync: String,
}

impl Default for EndpointPolicies {
    fn default() -> Self {
        Self {
            call: CALL_POLICY.to_string(),
            call_sync: SYNC_POLICY.to_string(),
        }
    }
}

/// Count-based circuit breaker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Number of most recent outcomes kept in the window.
    pub sliding_window_size: u32,

    /// Outcomes required before the failure rate is evaluated.
    pub minimum_number_of_calls: u32,

    /// Failure rate (percent) at or above which the circuit opens.
    pub failure_rate_threshold: f32,

    /// Time spent open before allowing trial calls, in milliseconds.
    pub wait_duration_open_ms: u64,

    /// Trial calls allowed while half-open.
    pub permitted_calls_in_half_open: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            sliding_window_size: 10,
            minimum_number_of_calls: 5,
            failure_rate_threshold: 50.0,
            wait_duration_open_ms: 10_000,
            permitted_calls_in_half_open: 3,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first call.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds. Zero retries immediately.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Compact,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin endpoints configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Expose `/admin/*` routes.
    pub enabled: bool,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_bind_both_instances() {
        let config = DemoConfig::default();
        let sync = &config.resilience.instances[SYNC_POLICY];
        assert!(sync.retry.is_some() && sync.circuit_breaker.is_some());

        let sync_breaker = sync.circuit_breaker.as_ref().unwrap();
        assert!(sync_breaker.failure_rate_threshold > 60.0);

        let call = &config.resilience.instances[CALL_POLICY];
        assert!(call.retry.is_none() && call.circuit_breaker.is_some());
        assert_eq!(call.circuit_breaker.as_ref().unwrap().failure_rate_threshold, 50.0);
        assert_eq!(config.simulation.failure_probability, 0.6);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: DemoConfig = toml::from_str(
            r#"
            [simulation]
            failure_probability = 1.0

            [resilience.instances.flaky.retry]
            max_attempts = 5

            [resilience.endpoints]
            call_sync = "flaky"
            "#,
        )
        .unwrap();

        assert_eq!(config.simulation.failure_probability, 1.0);
        assert_eq!(config.simulation.callback_delay_ms, 500);
        assert_eq!(config.resilience.endpoints.call_sync, "flaky");
        assert_eq!(config.resilience.endpoints.call, CALL_POLICY);

        let flaky = &config.resilience.instances["flaky"];
        assert_eq!(flaky.retry.as_ref().unwrap().max_attempts, 5);
        assert_eq!(flaky.retry.as_ref().unwrap().base_delay_ms, 100);
        assert!(flaky.circuit_breaker.is_none());
    }
}
