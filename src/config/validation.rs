//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check referential integrity (endpoint bindings name existing instances)
//! - Validate value ranges (probabilities, thresholds, attempts, addresses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: DemoConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{CircuitBreakerConfig, DemoConfig, RetryConfig};

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be a probability in [0, 1], got {value}")]
    Probability { field: &'static str, value: f64 },

    #[error("{field} is not a valid socket address: '{value}'")]
    Address { field: &'static str, value: String },

    #[error("timeouts.request_secs must be greater than 0")]
    ZeroRequestTimeout,

    #[error("resilience.instances.{instance}: {reason}")]
    Instance { instance: String, reason: String },

    #[error("resilience.endpoints.{endpoint} references unknown instance '{instance}'")]
    UnknownInstance { endpoint: &'static str, instance: String },
}

/// Validate a configuration, collecting every violation.
pub fn validate_config(config: &DemoConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    let sim = &config.simulation;
    check_probability(&mut errors, "simulation.failure_probability", sim.failure_probability);
    check_probability(
        &mut errors,
        "simulation.async_failure_probability",
        sim.async_failure_probability,
    );

    for (name, instance) in &config.resilience.instances {
        let mut reasons = Vec::new();
        if let Some(cb) = &instance.circuit_breaker {
            circuit_breaker_reasons(cb, &mut reasons);
        }
        if let Some(retry) = &instance.retry {
            retry_reasons(retry, &mut reasons);
        }
        errors.extend(reasons.into_iter().map(|reason| ValidationError::Instance {
            instance: name.clone(),
            reason,
        }));
    }

    let endpoints = &config.resilience.endpoints;
    for (endpoint, instance) in [("call", &endpoints.call), ("call_sync", &endpoints.call_sync)] {
        if !config.resilience.instances.contains_key(instance) {
            errors.push(ValidationError::UnknownInstance {
                endpoint,
                instance: instance.clone(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_probability(errors: &mut Vec<ValidationError>, field: &'static str, value: f64) {
    if !(0.0..=1.0).contains(&value) {
        errors.push(ValidationError::Probability { field, value });
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::Address {
            field,
            value: value.to_string(),
        });
    }
}

fn circuit_breaker_reasons(cb: &CircuitBreakerConfig, reasons: &mut Vec<String>) {
    if cb.sliding_window_size == 0 {
        reasons.push("circuit_breaker.sliding_window_size must be greater than 0".into());
    }
    if cb.minimum_number_of_calls == 0 {
        reasons.push("circuit_breaker.minimum_number_of_calls must be greater than 0".into());
    }
    if !(cb.failure_rate_threshold > 0.0 && cb.failure_rate_threshold <= 100.0) {
        reasons.push(format!(
            "circuit_breaker.failure_rate_threshold must be in (0, 100], got {}",
            cb.failure_rate_threshold
        ));
    }
    if cb.permitted_calls_in_half_open == 0 {
        reasons.push("circuit_breaker.permitted_calls_in_half_open must be greater than 0".into());
    }
}

fn retry_reasons(retry: &RetryConfig, reasons: &mut Vec<String>) {
    if retry.max_attempts == 0 {
        reasons.push("retry.max_attempts must be at least 1".into());
    }
    if retry.base_delay_ms > retry.max_delay_ms {
        reasons.push(format!(
            "retry.base_delay_ms ({}) exceeds retry.max_delay_ms ({})",
            retry.base_delay_ms, retry.max_delay_ms
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{PolicyConfig, SYNC_POLICY};

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&DemoConfig::default()), Ok(()));
    }

    #[test]
    fn test_reports_every_violation() {
        let mut config = DemoConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.simulation.failure_probability = 1.5;
        config.resilience.endpoints.call = "missing".into();
        config.resilience.instances.insert(
            "broken".into(),
            PolicyConfig {
                circuit_breaker: Some(CircuitBreakerConfig {
                    sliding_window_size: 0,
                    failure_rate_threshold: 0.0,
                    ..Default::default()
                }),
                retry: Some(RetryConfig {
                    max_attempts: 0,
                    base_delay_ms: 10,
                    max_delay_ms: 1,
                }),
            },
        );

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 7, "{:?}", errors);
        assert!(errors.contains(&ValidationError::UnknownInstance {
            endpoint: "call",
            instance: "missing".into(),
        }));
        assert!(errors
            .iter()
            .any(|e| e.to_string().starts_with("resilience.instances.broken: retry.max_attempts")));
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = DemoConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_removed_instance_breaks_binding() {
        let mut config = DemoConfig::default();
        config.resilience.instances.remove(SYNC_POLICY);
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::UnknownInstance {
                endpoint: "call_sync",
                instance: SYNC_POLICY.into(),
            }]
        );
    }
}
