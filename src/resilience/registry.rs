//! Named policy instances built from configuration.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::ResilienceConfig;
use crate::resilience::circuit_breaker::{CircuitBreaker, CircuitSnapshot};
use crate::resilience::policy::{Passthrough, ResiliencePolicy};
use crate::resilience::retries::RetryPolicy;
use crate::resilience::stack::PolicyStack;

/// Lookup of policy stacks by instance name.
#[derive(Default)]
pub struct PolicyRegistry {
    stacks: BTreeMap<String, Arc<PolicyStack>>,
}

impl PolicyRegistry {
    pub fn from_config(config: &ResilienceConfig) -> Self {
        let stacks = config
            .instances
            .iter()
            .map(|(name, instance)| {
                let retry = instance.retry.as_ref().map(|r| RetryPolicy::new(name.clone(), r));
                let breaker = instance
                    .circuit_breaker
                    .as_ref()
                    .map(|cb| Arc::new(CircuitBreaker::new(name.clone(), cb.clone())));

                tracing::debug!(
                    policy = %name,
                    retry = retry.is_some(),
                    circuit_breaker = breaker.is_some(),
                    "Policy instance registered"
                );
                (name.clone(), Arc::new(PolicyStack::new(name.clone(), retry, breaker)))
            })
            .collect();

        Self { stacks }
    }

    /// The stack registered under `name`.
    pub fn get(&self, name: &str) -> Option<Arc<PolicyStack>> {
        self.stacks.get(name).cloned()
    }

    /// The policy for `name`, or a passthrough when no such instance exists.
    pub fn policy(&self, name: &str) -> Arc<dyn ResiliencePolicy> {
        match self.get(name) {
            Some(stack) => stack as Arc<dyn ResiliencePolicy>,
            None => {
                tracing::warn!(policy = %name, "Unknown policy instance, calls are unprotected");
                Arc::new(Passthrough)
            }
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.stacks.keys().map(String::as_str)
    }

    /// Snapshots of every configured circuit breaker, ordered by name.
    pub fn snapshots(&self) -> Vec<CircuitSnapshot> {
        self.stacks
            .values()
            .filter_map(|stack| stack.breaker().map(|cb| cb.snapshot()))
            .collect()
    }
}
