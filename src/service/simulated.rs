//! Random- and counter-driven stand-in for a downstream dependency.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SimulationConfig;
use crate::service::{CallOutcome, Callback, CallbackTask, ExternalService, ServiceError};

/// Result of a future-based call that completed normally.
pub const ASYNC_SUCCESS: &str = "✅ Completed successfully!";

/// Failure carried by a future-based call that completed exceptionally.
pub const ASYNC_FAILURE: &str = "❌ Failed!";

/// In-process simulation of the external service.
pub struct SimulatedExternalService {
    /// Parity-alternating invocation counter.
    counter: AtomicU64,
    rng: Mutex<StdRng>,
    config: SimulationConfig,
}

impl SimulatedExternalService {
    pub fn new(config: SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            counter: AtomicU64::new(0),
            rng: Mutex::new(rng),
            config,
        }
    }

    /// Number of parity-alternating invocations so far.
    pub fn attempts(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }

    /// Draw `true` with probability `p`.
    fn draw(&self, p: f64) -> bool {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_bool(p.clamp(0.0, 1.0))
    }
}

impl ExternalService for SimulatedExternalService {
    fn call(&self) -> Result<String, ServiceError> {
        let failed = self.draw(self.config.failure_probability);
        if failed {
            tracing::debug!("Simulated external call failed");
        }
        CallOutcome::from_draw(failed).into_result()
    }

    fn call_external_api_sync(&self) -> Result<String, ServiceError> {
        let attempt = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let outcome = CallOutcome::for_attempt(attempt);
        tracing::debug!(attempt, success = outcome.is_success(), "Parity call");
        outcome.into_result()
    }

    fn process_with_callback(&self, callback: Callback) -> CallbackTask {
        CallbackTask::spawn(Duration::from_millis(self.config.callback_delay_ms), callback)
    }

    fn async_process(&self) -> BoxFuture<'static, Result<String, ServiceError>> {
        let failed = self.draw(self.config.async_failure_probability);
        let delay = Duration::from_millis(self.config.async_delay_ms);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if failed {
                Err(ServiceError::Simulated(ASYNC_FAILURE.to_string()))
            } else {
                Ok(ASYNC_SUCCESS.to_string())
            }
        });

        async move {
            match handle.await {
                Ok(result) => result,
                Err(e) => Err(ServiceError::Interrupted(format!("async task failed: {}", e))),
            }
        }
        .boxed()
    }
}
