//! Shared utilities for integration and load testing.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::fmt::Display;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use futures_util::future::{BoxFuture, FutureExt};
use resilience_demo::config::{CircuitBreakerConfig, DemoConfig, PolicyConfig, RetryConfig};
use resilience_demo::service::{Callback, CallbackTask, ExternalService, ServiceError};
use resilience_demo::{HttpServer, Shutdown};
use tokio::net::TcpListener;

/// Defaults with every delay shortened so tests run fast.
pub fn fast_config() -> DemoConfig {
    let mut config = DemoConfig::default();
    config.simulation.async_delay_ms = 5;
    config.simulation.callback_delay_ms = 50;
    config.simulation.seed = Some(7);
    for instance in config.resilience.instances.values_mut() {
        if let Some(retry) = instance.retry.as_mut() {
            retry.base_delay_ms = 0;
            retry.max_delay_ms = 0;
        }
    }
    config
}

/// Replace a policy instance.
pub fn set_instance(
    config: &mut DemoConfig,
    name: &str,
    circuit_breaker: Option<CircuitBreakerConfig>,
    retry: Option<RetryConfig>,
) {
    config.resilience.instances.insert(
        name.to_string(),
        PolicyConfig {
            circuit_breaker,
            retry,
        },
    );
}

/// A breaker that opens after four calls with at least half failing.
pub fn small_breaker(wait_duration_open_ms: u64) -> CircuitBreakerConfig {
    CircuitBreakerConfig {
        sliding_window_size: 4,
        minimum_number_of_calls: 4,
        failure_rate_threshold: 50.0,
        wait_duration_open_ms,
        permitted_calls_in_half_open: 1,
    }
}

/// Start the server on an ephemeral port.
pub async fn spawn_server(config: DemoConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}

/// How the scripted double answers callback-style calls.
pub enum CallbackScript {
    /// Invoke the callback immediately with this message.
    Deliver(String),
    /// Start a long task and cancel it straight away.
    Interrupt,
}

/// A service double answering from pre-recorded scripts.
pub struct ScriptedService {
    pub call: Mutex<VecDeque<Result<String, ServiceError>>>,
    pub sync: Mutex<VecDeque<Result<String, ServiceError>>>,
    pub async_result: Mutex<Option<Result<String, ServiceError>>>,
    pub callback: Mutex<Option<CallbackScript>>,
    pub sync_calls: AtomicUsize,
}

impl ScriptedService {
    pub fn new() -> Self {
        Self {
            call: Mutex::new(VecDeque::new()),
            sync: Mutex::new(VecDeque::new()),
            async_result: Mutex::new(None),
            callback: Mutex::new(None),
            sync_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_call(self, results: Vec<Result<String, ServiceError>>) -> Self {
        *self.call.lock().unwrap() = results.into();
        self
    }

    pub fn with_sync(self, results: Vec<Result<String, ServiceError>>) -> Self {
        *self.sync.lock().unwrap() = results.into();
        self
    }

    pub fn with_async(self, result: Result<String, ServiceError>) -> Self {
        *self.async_result.lock().unwrap() = Some(result);
        self
    }

    pub fn with_callback(self, script: CallbackScript) -> Self {
        *self.callback.lock().unwrap() = Some(script);
        self
    }
}

fn exhausted() -> Result<String, ServiceError> {
    Err(ServiceError::Simulated("script exhausted".into()))
}

impl ExternalService for ScriptedService {
    fn call(&self) -> Result<String, ServiceError> {
        self.call.lock().unwrap().pop_front().unwrap_or_else(exhausted)
    }

    fn call_external_api_sync(&self) -> Result<String, ServiceError> {
        self.sync_calls.fetch_add(1, Ordering::SeqCst);
        self.sync.lock().unwrap().pop_front().unwrap_or_else(exhausted)
    }

    fn fallback(&self, error: &dyn Display) -> String {
        format!("scripted fallback: {}", error)
    }

    fn process_with_callback(&self, callback: Callback) -> CallbackTask {
        match self.callback.lock().unwrap().take() {
            Some(CallbackScript::Deliver(message)) => {
                callback(message);
                CallbackTask::spawn(Duration::ZERO, Box::new(|_| {}))
            }
            Some(CallbackScript::Interrupt) => {
                let mut task = CallbackTask::spawn(Duration::from_secs(60), callback);
                task.cancel();
                task
            }
            None => CallbackTask::spawn(Duration::ZERO, callback),
        }
    }

    fn async_process(&self) -> BoxFuture<'static, Result<String, ServiceError>> {
        let result = self.async_result.lock().unwrap().take().unwrap_or_else(exhausted);
        async move { result }.boxed()
    }
}
