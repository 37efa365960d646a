//! Managed background task for callback-style calls.

use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::service::ServiceError;

/// Message delivered when the work finishes normally.
pub const CALLBACK_SUCCESS: &str = "✅ Task completed successfully!";

/// Message delivered when the work is cancelled before it finishes.
pub const CALLBACK_INTERRUPTED: &str = "❌ Processing error: task interrupted";

/// Completion handler, invoked exactly once.
pub type Callback = Box<dyn FnOnce(String) + Send + 'static>;

/// Handle to a spawned callback task.
///
/// Dropping the handle leaves the task running; only [`CallbackTask::cancel`]
/// interrupts it.
#[derive(Debug)]
pub struct CallbackTask {
    cancel_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl CallbackTask {
    /// Spawn a task that waits `delay` and then hands its result to `callback`.
    pub fn spawn(delay: Duration, callback: Callback) -> Self {
        let (cancel_tx, cancel_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            let message = tokio::select! {
                _ = tokio::time::sleep(delay) => CALLBACK_SUCCESS,
                Ok(()) = cancel_rx => {
                    tracing::debug!("Callback task interrupted");
                    CALLBACK_INTERRUPTED
                }
            };
            callback(message.to_string());
        });

        Self {
            cancel_tx: Some(cancel_tx),
            handle,
        }
    }

    /// Interrupt the task. Returns `false` if it had already completed or
    /// was cancelled before.
    pub fn cancel(&mut self) -> bool {
        match self.cancel_tx.take() {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the callback to have run.
    pub async fn join(self) -> Result<(), ServiceError> {
        self.handle
            .await
            .map_err(|e| ServiceError::Interrupted(format!("callback task failed: {}", e)))
    }
}
