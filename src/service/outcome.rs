//! Outcomes of a single simulated call.

use thiserror::Error;

/// Message returned by a successful probabilistic call.
pub const EXTERNAL_SUCCESS: &str = "✅ External service success!";

/// Message carried by a failed probabilistic call.
pub const EXTERNAL_FAILURE: &str = "Simulated failure in external service";

/// Error raised by the simulated dependency.
///
/// `Display` yields the message text verbatim so fallbacks can embed it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The dependency reported a failure.
    #[error("{0}")]
    Simulated(String),

    /// The unit of work was interrupted before it could finish.
    #[error("{0}")]
    Interrupted(String),
}

impl ServiceError {
    /// The human-readable message of this error.
    pub fn message(&self) -> &str {
        match self {
            ServiceError::Simulated(m) | ServiceError::Interrupted(m) => m,
        }
    }
}

/// Result of one simulated call. Lives only as long as the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    Success(String),
    Failure(String),
}

impl CallOutcome {
    /// Outcome of the `attempt`-th parity-alternating call.
    ///
    /// Odd attempts fail, even attempts succeed.
    pub fn for_attempt(attempt: u64) -> Self {
        if attempt % 2 == 0 {
            CallOutcome::Success(format!("✅ Success on attempt {}", attempt))
        } else {
            CallOutcome::Failure(format!("❌ External API failed on attempt {}", attempt))
        }
    }

    /// Outcome of a probabilistic call given whether the draw came up as a failure.
    pub fn from_draw(failed: bool) -> Self {
        if failed {
            CallOutcome::Failure(EXTERNAL_FAILURE.to_string())
        } else {
            CallOutcome::Success(EXTERNAL_SUCCESS.to_string())
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CallOutcome::Success(_))
    }

    pub fn into_result(self) -> Result<String, ServiceError> {
        match self {
            CallOutcome::Success(message) => Ok(message),
            CallOutcome::Failure(reason) => Err(ServiceError::Simulated(reason)),
        }
    }
}

impl From<CallOutcome> for Result<String, ServiceError> {
    fn from(outcome: CallOutcome) -> Self {
        outcome.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_odd_attempts_fail() {
        for n in 1..=101u64 {
            let outcome = CallOutcome::for_attempt(n);
            assert_eq!(!outcome.is_success(), n % 2 == 1, "attempt {}", n);
        }
    }

    #[test]
    fn test_attempt_number_in_message() {
        assert_eq!(
            CallOutcome::for_attempt(3).into_result(),
            Err(ServiceError::Simulated("❌ External API failed on attempt 3".into()))
        );
        assert_eq!(
            CallOutcome::for_attempt(4).into_result(),
            Ok("✅ Success on attempt 4".to_string())
        );
    }

    #[test]
    fn test_error_display_is_message() {
        let err = ServiceError::Interrupted("stopped".into());
        assert_eq!(err.to_string(), "stopped");
        assert_eq!(err.message(), "stopped");
    }
}
