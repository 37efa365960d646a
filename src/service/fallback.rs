//! Fallback and handler text formatting.
//!
//! Pure functions: each embeds the message of the error (or result) it is
//! given and never fails.

use std::fmt::Display;

/// Fallback used when the protected sync call gives up.
pub fn fallback_response(error: &dyn Display) -> String {
    format!("⚠️ Fallback response because: {}", error)
}

/// Fallback used by the circuit-protected `/api/call` endpoint.
pub fn unavailable_response(error: &dyn Display) -> String {
    format!("⚠️ Fallback: service unavailable (“{}”)", error)
}

/// Success handler for the future-based call.
pub fn success_handler(result: &str) -> String {
    format!("🎉 SUCCESS callback in Service: {}", result)
}

/// Error handler for the future-based call.
pub fn error_handler(error: &dyn Display) -> String {
    format!("💥 ERROR callback in Service: {}", error)
}
