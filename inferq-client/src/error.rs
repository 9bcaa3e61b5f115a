//! Inference failure taxonomy.

use thiserror::Error;

/// Classified failure from the external inference provider.
///
/// The classification drives retry behavior: `RateLimited` is transient
/// capacity exhaustion and worth backing off for; everything else is
/// `Provider` and retrying it would only mask a genuine error behind delay.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InferenceError {
    #[error("rate limited by inference provider: {message}")]
    RateLimited { message: String },

    #[error("inference provider error: {message}")]
    Provider { message: String },
}

impl InferenceError {
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited {
            message: message.into(),
        }
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    /// Returns true if this failure is eligible for backoff-and-retry.
    #[inline]
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}
