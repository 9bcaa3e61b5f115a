//! External inference provider client for the inferq service.
//!
//! The provider is a black box: `generate(text) -> text`, fallible,
//! occasionally rate-limited. This crate is the sole point of contact with
//! it. Workers program against the [`InferenceClient`] trait so the
//! production HTTP client can be swapped for a [`ScriptedClient`] in tests
//! without touching worker logic.
//!
//! # Architecture
//!
//! - [`InferenceClient`] - The seam workers call through
//! - [`InferenceError`] - `RateLimited` vs `Provider` failure classification
//! - [`HttpInferenceClient`] - OpenAI-compatible chat-completions client
//! - [`ScriptedClient`] - Deterministic test double

mod error;
mod http;
mod scripted;

pub use error::InferenceError;
pub use http::{HttpClientConfig, HttpInferenceClient};
pub use scripted::ScriptedClient;

// Re-export async_trait for convenience when implementing InferenceClient.
pub use async_trait::async_trait;

/// Client for the external inference capability.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    /// Run one inference over the given prompt and input payload.
    ///
    /// A single attempt: retry and backoff policy belong to the caller,
    /// keyed on [`InferenceError::is_rate_limited`].
    async fn generate(&self, prompt: &str, input: &str) -> Result<String, InferenceError>;
}
