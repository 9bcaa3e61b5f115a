//! Content-addressed result memoization for the inferq service.
//!
//! Identical `(prompt, input)` pairs are common (duplicate or retried
//! submissions), and the external inference call is slow and rate-limited;
//! memoizing by content [`fingerprint`] converts the repeat call into a
//! cheap local read. The cache is strictly best-effort: a lookup or store
//! failure degrades to a forced miss, never a failed job.
//!
//! # Architecture
//!
//! - [`fingerprint`] - Deterministic cache key over `(prompt, input)`
//! - [`ResultCache`] - Trait workers program against
//! - [`MemoryCache`] - Sharded in-process implementation

mod fingerprint;
mod memory;

pub use fingerprint::fingerprint;
pub use memory::MemoryCache;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from a cache backing store.
///
/// Callers treat any error as a miss; this type exists so backends with real
/// failure modes (network caches) can report them for logging.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
}

/// Shared memoization store mapping a request fingerprint to a previously
/// computed result.
///
/// Implementations must be safe under concurrent access from multiple
/// workers; callers perform no external locking.
#[async_trait]
pub trait ResultCache: Send + Sync {
    /// Look up a previously computed result.
    async fn lookup(&self, fingerprint: &str) -> Result<Option<String>, CacheError>;

    /// Record a computed result. Insertion-only; overwriting an existing
    /// entry with an equal value is harmless.
    async fn store(&self, fingerprint: &str, result: &str) -> Result<(), CacheError>;
}
