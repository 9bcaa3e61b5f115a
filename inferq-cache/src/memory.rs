//! In-process memoization cache.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::{CacheError, ResultCache};

/// Process-wide in-memory cache backed by a sharded concurrent map.
///
/// Insertion-only: entries are never evicted within the lifetime of the
/// process. Sharded locking means unrelated fingerprints do not contend.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: DashMap<String, String>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of memoized results.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ResultCache for MemoryCache {
    async fn lookup(&self, fingerprint: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.get(fingerprint).map(|e| e.value().clone()))
    }

    async fn store(&self, fingerprint: &str, result: &str) -> Result<(), CacheError> {
        self.entries
            .insert(fingerprint.to_owned(), result.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::fingerprint;

    #[tokio::test]
    async fn miss_then_hit() {
        let cache = MemoryCache::new();
        let fp = fingerprint("Summarize", "The quick brown fox");

        assert_eq!(cache.lookup(&fp).await.unwrap(), None);

        cache.store(&fp, "A fox is quick and brown.").await.unwrap();
        assert_eq!(
            cache.lookup(&fp).await.unwrap().as_deref(),
            Some("A fox is quick and brown.")
        );
    }

    #[tokio::test]
    async fn entries_are_independent() {
        let cache = MemoryCache::new();
        cache.store("a", "1").await.unwrap();
        cache.store("b", "2").await.unwrap();

        assert_eq!(cache.lookup("a").await.unwrap().as_deref(), Some("1"));
        assert_eq!(cache.lookup("b").await.unwrap().as_deref(), Some("2"));
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn concurrent_writers_do_not_lose_entries() {
        let cache = Arc::new(MemoryCache::new());

        let mut handles = Vec::new();
        for i in 0..32 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                let key = format!("key-{i}");
                cache.store(&key, "value").await.unwrap();
                cache.lookup(&key).await.unwrap()
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().as_deref(), Some("value"));
        }
        assert_eq!(cache.len(), 32);
    }
}
