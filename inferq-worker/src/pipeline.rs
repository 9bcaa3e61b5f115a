//! Per-job processing: cache lookup, bounded retry, outcome recording.

use std::sync::Arc;

use tracing::{debug, info, warn};

use inferq_cache::{fingerprint, ResultCache};
use inferq_client::{InferenceClient, InferenceError};
use inferq_job_queue::{JobId, JobQueueError, JobStore};

use crate::retry::RetryPolicy;

/// Everything a worker needs to process jobs. Cheap to clone; all fields are
/// handles to shared state.
#[derive(Clone)]
pub struct WorkerContext {
    pub store: JobStore,
    pub cache: Arc<dyn ResultCache>,
    pub client: Arc<dyn InferenceClient>,
    pub policy: RetryPolicy,
}

/// Process one dequeued job to a terminal state.
///
/// Sequence: mark running, check the memoization cache, on a miss call the
/// provider under the retry policy, then record the outcome. All failures
/// end up as a `Failed` record; only store-level errors propagate.
pub async fn process_job(ctx: &WorkerContext, id: JobId) -> Result<(), JobQueueError> {
    let job = match ctx.store.mark_running(id).await {
        Ok(job) => job,
        // Duplicate delivery of an already-finished job; at-least-once
        // makes this normal.
        Err(JobQueueError::TerminalState { state, .. }) => {
            debug!(job_id = %id, %state, "job already terminal, skipping");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let fp = fingerprint(&job.prompt, &job.input);

    match ctx.cache.lookup(&fp).await {
        Ok(Some(cached)) => {
            debug!(job_id = %id, "cache hit, skipping inference call");
            finish(ctx, id, Ok(cached)).await;
            return Ok(());
        }
        Ok(None) => {}
        // Best-effort cache: an unavailable backend is a forced miss.
        Err(e) => warn!(job_id = %id, "cache lookup failed, treating as miss: {}", e),
    }

    let outcome = call_with_retry(ctx, &job.prompt, &job.input).await;

    if let Ok(result) = &outcome {
        if let Err(e) = ctx.cache.store(&fp, result).await {
            warn!(job_id = %id, "cache store failed, result not memoized: {}", e);
        }
    }

    finish(ctx, id, outcome).await;
    Ok(())
}

/// Call the provider with bounded retry, backing off only on rate limits.
async fn call_with_retry(
    ctx: &WorkerContext,
    prompt: &str,
    input: &str,
) -> Result<String, InferenceError> {
    let mut attempt = 0u32;
    loop {
        attempt += 1;

        let call = ctx.client.generate(prompt, input);
        let result = match tokio::time::timeout(ctx.policy.attempt_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(InferenceError::provider(format!(
                "inference call timed out after {:?}",
                ctx.policy.attempt_timeout
            ))),
        };

        match result {
            Ok(text) => return Ok(text),
            Err(e) if e.is_rate_limited() && attempt < ctx.policy.max_attempts => {
                let delay = ctx.policy.backoff_after(attempt);
                debug!(attempt, ?delay, "rate limited, backing off");
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Record the terminal outcome. A lost race with another delivery of the
/// same job is ignored; the first terminal write wins.
async fn finish(ctx: &WorkerContext, id: JobId, outcome: Result<String, InferenceError>) {
    let written = match outcome {
        Ok(result) => {
            info!(job_id = %id, "job completed");
            ctx.store.mark_completed(id, result).await
        }
        Err(e) => {
            warn!(job_id = %id, "job failed: {}", e);
            ctx.store.mark_failed(id, e.to_string()).await
        }
    };

    match written {
        Ok(_) | Err(JobQueueError::TerminalState { .. }) => {}
        Err(e) => warn!(job_id = %id, "failed to record job outcome: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;

    use inferq_cache::MemoryCache;
    use inferq_client::ScriptedClient;
    use inferq_job_queue::JobState;

    use super::*;

    fn context(client: Arc<ScriptedClient>) -> (WorkerContext, Arc<MemoryCache>) {
        let cache = Arc::new(MemoryCache::new());
        let ctx = WorkerContext {
            store: JobStore::new(),
            cache: Arc::clone(&cache) as Arc<dyn ResultCache>,
            client: client as Arc<dyn InferenceClient>,
            policy: RetryPolicy::default(),
        };
        (ctx, cache)
    }

    #[tokio::test]
    async fn success_completes_and_memoizes() {
        let client = Arc::new(ScriptedClient::always_ok("A fox is quick and brown."));
        let (ctx, cache) = context(Arc::clone(&client));

        let job = ctx.store.create("Summarize", "The quick brown fox").await;
        process_job(&ctx, job.id).await.unwrap();

        let done = ctx.store.get(job.id).await.unwrap();
        assert_eq!(done.state, JobState::Completed);
        assert_eq!(done.result.as_deref(), Some("A fox is quick and brown."));
        assert_eq!(client.call_count(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn cache_hit_skips_inference_call() {
        let client = Arc::new(ScriptedClient::always_ok("fresh result"));
        let (ctx, cache) = context(Arc::clone(&client));

        let fp = fingerprint("Summarize", "The quick brown fox");
        cache.store(&fp, "cached result").await.unwrap();

        let job = ctx.store.create("Summarize", "The quick brown fox").await;
        process_job(&ctx, job.id).await.unwrap();

        let done = ctx.store.get(job.id).await.unwrap();
        assert_eq!(done.state, JobState::Completed);
        assert_eq!(done.result.as_deref(), Some("cached result"));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn identical_pair_makes_exactly_one_call() {
        let client = Arc::new(ScriptedClient::always_ok("A fox is quick and brown."));
        let (ctx, _cache) = context(Arc::clone(&client));

        let j1 = ctx.store.create("Summarize", "The quick brown fox").await;
        let j2 = ctx.store.create("Summarize", "The quick brown fox").await;
        assert_ne!(j1.id, j2.id);

        process_job(&ctx, j1.id).await.unwrap();
        process_job(&ctx, j2.id).await.unwrap();

        let a = ctx.store.get(j1.id).await.unwrap();
        let b = ctx.store.get(j2.id).await.unwrap();
        assert_eq!(a.state, JobState::Completed);
        assert_eq!(b.state, JobState::Completed);
        assert_eq!(a.result, b.result);
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_exhaustion_makes_three_attempts_with_backoff() {
        let client = Arc::new(ScriptedClient::always_rate_limited());
        let (ctx, _cache) = context(Arc::clone(&client));

        let job = ctx.store.create("p", "i").await;

        let started = tokio::time::Instant::now();
        process_job(&ctx, job.id).await.unwrap();
        // 2s after the first attempt, 4s after the second.
        assert_eq!(started.elapsed(), Duration::from_secs(6));

        assert_eq!(client.call_count(), 3);
        let done = ctx.store.get(job.id).await.unwrap();
        assert_eq!(done.state, JobState::Failed);
        assert!(done.error.unwrap().contains("rate limited"));
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_failure_short_circuits() {
        let client = Arc::new(ScriptedClient::always_failing("model not found"));
        let (ctx, _cache) = context(Arc::clone(&client));

        let job = ctx.store.create("p", "i").await;

        let started = tokio::time::Instant::now();
        process_job(&ctx, job.id).await.unwrap();
        assert_eq!(started.elapsed(), Duration::ZERO);

        assert_eq!(client.call_count(), 1);
        let done = ctx.store.get(job.id).await.unwrap();
        assert_eq!(done.state, JobState::Failed);
        assert!(done.error.unwrap().contains("model not found"));
    }

    #[tokio::test(start_paused = true)]
    async fn rate_limit_then_success_recovers() {
        let client = Arc::new(ScriptedClient::with_script([
            Err(inferq_client::InferenceError::rate_limited("busy")),
            Ok("recovered".to_string()),
        ]));
        let (ctx, _cache) = context(Arc::clone(&client));

        let job = ctx.store.create("p", "i").await;
        process_job(&ctx, job.id).await.unwrap();

        assert_eq!(client.call_count(), 2);
        let done = ctx.store.get(job.id).await.unwrap();
        assert_eq!(done.state, JobState::Completed);
        assert_eq!(done.result.as_deref(), Some("recovered"));
    }

    struct FailingCache;

    #[async_trait]
    impl ResultCache for FailingCache {
        async fn lookup(
            &self,
            _fingerprint: &str,
        ) -> Result<Option<String>, inferq_cache::CacheError> {
            Err(inferq_cache::CacheError::Unavailable("backend down".into()))
        }

        async fn store(
            &self,
            _fingerprint: &str,
            _result: &str,
        ) -> Result<(), inferq_cache::CacheError> {
            Err(inferq_cache::CacheError::Unavailable("backend down".into()))
        }
    }

    #[tokio::test]
    async fn unavailable_cache_degrades_to_a_miss() {
        let client = Arc::new(ScriptedClient::always_ok("fresh result"));
        let ctx = WorkerContext {
            store: JobStore::new(),
            cache: Arc::new(FailingCache) as Arc<dyn ResultCache>,
            client: Arc::clone(&client) as Arc<dyn InferenceClient>,
            policy: RetryPolicy::default(),
        };

        let job = ctx.store.create("Summarize", "The quick brown fox").await;
        process_job(&ctx, job.id).await.unwrap();

        // Failed lookup forces the miss path; the failed store is ignored.
        let done = ctx.store.get(job.id).await.unwrap();
        assert_eq!(done.state, JobState::Completed);
        assert_eq!(done.result.as_deref(), Some("fresh result"));
        assert_eq!(client.call_count(), 1);
    }

    struct HangingClient;

    #[async_trait]
    impl InferenceClient for HangingClient {
        async fn generate(
            &self,
            _prompt: &str,
            _input: &str,
        ) -> Result<String, inferq_client::InferenceError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn hung_call_times_out_as_non_retryable() {
        let cache = Arc::new(MemoryCache::new());
        let ctx = WorkerContext {
            store: JobStore::new(),
            cache: cache as Arc<dyn ResultCache>,
            client: Arc::new(HangingClient) as Arc<dyn InferenceClient>,
            policy: RetryPolicy {
                attempt_timeout: Duration::from_secs(5),
                ..RetryPolicy::default()
            },
        };

        let job = ctx.store.create("p", "i").await;
        process_job(&ctx, job.id).await.unwrap();

        let done = ctx.store.get(job.id).await.unwrap();
        assert_eq!(done.state, JobState::Failed);
        assert!(done.error.unwrap().contains("timed out"));
    }

    #[tokio::test]
    async fn duplicate_delivery_of_terminal_job_is_a_no_op() {
        let client = Arc::new(ScriptedClient::always_ok("once"));
        let (ctx, _cache) = context(Arc::clone(&client));

        let job = ctx.store.create("p", "i").await;
        process_job(&ctx, job.id).await.unwrap();
        ctx.store.get(job.id).await.unwrap();

        // Re-delivery after the terminal write: nothing changes. The cache
        // is warm, so even the lookup path would not call the provider.
        process_job(&ctx, job.id).await.unwrap();
        let done = ctx.store.get(job.id).await.unwrap();
        assert_eq!(done.state, JobState::Completed);
        assert_eq!(done.result.as_deref(), Some("once"));
        assert_eq!(client.call_count(), 1);
    }
}
