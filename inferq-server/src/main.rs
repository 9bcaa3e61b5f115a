//! inferq server
//!
//! Entry point wiring configuration, the worker pool, and the HTTP gateway.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use inferq_cache::MemoryCache;
use inferq_client::{HttpClientConfig, HttpInferenceClient};
use inferq_job_queue::{JobStore, WorkQueue};
use inferq_server::state::AppState;
use inferq_server::tracing_setup::install_tracing_from_config;
use inferq_worker::{RetryPolicy, WorkerContext, WorkerPool};

#[derive(Debug, Parser)]
#[command(name = "inferq-server", about = "Asynchronous inference job service")]
struct CliArgs {
    /// Path to a JSON or TOML config file.
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // Resolve config path: CLI > environment variable.
    let config_path = args
        .config
        .or_else(|| std::env::var("INFERQ_CONFIG_PATH").ok());
    let config = inferq_config::load_config(config_path.as_deref())?;

    install_tracing_from_config(&config.logging);
    tracing::info!(
        workers = config.worker.count,
        model = %config.inference.model,
        "starting inferq server"
    );

    let store = JobStore::new();
    let queue = WorkQueue::new();

    let client = HttpInferenceClient::new(HttpClientConfig {
        base_url: config.inference.base_url.clone(),
        api_key: config.inference.api_key.clone(),
        model: config.inference.model.clone(),
        temperature: config.inference.temperature,
        max_tokens: config.inference.max_tokens,
    });

    let ctx = WorkerContext {
        store: store.clone(),
        cache: Arc::new(MemoryCache::new()),
        client: Arc::new(client),
        policy: RetryPolicy {
            max_attempts: config.retry.max_attempts,
            backoff_base: Duration::from_secs(config.retry.backoff_base_secs),
            attempt_timeout: Duration::from_secs(config.retry.attempt_timeout_secs),
        },
    };
    let pool = WorkerPool::spawn(config.worker.count, queue.clone(), ctx);

    let state = Arc::new(AppState::new(store, queue.clone()));
    let app = inferq_server::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        })
        .await?;

    // Stop intake, let in-flight jobs reach a terminal state.
    queue.close().await;
    pool.shutdown().await;

    Ok(())
}
