//! HTTP gateway for the inferq service.
//!
//! Pure plumbing: validates submissions, hands them to the core (store +
//! queue), and reads job records back for pollers. All processing lives in
//! [`inferq_worker`].

use std::sync::Arc;

use axum::extract::Extension;
use axum::routing::{get, post};
use axum::Router;

pub mod error;
pub mod handlers;
pub mod state;
pub mod tracing_setup;

use state::AppState;

/// Build the API router over the given state.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/v1/analyze", post(handlers::analyze::submit))
        .route("/api/v1/results/{id}", get(handlers::results::get))
        .route("/api/v1/jobs", get(handlers::jobs::list))
        .layer(Extension(state))
}
