use axum::{Router, extract::State, response::Json, routing::get};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::dispatcher::{DispatchSnapshot, DispatchStats};
use crate::poller::{PollSnapshot, PollStats};
use crate::utils::error::Result;

#[derive(Clone)]
pub struct AppState {
    pub poll_stats: Arc<PollStats>,
    pub dispatch_stats: Arc<DispatchStats>,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(poll_stats: Arc<PollStats>, dispatch_stats: Arc<DispatchStats>) -> Self {
        Self {
            poll_stats,
            dispatch_stats,
            started_at: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: i64,
    pub poll: PollSnapshot,
    pub notifications: DispatchSnapshot,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/status", get(status))
        .layer(
            ServiceBuilder::new().layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                    .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
            ),
        )
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: (Utc::now() - state.started_at).num_seconds(),
        poll: state.poll_stats.snapshot(),
        notifications: state.dispatch_stats.snapshot(),
    })
}

/// Serve the router until `shutdown` turns true.
pub async fn serve(addr: &str, state: AppState, mut shutdown: watch::Receiver<bool>) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Health endpoint listening on {}", listener.local_addr()?);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(async move {
            while !*shutdown.borrow() {
                if shutdown.changed().await.is_err() {
                    break;
                }
            }
        })
        .await?;

    Ok(())
}
