//! HTTP health endpoint.
//!
//! Runs on its own task and only reads process-wide status; it must never
//! block or be blocked by the event-processing path. No authentication,
//! read-only.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::extract::State;
use axum::routing::get;
use axum::Json;
use serde_json::{json, Value};
use tokio::sync::watch;
use tracing::info;

use crate::config::GlobalConfig;
use crate::{AppError, Result};

/// Process-wide readiness and feature flags, shared with the health task.
#[derive(Debug)]
pub struct BridgeStatus {
    ready: AtomicBool,
    started_at: Instant,
    image_support: bool,
    reactions: bool,
    threading: bool,
}

impl BridgeStatus {
    /// Derive feature flags from the loaded configuration.
    #[must_use]
    pub fn from_config(config: &GlobalConfig) -> Self {
        Self {
            ready: AtomicBool::new(false),
            started_at: Instant::now(),
            image_support: config.image_support(),
            reactions: config.reactions_enabled(),
            threading: true,
        }
    }

    /// Mark the bridge ready once the gateway connection is up.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Relaxed);
    }

    /// Whether the bridge is connected and relaying.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }

    /// Seconds elapsed since process start.
    #[must_use]
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

/// Handler for `GET /` and `GET /health`.
async fn health(State(status): State<Arc<BridgeStatus>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "bot_ready": status.is_ready(),
        "uptime": status.uptime_seconds(),
        "features": {
            "image_support": status.image_support,
            "reactions": status.reactions,
            "threading": status.threading,
        },
    }))
}

/// Serve the health endpoint on `port` until shutdown.
///
/// # Errors
///
/// Returns `AppError::Config` if the listener fails to bind or the server
/// errors out.
pub async fn serve(
    status: Arc<BridgeStatus>,
    port: u16,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let bind = SocketAddr::from(([0, 0, 0, 0], port));
    let router = axum::Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .with_state(status);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|err| AppError::Config(format!("failed to bind health server on {bind}: {err}")))?;

    info!(%bind, "health server started");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown.wait_for(|stop| *stop).await;
        })
        .await
        .map_err(|err| AppError::Config(format!("health server error: {err}")))?;

    info!("health server shut down");
    Ok(())
}
