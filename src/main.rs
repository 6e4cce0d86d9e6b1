#![forbid(unsafe_code)]

//! `groupme-bridge` — Discord to GroupMe relay binary.
//!
//! Bootstraps configuration, starts the Discord Gateway feed, the serial
//! event router, and the health endpoint.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use tokio::sync::{mpsc, watch};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use groupme_bridge::config::GlobalConfig;
use groupme_bridge::discord::gateway;
use groupme_bridge::health::{self, BridgeStatus};
use groupme_bridge::relay::router::EventRouter;
use groupme_bridge::{AppError, Result};

/// Buffered capacity of the inbound event channel.
const EVENT_QUEUE_CAPACITY: usize = 256;

#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "groupme-bridge", about = "Discord to GroupMe relay bot", version, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long)]
    config: PathBuf,

    /// Log output format (text or json).
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.log_format)?;
    info!("groupme-bridge bootstrap");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::Config(format!("failed to build tokio runtime: {err}")))?
        .block_on(run(args))
}

async fn run(args: Cli) -> Result<()> {
    // ── Load configuration ──────────────────────────────
    let mut config = GlobalConfig::load_from_path(&args.config)?;
    config.load_credentials()?;
    let config = Arc::new(config);
    info!(
        channel = %config.discord.channel_id,
        image_support = config.image_support(),
        reactions = config.reactions_enabled(),
        "configuration loaded"
    );

    // ── Shared status for the health endpoint ───────────
    let status = Arc::new(BridgeStatus::from_config(&config));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Start health server ─────────────────────────────
    let health_status = Arc::clone(&status);
    let health_shutdown = shutdown_rx.clone();
    let health_port = config.http_port;
    let health_handle = tokio::spawn(async move {
        if let Err(err) = health::serve(health_status, health_port, health_shutdown).await {
            error!(%err, "health server failed");
        }
    });

    // ── Start gateway feed and router ───────────────────
    let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
    let gateway_handle = gateway::spawn(
        config.discord.clone(),
        event_tx,
        Arc::clone(&status),
        shutdown_rx.clone(),
    );

    let router = EventRouter::new(Arc::clone(&config));
    let router_shutdown = shutdown_rx.clone();
    let router_handle = tokio::spawn(async move {
        router.run(event_rx, router_shutdown).await;
    });

    info!("bridge ready; monitoring channel {}", config.discord.channel_id);

    // ── Wait for shutdown signal ────────────────────────
    shutdown_signal().await;
    info!("shutdown signal received");
    status.set_ready(false);
    let _ = shutdown_tx.send(true);

    let _ = tokio::join!(gateway_handle, router_handle, health_handle);
    info!("groupme-bridge shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(err) => {
                tracing::warn!(%err, "failed to register SIGTERM handler, using ctrl-c only");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(err) = ctrl_c.await {
            tracing::error!(%err, "ctrl-c signal handler failed");
        }
    }
}

fn init_tracing(log_format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(env_filter);

    match log_format {
        LogFormat::Text => subscriber
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
        LogFormat::Json => subscriber
            .json()
            .try_init()
            .map_err(|err| AppError::Config(format!("failed to init tracing: {err}")))?,
    }

    Ok(())
}
