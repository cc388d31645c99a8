//! `perf-dashboard` - live performance dashboard.
//!
//! # Usage
//!
//! ```bash
//! perf-dashboard --input data/sample_performance.csv --port 8080
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log filter (overrides `observability.logging.level`)
//! - Any `${VAR}` referenced by the YAML config

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use perf_analytics::config::load_config;
use perf_analytics::telemetry::{init_tracing, load_dotenv};
use perf_dashboard::{DashboardContext, DashboardServer, Poller, ServerState, init_metrics};

/// Time allowed for the poller and server to stop after a shutdown signal.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "perf-dashboard")]
#[command(about = "Live rolling performance dashboard", long_about = None)]
#[command(version)]
struct Cli {
    /// Input CSV (defaults to source.path from the config)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// HTTP port (defaults to dashboard.port from the config)
    #[arg(short, long)]
    port: Option<u16>,

    /// YAML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Poll interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref()).context("failed to load configuration")?;
    init_tracing(&config.observability.logging);

    if let Some(input) = cli.input {
        config.source.path = input.to_string_lossy().into_owned();
    }
    if let Some(port) = cli.port {
        config.dashboard.port = port;
    }
    if let Some(interval_ms) = cli.interval_ms {
        anyhow::ensure!(interval_ms > 0, "--interval-ms must be positive");
        config.dashboard.refresh_interval_ms = interval_ms;
    }

    let addr: SocketAddr = format!("{}:{}", config.dashboard.bind_address, config.dashboard.port)
        .parse()
        .with_context(|| {
            format!(
                "invalid bind address {}:{}",
                config.dashboard.bind_address, config.dashboard.port
            )
        })?;

    let _metrics_handle = init_metrics().context("failed to install metrics recorder")?;

    let context = Arc::new(
        DashboardContext::from_config(config).context("invalid metrics configuration")?,
    );
    tracing::info!(
        source = %context.source_description(),
        interval_ms = context.config().dashboard.refresh_interval_ms,
        window = context.config().metrics.window,
        "Starting performance dashboard"
    );

    let shutdown_token = CancellationToken::new();

    let (poller, state_rx) = Poller::new(Arc::clone(&context), shutdown_token.clone());
    let poller_handle = tokio::spawn(poller.run());

    let server_state = Arc::new(ServerState::new(
        env!("CARGO_PKG_VERSION").to_string(),
        &context,
        state_rx,
    ));
    let server = DashboardServer::new(addr, server_state, shutdown_token.clone());
    let mut server_handle = tokio::spawn(server.run());

    tokio::select! {
        () = shutdown_signal() => {}
        result = &mut server_handle => {
            shutdown_token.cancel();
            result.context("dashboard server task panicked")??;
            return Ok(());
        }
    }

    shutdown_token.cancel();
    tracing::info!(
        timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
        "Waiting for tasks to stop"
    );

    let drained = tokio::time::timeout(SHUTDOWN_TIMEOUT, async {
        let _ = poller_handle.await;
        server_handle.await
    })
    .await;

    match drained {
        Ok(Ok(result)) => result?,
        Ok(Err(e)) => tracing::error!(error = %e, "Dashboard server task panicked"),
        Err(_) => tracing::warn!("Shutdown timed out"),
    }

    tracing::info!("Dashboard stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
