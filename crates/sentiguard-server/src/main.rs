//! SentiGuard Server
//!
//! HTTP API for parental comment monitoring: account signup and login,
//! child-account subscriptions, on-demand and scheduled ingestion, and
//! toxic-comment review.

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use tokio::signal;
use tokio::sync::watch;
use tracing::{info, warn};

mod auth;
mod config;
mod routes;
mod scheduler;
mod state;

use config::ServerConfig;
use state::AppState;

#[derive(Parser, Debug)]
#[command(name = "sentiguard-server")]
#[command(about = "SentiGuard comment monitoring server", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// JSONL journal path (overrides config)
    #[arg(short, long)]
    journal: Option<String>,

    /// Monitored-account pool file (overrides config)
    #[arg(short, long)]
    accounts: Option<String>,

    /// Dashboard base URL used in alert emails (overrides config)
    #[arg(short, long)]
    dashboard_url: Option<String>,

    /// Listen address
    #[arg(short = 'l', long, default_value = "0.0.0.0")]
    listen: String,

    /// Listen port
    #[arg(short = 'P', long, default_value = "8080")]
    port: u16,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    info!("Starting SentiGuard server");

    let config = ServerConfig::load(&cli.config, &cli)?;
    info!("Configuration loaded successfully");
    info!("Dashboard URL: {}", config.dashboard_url);
    info!(
        "Journal: {}",
        config.journal_path.as_deref().unwrap_or("(in-memory)")
    );

    let metrics_handle = init_metrics()?;

    let state = AppState::new(&config, metrics_handle)?;

    // Scheduler shares the engine and stops on the same shutdown signal
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let sweeper = tokio::spawn(scheduler::run(
        state.engine.clone(),
        state.store.clone(),
        config.sweep_interval_secs,
        shutdown_rx,
    ));

    let addr: SocketAddr = format!("{}:{}", cli.listen, cli.port).parse()?;
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    let shutdown = async move {
        shutdown_signal().await;
        warn!("Shutdown signal received, stopping server...");
        let _ = shutdown_tx.send(true);
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    let _ = sweeper.await;
    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug,hyper=info,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "sentiguard_comments_ingested_total",
        "Comments stored for the first time"
    );
    metrics::describe_counter!(
        "sentiguard_toxic_comments_total",
        "Newly stored comments labeled toxic"
    );
    metrics::describe_counter!(
        "sentiguard_upstream_errors_total",
        "Failed social graph API calls"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
