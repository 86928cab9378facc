// palliative-rx server entry point
//
// Usage: palliative-rx [serve|seed|scan] [--database PATH] [--port PORT]

use anyhow::Context;
use clap::Parser;
use palliative_rx_core::InventoryMonitor;
use palliative_rx_server::config::{Cli, Command, DEFAULT_LOG_FILTER};
use palliative_rx_server::{app, worker, AppState};
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut db = cli
        .open_database()
        .with_context(|| format!("failed to open database {}", cli.database.display()))?;
    let monitor = InventoryMonitor::new(cli.monitor_settings());

    match cli.command() {
        Command::Seed => {
            let summary = db.seed().context("failed to seed database")?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Command::Scan => {
            let report = monitor.run(&mut db).context("inventory scan failed")?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Serve => serve(&cli, AppState::new(db, monitor)).await?,
    }

    Ok(())
}

async fn serve(cli: &Cli, state: AppState) -> anyhow::Result<()> {
    tracing::info!("Configuration:");
    tracing::info!("  DATABASE: {}", cli.database.display());
    tracing::info!("  STATIC_DIR: {}", cli.static_dir.display());
    tracing::info!("  EXPIRY_WARNING_DAYS: {}", cli.expiry_warning_days);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let monitor_task = if cli.no_worker {
        tracing::info!("Inventory monitor disabled");
        None
    } else {
        Some(worker::spawn(state.clone(), cli.worker_interval(), shutdown_rx))
    };

    let router = app(state, &cli.static_dir);
    let listener = tokio::net::TcpListener::bind((cli.host.as_str(), cli.port))
        .await
        .with_context(|| format!("failed to bind {}:{}", cli.host, cli.port))?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Shutting down");
    let _ = shutdown_tx.send(true);
    if let Some(task) = monitor_task {
        task.await.context("inventory monitor task failed")?;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
