// src/main.rs
use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

use bluegreen_dashboard::{
    config::{self, DashboardConfig},
    dashboard::{Aggregator, Dashboard},
    endpoint::EndpointResolver,
    metrics::MetricsRegistry,
    probe::HttpServiceClient,
    render::{render_text, DisplayFrame},
    server::{RequestHandler, ServerBuilder},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("bluegreen_dashboard=debug".parse()?)
                .add_directive("hyper=info".parse()?),
        )
        .init();

    // Optional config file; DASHBOARD_* env vars apply either way
    let config_path = std::env::args().nth(1);
    match &config_path {
        Some(path) => info!("Loading configuration from: {}", path),
        None => info!("No config file given, using defaults and environment"),
    }
    let config = config::load_config(config_path.as_deref()).await?;

    let metrics_registry = Arc::new(MetricsRegistry::new()?);
    let metrics = metrics_registry.collector();

    let client = HttpServiceClient::new(config.poll.path.clone(), config.poll.timeout())
        .context("Failed to create HTTP client")?;
    let aggregator = Aggregator::new(Arc::new(client), config.poll.timeout())
        .with_metrics(metrics.clone());
    let dashboard = Arc::new(
        Dashboard::new(EndpointResolver::new(config.endpoints.clone()), aggregator)
            .with_metrics(metrics),
    );

    if !config.server.enabled {
        return run_once(&dashboard, &config).await;
    }

    // Initial poll cycle, as on first display
    {
        let dashboard = dashboard.clone();
        tokio::spawn(async move {
            dashboard.refresh().await;
        });
    }

    let handler = RequestHandler::new(dashboard, config.display.clone())
        .with_metrics(metrics_registry, &config.metrics);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server.host / server.port")?;

    ServerBuilder::new(addr)
        .with_handler(handler)
        .serve_with_shutdown(shutdown_signal())
        .await
}

async fn run_once(dashboard: &Dashboard, config: &DashboardConfig) -> Result<()> {
    let state = dashboard.refresh().await;
    let frame = DisplayFrame::new(
        &state,
        dashboard.endpoints(),
        &config.display,
        chrono::Local::now(),
    );
    print!("{}", render_text(&frame));
    Ok(())
}

// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
