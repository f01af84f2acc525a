//! Dojo example server binary
//!
//! Serves one example agent over AG-UI.

use anyhow::Context;
use clap::Parser;
use dojo_server::{bootstrap, logging, Example, ServerConfig};

#[derive(Debug, Parser)]
#[command(name = "dojo-server", version, about = "Serve an example agent over AG-UI")]
struct Cli {
    /// Example agent to serve
    #[arg(long, value_enum, env = "DOJO_EXAMPLE", default_value_t = Example::Langgraph)]
    example: Example,

    /// Listen address (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Listen port (overrides PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is loaded before the CLI so DOJO_EXAMPLE can come from it
    let dotenv = dotenvy::dotenv();
    let cli = Cli::parse();

    logging::init_tracing(cli.example).context("failed to initialise logging")?;
    match dotenv {
        Ok(path) => tracing::info!("Loaded environment variables from: {}", path.display()),
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!("Failed to load .env file: {}", e),
    }

    let mut config = ServerConfig::from_env(cli.example);
    if let Some(host) = cli.host {
        config = config.with_host(host);
    }
    if let Some(port) = cli.port {
        config = config.with_port(port);
    }
    tracing::info!(
        example = %config.example,
        persistence = ?config.persistence,
        "configuration loaded"
    );

    let addr = config.socket_addr()?;
    let app = bootstrap::build_app(&config).context("failed to build agent")?;

    tracing::info!("Starting dojo server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Dojo server shut down gracefully");
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for CTRL-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received CTRL-C signal, shutting down");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, shutting down");
        }
    }
}
