//! CML Lab Builder MCP server entry point.
//!
//! ## Transport Modes
//!
//! - **stdio** (default): for local AI tools (Claude Desktop, Cursor)
//! - **http**: Streamable HTTP only
//! - **both**: stdio + HTTP simultaneously

use cml_mcp::{http, CmlMcpConfig, CmlServer, TransportMode};
use rmcp::transport::stdio;
use rmcp::ServiceExt;
use tokio::signal;
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let dotenv = dotenvy::dotenv();

    // Logs go to stderr (stdout is MCP transport)
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("cml_mcp=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting CML Lab Builder MCP Server");
    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "Loaded .env");
    }

    let config = CmlMcpConfig::from_env();
    tracing::info!(?config, "Configuration loaded");
    config.validate_warn();

    let server = CmlServer::new(config.clone());
    server.initialize_from_config().await;

    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let mut handles = Vec::new();

    if config.transport_mode.http_enabled() {
        let http_server = server.clone();
        let http_addr = config.http_addr;
        let mut shutdown_rx = shutdown_tx.subscribe();

        handles.push(tokio::spawn(async move {
            let shutdown = async move {
                let _ = shutdown_rx.recv().await;
            };

            if let Err(e) = http::serve(http_server, http_addr, shutdown).await {
                tracing::error!(error = %e, "HTTP server error");
            }
        }));
        tracing::info!(addr = %config.http_addr, "HTTP transport enabled");
    }

    // Resolves when the stdio peer disconnects, so stdio-only mode can exit
    let (stdio_done_tx, mut stdio_done_rx) = tokio::sync::oneshot::channel::<()>();

    if config.transport_mode.stdio_enabled() {
        let stdio_server = server.clone();
        let mut shutdown_rx = shutdown_tx.subscribe();

        handles.push(tokio::spawn(async move {
            match stdio_server.serve(stdio()).await {
                Ok(service) => {
                    tokio::select! {
                        result = service.waiting() => {
                            if let Err(e) = result {
                                tracing::error!(error = %e, "Stdio service error");
                            }
                            tracing::info!("Stdio client disconnected");
                        }
                        _ = shutdown_rx.recv() => {
                            tracing::info!("Stdio transport shutting down");
                        }
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to start stdio transport");
                }
            }
            let _ = stdio_done_tx.send(());
        }));
        tracing::info!("Stdio transport enabled");
    }

    match config.transport_mode {
        TransportMode::Both => {
            tracing::info!(http_addr = %config.http_addr, "Server ready (stdio + HTTP)")
        }
        TransportMode::Http => {
            tracing::info!(http_addr = %config.http_addr, "Server ready (HTTP only)")
        }
        TransportMode::Stdio => tracing::info!("Server ready (stdio only)"),
    }

    if config.transport_mode == TransportMode::Stdio {
        tokio::select! {
            _ = &mut stdio_done_rx => {}
            result = signal::ctrl_c() => result?,
        }
    } else {
        signal::ctrl_c().await?;
    }
    tracing::info!("Shutting down");

    let _ = shutdown_tx.send(());
    for handle in handles {
        let _ = handle.await;
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}
