//! HTTP server runner
//!
//! Serves the router with graceful shutdown driven by a cancellation token.

use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Default port for the HTTP server
pub const DEFAULT_HTTP_PORT: u16 = 5080;

/// Configuration for the HTTP server
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Address to bind to (e.g., "127.0.0.1:5080")
    pub bind: SocketAddr,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], DEFAULT_HTTP_PORT)),
        }
    }
}

impl HttpConfig {
    pub fn new(bind: SocketAddr) -> Self {
        Self { bind }
    }

    /// Create config from host and port strings
    pub fn from_host_port(host: &str, port: u16) -> Result<Self, std::net::AddrParseError> {
        let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
        Ok(Self::new(addr))
    }
}

/// Start serving `router` in the background
///
/// Returns the bound address (useful with port 0) and a token that stops the
/// server when cancelled.
pub async fn run_http(
    router: Router,
    config: HttpConfig,
) -> anyhow::Result<(SocketAddr, CancellationToken)> {
    let listener = TcpListener::bind(config.bind).await?;
    let addr = listener.local_addr()?;
    info!("HTTP server listening on http://{}", addr);

    let ct = CancellationToken::new();
    let shutdown = ct.clone();
    tokio::spawn(async move {
        let result = axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.clone().cancelled_owned())
            .await;
        if let Err(e) = result {
            error!(error = %e, "HTTP server failed");
        }
        shutdown.cancel();
    });

    Ok((addr, ct))
}

/// Serve `router` until Ctrl+C
pub async fn run_http_blocking(router: Router, config: HttpConfig) -> anyhow::Result<()> {
    let (_, ct) = run_http(router, config).await?;

    info!("Press Ctrl+C to stop the server");

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
        _ = ct.cancelled() => {
            info!("Server cancelled");
        }
    }

    ct.cancel();

    info!("HTTP server stopped");
    Ok(())
}
