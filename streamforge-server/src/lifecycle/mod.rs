//! Port discovery, the `SERVER_PORT=<n>` interop contract, and graceful
//! shutdown (spec.md §4.7).

use std::time::Duration;

use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::ServerConfig;

/// Binds the preferred port if free, otherwise scans the configured range,
/// otherwise falls back to an OS-assigned port (spec.md §4.7 "Port discovery").
pub async fn bind(config: &ServerConfig) -> std::io::Result<TcpListener> {
    let loopback = std::net::Ipv4Addr::LOCALHOST;

    if let Ok(listener) = TcpListener::bind((loopback, config.preferred_port)).await {
        return Ok(listener);
    }

    let (min, max) = config.port_range;
    for port in min..=max {
        if port == config.preferred_port {
            continue;
        }
        if let Ok(listener) = TcpListener::bind((loopback, port)).await {
            return Ok(listener);
        }
    }

    warn!("no preferred or ranged port available, requesting an OS-assigned port");
    TcpListener::bind((loopback, 0)).await
}

/// Writes the sole machine-readable interop line. Must be the first thing
/// written to stdout, before the server starts accepting traffic.
pub fn announce_port(port: u16) {
    println!("SERVER_PORT={port}");
}

/// Resolves once SIGINT or SIGTERM (or the Windows Ctrl-C equivalent) is
/// received. Intended as axum's `with_graceful_shutdown` future.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received SIGINT, shutting down"),
        _ = terminate => info!("received SIGTERM, shutting down"),
    }
}

/// Upper bound on the drain period before force-exit (spec.md §4.7).
pub const GRACEFUL_DRAIN: Duration = Duration::from_secs(5);
