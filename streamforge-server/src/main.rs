use std::sync::atomic::Ordering;

use streamforge_server::{config::ServerConfig, http, lifecycle, store::Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();
    let store = Store::open_default().await?;
    let (state, queue_join) = streamforge_server::build(store, config.clone()).await;

    let listener = lifecycle::bind(&config).await?;
    let port = listener.local_addr()?.port();
    state.bound_port.store(port, Ordering::Relaxed);

    lifecycle::announce_port(port);
    tracing::info!(port, "streamforge-server listening");

    let router = http::build_router(state.clone());

    let serve = axum::serve(listener, router).with_graceful_shutdown(lifecycle::shutdown_signal());

    // spec.md §4.7: once the shutdown signal fires, allow up to 5s for
    // in-flight responses to drain, then force-exit rather than hang.
    let watchdog = async {
        lifecycle::shutdown_signal().await;
        tokio::time::sleep(lifecycle::GRACEFUL_DRAIN).await;
    };

    tokio::select! {
        result = serve => {
            if let Err(err) = result {
                tracing::error!(%err, "server exited with error");
            }
        }
        _ = watchdog => {
            tracing::warn!("graceful drain period elapsed, forcing exit");
        }
    }

    state.repository.store().close().await;
    queue_join.abort();

    Ok(())
}
