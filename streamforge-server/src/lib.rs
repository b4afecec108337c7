//! The StreamForge sidecar event server: HTTP/WebSocket surface, the alert
//! queue, and the embedded config store. Split into a library so
//! integration tests can assemble an `AppState` without going through
//! `main`.

pub mod app_state;
pub mod config;
pub mod errors;
pub mod hub;
pub mod http;
pub mod lifecycle;
pub mod queue;
pub mod repository;
pub mod store;

use std::sync::atomic::AtomicU16;
use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;

use app_state::AppState;
use config::ServerConfig;
use hub::Hub;
use queue::AlertQueue;
use repository::ConfigRepository;
use store::Store;

/// Builds the full application state: opens the store, runs migrations,
/// wires the hub and the alert queue actor. Returns the state plus the
/// queue actor's join handle so the caller can await it during shutdown.
pub async fn build(store: Store, config: ServerConfig) -> (AppState, JoinHandle<()>) {
    let repository = ConfigRepository::new(store);
    let hub = Hub::new();
    let (queue_handle, queue_join) = AlertQueue::spawn(repository.clone(), hub.clone());

    let state = AppState {
        repository,
        hub,
        queue: queue_handle,
        config: Arc::new(config),
        started_at: Instant::now(),
        bound_port: Arc::new(AtomicU16::new(0)),
    };

    (state, queue_join)
}
