use std::sync::Arc;
use std::time::Instant;

use crate::config::ServerConfig;
use crate::hub::Hub;
use crate::queue::AlertQueueHandle;
use crate::repository::ConfigRepository;

/// Shared application state handed to every axum handler, grounded on the
/// teacher's `AppState` (infra/app_state.rs): one bundle of cheap-to-clone
/// handles, passed via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub repository: ConfigRepository,
    pub hub: Hub,
    pub queue: AlertQueueHandle,
    pub config: Arc<ServerConfig>,
    pub started_at: Instant,
    pub bound_port: Arc<std::sync::atomic::AtomicU16>,
}

impl AppState {
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn port(&self) -> u16 {
        self.bound_port.load(std::sync::atomic::Ordering::Relaxed)
    }
}
