//! Multi-namespace WebSocket fan-out (spec.md §4.5).
//!
//! Grounded on the teacher's `ConnectionManager` — a client registry behind
//! exclusive access, exposing `broadcast`/`join`/`leave` rather than an
//! actor with a command channel. Each namespace gets its own lock so a
//! broadcast on `/chat` never blocks a connect on `/alerts`; cross-namespace
//! relays acquire the target lock only after releasing the source one.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::sync::{mpsc, Mutex};
use tracing::{info, warn};
use uuid::Uuid;

pub const NAMESPACE_ALERTS: &str = "/alerts";
pub const NAMESPACE_CHAT: &str = "/chat";
pub const NAMESPACE_WIDGETS: &str = "/widgets";
pub const NAMESPACE_DASHBOARD: &str = "/dashboard";

const REQUIRED_NAMESPACES: [&str; 4] = [
    NAMESPACE_ALERTS,
    NAMESPACE_CHAT,
    NAMESPACE_WIDGETS,
    NAMESPACE_DASHBOARD,
];

/// One outbound frame, already serialized to the wire's `{event, payload}`
/// envelope.
pub type OutboundMessage = Value;

struct NamespaceState {
    clients: HashMap<Uuid, mpsc::UnboundedSender<OutboundMessage>>,
}

impl NamespaceState {
    fn new() -> Self {
        Self {
            clients: HashMap::new(),
        }
    }
}

/// Shared handle — cheap to clone, hands out `Arc`-backed namespace locks.
#[derive(Clone)]
pub struct Hub {
    namespaces: Arc<HashMap<&'static str, Mutex<NamespaceState>>>,
}

impl Hub {
    pub fn new() -> Self {
        let mut namespaces = HashMap::new();
        for ns in REQUIRED_NAMESPACES {
            namespaces.insert(ns, Mutex::new(NamespaceState::new()));
        }
        Self {
            namespaces: Arc::new(namespaces),
        }
    }

    pub fn namespaces(&self) -> &'static [&'static str] {
        &REQUIRED_NAMESPACES
    }

    /// Registers a new connection, sends it the `welcome` message (spec.md
    /// §4.5 contract step 1), and returns its assigned socket id plus the
    /// receiving half of its outbound queue.
    pub async fn connect(
        &self,
        namespace: &'static str,
        label: &str,
    ) -> (Uuid, mpsc::UnboundedReceiver<OutboundMessage>) {
        let socket_id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();

        let count = {
            let mut state = self.lock(namespace).await;
            state.clients.insert(socket_id, tx.clone());
            state.clients.len()
        };

        info!(namespace, %socket_id, count, "client connected");

        let welcome = json!({
            "event": "welcome",
            "payload": {
                "namespace": namespace,
                "socketId": socket_id,
                "connectedClients": count,
                "serverTime": streamforge_core::time::to_canonical(streamforge_core::time::now()),
                "label": label,
            }
        });
        // The welcome frame is addressed only to the connecting socket — it
        // is pushed directly onto its own sender rather than broadcast.
        let _ = tx.send(welcome);

        (socket_id, rx)
    }

    /// Decrements the namespace count, floored at zero by construction
    /// (removing an absent key is a no-op), and logs the reason.
    pub async fn disconnect(&self, namespace: &'static str, socket_id: Uuid, reason: &str) {
        let count = {
            let mut state = self.lock(namespace).await;
            state.clients.remove(&socket_id);
            state.clients.len()
        };
        info!(namespace, %socket_id, reason, count, "client disconnected");
    }

    pub async fn client_count(&self, namespace: &str) -> usize {
        match self.namespaces.get(namespace) {
            Some(state) => state.lock().await.clients.len(),
            None => 0,
        }
    }

    pub async fn counts(&self) -> HashMap<&'static str, usize> {
        let mut out = HashMap::new();
        for ns in REQUIRED_NAMESPACES {
            out.insert(ns, self.client_count(ns).await);
        }
        out
    }

    /// Sends `event`/`payload` to every connected client on `namespace`.
    /// If nobody is connected this is a silent no-op — callers that need to
    /// warn on an empty namespace (the alert queue) check the count first.
    pub async fn broadcast(&self, namespace: &str, event: &str, payload: Value) {
        let Some(state) = self.namespaces.get(namespace) else {
            warn!(namespace, "broadcast to unknown namespace dropped");
            return;
        };

        let frame = json!({ "event": event, "payload": payload });
        let state = state.lock().await;
        for sender in state.clients.values() {
            let _ = sender.send(frame.clone());
        }
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}

impl Hub {
    fn lock(&self, namespace: &str) -> impl std::future::Future<Output = tokio::sync::MutexGuard<'_, NamespaceState>> {
        self.namespaces
            .get(namespace)
            .expect("namespace must be one of the required namespaces")
            .lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_increments_count_and_sends_welcome_only_to_that_socket() {
        let hub = Hub::new();
        let (id_a, mut rx_a) = hub.connect(NAMESPACE_ALERTS, "overlay").await;
        assert_eq!(hub.client_count(NAMESPACE_ALERTS).await, 1);

        let welcome = rx_a.try_recv().expect("welcome frame");
        assert_eq!(welcome["event"], "welcome");
        assert_eq!(welcome["payload"]["socketId"], id_a.to_string());

        let (_id_b, mut rx_b) = hub.connect(NAMESPACE_ALERTS, "overlay").await;
        assert_eq!(hub.client_count(NAMESPACE_ALERTS).await, 2);
        // The second connection's welcome goes only to it, not to the first.
        assert!(rx_a.try_recv().is_err());
        assert!(rx_b.try_recv().is_ok());
    }

    #[tokio::test]
    async fn disconnect_decrements_count() {
        let hub = Hub::new();
        let (id, _rx) = hub.connect(NAMESPACE_CHAT, "overlay").await;
        assert_eq!(hub.client_count(NAMESPACE_CHAT).await, 1);
        hub.disconnect(NAMESPACE_CHAT, id, "closed").await;
        assert_eq!(hub.client_count(NAMESPACE_CHAT).await, 0);
    }

    #[tokio::test]
    async fn broadcast_reaches_every_connected_client_on_the_namespace_only() {
        let hub = Hub::new();
        let (_id_a, mut rx_a) = hub.connect(NAMESPACE_WIDGETS, "overlay").await;
        let (_id_b, mut rx_b) = hub.connect(NAMESPACE_WIDGETS, "overlay").await;
        let (_id_c, mut rx_c) = hub.connect(NAMESPACE_CHAT, "overlay").await;
        // Drain welcomes.
        rx_a.try_recv().unwrap();
        rx_b.try_recv().unwrap();
        rx_c.try_recv().unwrap();

        hub.broadcast(NAMESPACE_WIDGETS, "config:changed", json!({"k": "v"}))
            .await;

        let frame_a = rx_a.try_recv().unwrap();
        let frame_b = rx_b.try_recv().unwrap();
        assert_eq!(frame_a["event"], "config:changed");
        assert_eq!(frame_b["event"], "config:changed");
        assert!(rx_c.try_recv().is_err());
    }

    #[tokio::test]
    async fn disconnect_floors_at_zero_for_an_already_removed_socket() {
        let hub = Hub::new();
        let (id, _rx) = hub.connect(NAMESPACE_DASHBOARD, "overlay").await;
        hub.disconnect(NAMESPACE_DASHBOARD, id, "closed").await;
        hub.disconnect(NAMESPACE_DASHBOARD, id, "closed again").await;
        assert_eq!(hub.client_count(NAMESPACE_DASHBOARD).await, 0);
    }
}
