//! Single-consumer FIFO alert scheduler (spec.md §4.4).
//!
//! Grounded on the teacher's `JobQueue`/`JobQueueHandle` split: a single
//! task owns all mutable state and is driven exclusively through a command
//! channel, so every operation is serialized without an explicit lock.

use std::collections::VecDeque;
use std::time::Duration;

use serde_json::json;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use streamforge_core::{resolve, AlertInstance, AlertSpec, StreamForgeError, TriggerFacts};

use crate::hub::{Hub, NAMESPACE_ALERTS};
use crate::repository::ConfigRepository;

/// Buffer added on top of `duration_ms` before the fallback timer fires
/// (spec.md §4.4 step 4, GLOSSARY "Fallback timer").
const FALLBACK_BUFFER_MS: u64 = 1_000;

enum Command {
    Enqueue {
        facts: TriggerFacts,
        reply: oneshot::Sender<streamforge_core::Result<Option<Uuid>>>,
    },
    Complete {
        instance_id: Option<Uuid>,
    },
    Length {
        reply: oneshot::Sender<usize>,
    },
    Clear {
        reply: oneshot::Sender<usize>,
    },
    /// Sent by a fallback timer task; ignored if `instance_id` is no longer
    /// current (it already completed via ack, and the timer simply lost the
    /// abort race).
    FallbackFired {
        instance_id: Uuid,
    },
}

/// Cloneable front for the queue actor.
#[derive(Clone)]
pub struct AlertQueueHandle {
    sender: mpsc::UnboundedSender<Command>,
}

impl AlertQueueHandle {
    /// Validates, resolves, and appends `facts` to the queue. Returns the
    /// assigned instance id, or `None` if the submitted facts do not
    /// resolve to a playable instance. Errors are reserved for submitter
    /// mistakes that warrant an HTTP 400 up the call stack.
    pub async fn enqueue(&self, facts: TriggerFacts) -> streamforge_core::Result<Option<Uuid>> {
        let (reply, rx) = oneshot::channel();
        self.sender
            .send(Command::Enqueue { facts, reply })
            .map_err(|_| StreamForgeError::internal("alert queue actor is gone"))?;
        rx.await
            .map_err(|_| StreamForgeError::internal("alert queue actor dropped the reply"))?
    }

    pub async fn complete(&self, instance_id: Option<Uuid>) {
        let _ = self.sender.send(Command::Complete { instance_id });
    }

    pub async fn length(&self) -> usize {
        let (reply, rx) = oneshot::channel();
        if self.sender.send(Command::Length { reply }).is_err() {
            return 0;
        }
        rx.await.unwrap_or(0)
    }

    pub async fn clear(&self) -> usize {
        let (reply, rx) = oneshot::channel();
        if self.sender.send(Command::Clear { reply }).is_err() {
            return 0;
        }
        rx.await.unwrap_or(0)
    }
}

/// Owns the queue state; runs for the lifetime of the server as a spawned
/// task driven by `run`.
pub struct AlertQueue {
    receiver: mpsc::UnboundedReceiver<Command>,
    fallback_sender: mpsc::UnboundedSender<Command>,
    repository: ConfigRepository,
    hub: Hub,
    queue: VecDeque<AlertInstance>,
    current: Option<AlertInstance>,
    processing: bool,
    fallback_handle: Option<JoinHandle<()>>,
}

impl AlertQueue {
    pub fn spawn(repository: ConfigRepository, hub: Hub) -> (AlertQueueHandle, JoinHandle<()>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let actor = Self {
            receiver,
            fallback_sender: sender.clone(),
            repository,
            hub,
            queue: VecDeque::new(),
            current: None,
            processing: false,
            fallback_handle: None,
        };
        let join = tokio::spawn(actor.run());
        (AlertQueueHandle { sender }, join)
    }

    async fn run(mut self) {
        while let Some(command) = self.receiver.recv().await {
            match command {
                Command::Enqueue { facts, reply } => {
                    let result = self.handle_enqueue(facts).await;
                    let _ = reply.send(result);
                }
                Command::Complete { instance_id } => self.handle_complete(instance_id).await,
                Command::Length { reply } => {
                    let _ = reply.send(self.queue.len());
                }
                Command::Clear { reply } => {
                    let cleared = self.queue.len();
                    self.queue.clear();
                    let _ = reply.send(cleared);
                }
                Command::FallbackFired { instance_id } => {
                    if self.current.as_ref().map(|c| c.id) == Some(instance_id) {
                        warn!(%instance_id, "fallback timer fired, treating as completed");
                        self.finish_current();
                        self.advance().await;
                    }
                }
            }
        }
    }

    async fn handle_enqueue(
        &mut self,
        facts: TriggerFacts,
    ) -> streamforge_core::Result<Option<Uuid>> {
        let event_type = facts
            .event_type
            .ok_or_else(|| StreamForgeError::validation("missing required field: type"))?;
        let username = facts
            .username
            .clone()
            .ok_or_else(|| StreamForgeError::validation("missing required field: username"))?;

        let candidates = self.repository.list_resolver_candidates(event_type).await?;
        let resolved = resolve(&candidates, &facts);

        // spec.md §8 scenario S3: a resolver miss (no enabled Alert passes its
        // min_amount gate, or none configured at all) means no alert plays —
        // the caller gets `None` back and nothing is appended to the queue.
        let Some(resolved) = resolved else {
            return Ok(None);
        };
        let spec = apply_explicit_overrides(resolved.spec, &facts);
        let source_alert_id = Some(resolved.source_alert_id);

        let instance_id = facts.instance_id.unwrap_or_else(Uuid::new_v4);
        let message = render_message(&spec.message_template, &username, &facts);

        let instance = AlertInstance {
            id: instance_id,
            alert_config_id: source_alert_id,
            event_type,
            username,
            display_name: facts.display_name,
            amount: facts.amount,
            message,
            config: spec,
            timestamp: streamforge_core::time::now(),
        };

        self.queue.push_back(instance);

        if !self.processing {
            self.advance().await;
        }

        Ok(Some(instance_id))
    }

    async fn handle_complete(&mut self, instance_id: Option<Uuid>) {
        let Some(current) = &self.current else {
            info!("complete received with no current instance, ignoring");
            return;
        };
        if let Some(id) = instance_id {
            if id != current.id {
                warn!(%id, current = %current.id, "stale completion ack ignored");
                return;
            }
        }
        self.finish_current();
        self.advance().await;
    }

    fn finish_current(&mut self) {
        self.current = None;
        self.processing = false;
        if let Some(handle) = self.fallback_handle.take() {
            handle.abort();
        }
    }

    /// Advance protocol (spec.md §4.4).
    async fn advance(&mut self) {
        if self.processing {
            return;
        }
        let Some(next) = self.queue.pop_front() else {
            return;
        };

        self.processing = true;
        let duration_ms = next.config.duration_ms;
        let instance_id = next.id;

        let connected = self.hub.client_count(NAMESPACE_ALERTS).await;
        if connected == 0 {
            warn!(%instance_id, "no /alerts clients connected, relying on fallback timer");
        }

        self.hub
            .broadcast(NAMESPACE_ALERTS, "alert:trigger", json!(next))
            .await;
        self.current = Some(next);
        // `processing` stays true for the whole playback window — it is
        // cleared in `finish_current` on ack or fallback timeout, not here.

        let fallback_delay = Duration::from_millis(duration_ms as u64 + FALLBACK_BUFFER_MS);
        let sender = self.fallback_sender.clone();
        self.fallback_handle = Some(tokio::spawn(async move {
            tokio::time::sleep(fallback_delay).await;
            let _ = sender.send(Command::FallbackFired { instance_id });
        }));
    }
}

/// Applies the explicit overrides the `/api/test-alert` boundary accepts
/// (spec.md §6) on top of the resolved config. These are not considered by
/// the resolver itself — they are a final layer applied after resolution.
fn apply_explicit_overrides(mut spec: AlertSpec, facts: &TriggerFacts) -> AlertSpec {
    if let Some(v) = &facts.animation_in {
        spec.animation_in = v.clone();
    }
    if let Some(v) = &facts.animation_out {
        spec.animation_out = v.clone();
    }
    if let Some(v) = facts.duration_ms {
        spec.duration_ms = v;
    }
    spec
}

/// Substitutes the documented placeholders into a message template. Unknown
/// placeholders are left verbatim.
fn render_message(template: &str, username: &str, facts: &TriggerFacts) -> String {
    let amount = facts
        .amount
        .map(|a| a.to_string())
        .unwrap_or_default();
    let message = facts.message.clone().unwrap_or_default();

    template
        .replace("{username}", username)
        .replace("{amount}", &amount)
        .replace("{message}", &message)
}
