use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::defaults;
use crate::event_type::EventType;

/// Audit record of any event reaching the server (spec.md §3 "EventLog").
/// Insert-only; pruned by timestamp threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    pub id: Uuid,
    pub platform: String,
    pub event_type: EventType,
    pub username: String,
    pub display_name: Option<String>,
    pub amount: Option<f64>,
    pub message: Option<String>,
    pub metadata: JsonValue,
    pub alert_fired: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewEventLog {
    pub platform: String,
    pub event_type: EventType,
    pub username: String,
    pub display_name: Option<String>,
    pub amount: Option<f64>,
    pub message: Option<String>,
    #[serde(default)]
    pub metadata: Option<JsonValue>,
    pub alert_fired: bool,
}

impl NewEventLog {
    pub fn into_event_log(self, id: Uuid, now: DateTime<Utc>) -> EventLog {
        EventLog {
            id,
            platform: self.platform,
            event_type: self.event_type,
            username: self.username,
            display_name: self.display_name,
            amount: self.amount,
            message: self.message,
            metadata: self.metadata.unwrap_or_else(|| JsonValue::Object(Default::default())),
            alert_fired: self.alert_fired,
            timestamp: now,
        }
    }
}

/// Composable AND-semantics filters for `list` (spec.md §4.6). Free-text
/// search is case-sensitive substring match across username, display name,
/// and message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventLogFilter {
    pub event_type: Option<EventType>,
    pub platform: Option<String>,
    #[serde(default)]
    pub alert_fired_only: bool,
    pub search: Option<String>,
    pub limit: Option<u32>,
}

impl EventLogFilter {
    /// Limit clamped to the documented default/max (spec.md §4.6, §6).
    pub fn effective_limit(&self) -> u32 {
        self.limit
            .unwrap_or(defaults::DEFAULT_EVENT_LOG_LIST_LIMIT)
            .min(defaults::MAX_EVENT_LOG_LIST_LIMIT)
    }

    /// In-process predicate mirroring the SQL filter the store applies;
    /// used by unit tests that exercise filtering logic without a database.
    pub fn matches(&self, row: &EventLog) -> bool {
        if let Some(et) = self.event_type {
            if row.event_type != et {
                return false;
            }
        }
        if let Some(platform) = &self.platform {
            if &row.platform != platform {
                return false;
            }
        }
        if self.alert_fired_only && !row.alert_fired {
            return false;
        }
        if let Some(needle) = &self.search {
            let hit = row.username.contains(needle.as_str())
                || row
                    .display_name
                    .as_deref()
                    .map(|d| d.contains(needle.as_str()))
                    .unwrap_or(false)
                || row
                    .message
                    .as_deref()
                    .map(|m| m.contains(needle.as_str()))
                    .unwrap_or(false);
            if !hit {
                return false;
            }
        }
        true
    }
}
