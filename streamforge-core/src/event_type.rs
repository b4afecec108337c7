use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of viewer event an Alert configuration reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Follow,
    Subscribe,
    Cheer,
    Raid,
    Donation,
    Custom,
}

impl EventType {
    pub const ALL: [EventType; 6] = [
        EventType::Follow,
        EventType::Subscribe,
        EventType::Cheer,
        EventType::Raid,
        EventType::Donation,
        EventType::Custom,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Follow => "follow",
            EventType::Subscribe => "subscribe",
            EventType::Cheer => "cheer",
            EventType::Raid => "raid",
            EventType::Donation => "donation",
            EventType::Custom => "custom",
        }
    }

    /// Whether a `min_amount` gate on the parent Alert is meaningful for
    /// this event type (spec.md §3: "applies to cheer/donation/raid").
    pub fn supports_amount_gate(&self) -> bool {
        matches!(self, EventType::Cheer | EventType::Donation | EventType::Raid)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for EventType {
    fn default() -> Self {
        EventType::Custom
    }
}

impl FromStr for EventType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "follow" => Ok(EventType::Follow),
            "subscribe" => Ok(EventType::Subscribe),
            "cheer" => Ok(EventType::Cheer),
            "raid" => Ok(EventType::Raid),
            "donation" => Ok(EventType::Donation),
            "custom" => Ok(EventType::Custom),
            other => Err(format!("unknown event type: {other}")),
        }
    }
}
