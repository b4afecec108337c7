//! Documented default values filled in when a caller omits a field.
//!
//! Kept as one explicit list per spec.md §9's "Variation merge... keeping
//! the list explicit is part of the contract" note — the same discipline
//! applies to default-value policy, not just the merge field list.

use crate::event_type::EventType;

pub const MIN_DURATION_MS: u32 = 1_000;
pub const MAX_DURATION_MS: u32 = 60_000;
pub const DEFAULT_DURATION_MS: u32 = 5_000;

pub const MIN_FONT_SIZE: u32 = 12;
pub const MAX_FONT_SIZE: u32 = 200;
pub const DEFAULT_FONT_SIZE: u32 = 32;

pub const DEFAULT_FONT_FAMILY: &str = "Inter";
pub const DEFAULT_TEXT_COLOR: &str = "#ffffff";
pub const DEFAULT_ANIMATION_IN: &str = "fade-in";
pub const DEFAULT_ANIMATION_OUT: &str = "fade-out";
pub const DEFAULT_SOUND_VOLUME: f32 = 0.8;
pub const DEFAULT_TTS_RATE: f32 = 1.0;
pub const DEFAULT_TTS_PITCH: f32 = 1.0;
pub const DEFAULT_TTS_VOLUME: f32 = 1.0;

/// Event-log rows older than this are eligible for pruning (spec.md §3,
/// §9 Open Question: hard-coded, no setting key).
pub const DEFAULT_EVENT_LOG_RETENTION_DAYS: i64 = 7;

pub const DEFAULT_EVENT_LOG_LIST_LIMIT: u32 = 100;
pub const MAX_EVENT_LOG_LIST_LIMIT: u32 = 1_000;

/// The type-specific default message template used when neither the Alert
/// row nor the enqueue caller supplies one.
pub fn default_message_template(event_type: EventType) -> &'static str {
    match event_type {
        EventType::Follow => "{username} just followed!",
        EventType::Subscribe => "{username} just subscribed!",
        EventType::Cheer => "{username} cheered {amount} bits!",
        EventType::Raid => "{username} is raiding with {amount} viewers!",
        EventType::Donation => "{username} donated {amount}!",
        EventType::Custom => "{username}: {message}",
    }
}

pub fn clamp_duration_ms(value: u32) -> u32 {
    value.clamp(MIN_DURATION_MS, MAX_DURATION_MS)
}

pub fn clamp_font_size(value: u32) -> u32 {
    value.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
}

pub fn clamp_unit_interval(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}
