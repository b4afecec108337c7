use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults;
use crate::event_type::EventType;
use crate::variation::Variation;

/// Parent configuration for one event kind (spec.md §3 "Alert").
///
/// `event_type` is immutable after creation; placeholder references inside
/// `message_template` (`{username}`, `{amount}`, `{message}`) are not
/// validated at write time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub event_type: EventType,
    pub name: String,
    pub enabled: bool,
    pub message_template: String,
    pub duration_ms: u32,
    pub animation_in: String,
    pub animation_out: String,
    pub sound_path: Option<String>,
    pub sound_volume: f32,
    pub image_path: Option<String>,
    pub font_family: String,
    pub font_size: u32,
    pub text_color: String,
    /// `None` means transparent.
    pub background_color: Option<String>,
    pub custom_css: Option<String>,
    /// Applies to cheer/donation/raid; ignored for other event types.
    pub min_amount: Option<f64>,
    pub tts_enabled: bool,
    pub tts_voice: Option<String>,
    pub tts_rate: Option<f32>,
    pub tts_pitch: Option<f32>,
    pub tts_volume: Option<f32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Populated by list-all; empty unless the caller asked for variations.
    #[serde(default)]
    pub variations: Vec<Variation>,
}

/// Caller-supplied fields for creating an Alert. Anything `None` is filled
/// from the documented defaults in [`crate::defaults`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewAlert {
    pub event_type: EventType,
    pub name: Option<String>,
    pub enabled: Option<bool>,
    pub message_template: Option<String>,
    pub duration_ms: Option<u32>,
    pub animation_in: Option<String>,
    pub animation_out: Option<String>,
    pub sound_path: Option<String>,
    pub sound_volume: Option<f32>,
    pub image_path: Option<String>,
    pub font_family: Option<String>,
    pub font_size: Option<u32>,
    pub text_color: Option<String>,
    pub background_color: Option<String>,
    pub custom_css: Option<String>,
    pub min_amount: Option<f64>,
    pub tts_enabled: Option<bool>,
    pub tts_voice: Option<String>,
    pub tts_rate: Option<f32>,
    pub tts_pitch: Option<f32>,
    pub tts_volume: Option<f32>,
}

impl NewAlert {
    /// Materializes a full `Alert` row, filling every unspecified field
    /// from the documented defaults. `id`/timestamps are server-assigned.
    pub fn into_alert(self, id: Uuid, now: DateTime<Utc>) -> Alert {
        let message_template = self
            .message_template
            .unwrap_or_else(|| defaults::default_message_template(self.event_type).to_string());

        Alert {
            id,
            event_type: self.event_type,
            name: self
                .name
                .unwrap_or_else(|| format!("{} alert", self.event_type)),
            enabled: self.enabled.unwrap_or(true),
            message_template,
            duration_ms: defaults::clamp_duration_ms(
                self.duration_ms.unwrap_or(defaults::DEFAULT_DURATION_MS),
            ),
            animation_in: self
                .animation_in
                .unwrap_or_else(|| defaults::DEFAULT_ANIMATION_IN.to_string()),
            animation_out: self
                .animation_out
                .unwrap_or_else(|| defaults::DEFAULT_ANIMATION_OUT.to_string()),
            sound_path: self.sound_path,
            sound_volume: defaults::clamp_unit_interval(
                self.sound_volume.unwrap_or(defaults::DEFAULT_SOUND_VOLUME),
            ),
            image_path: self.image_path,
            font_family: self
                .font_family
                .unwrap_or_else(|| defaults::DEFAULT_FONT_FAMILY.to_string()),
            font_size: defaults::clamp_font_size(
                self.font_size.unwrap_or(defaults::DEFAULT_FONT_SIZE),
            ),
            text_color: self
                .text_color
                .unwrap_or_else(|| defaults::DEFAULT_TEXT_COLOR.to_string()),
            background_color: self.background_color,
            custom_css: self.custom_css,
            min_amount: self.min_amount,
            tts_enabled: self.tts_enabled.unwrap_or(false),
            tts_voice: self.tts_voice,
            tts_rate: self.tts_rate,
            tts_pitch: self.tts_pitch,
            tts_volume: self.tts_volume,
            created_at: now,
            updated_at: now,
            variations: Vec::new(),
        }
    }
}

/// Partial update. `event_type` is deliberately absent — it is immutable
/// after create (spec.md §3 invariant). Nullable fields use `Option<Option<T>>`:
/// `None` = leave unchanged, `Some(None)` = clear to null, `Some(Some(v))` = set.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlertPatch {
    pub name: Option<String>,
    pub enabled: Option<bool>,
    pub message_template: Option<String>,
    pub duration_ms: Option<u32>,
    pub animation_in: Option<String>,
    pub animation_out: Option<String>,
    #[serde(default)]
    pub sound_path: Option<Option<String>>,
    pub sound_volume: Option<f32>,
    #[serde(default)]
    pub image_path: Option<Option<String>>,
    pub font_family: Option<String>,
    pub font_size: Option<u32>,
    pub text_color: Option<String>,
    #[serde(default)]
    pub background_color: Option<Option<String>>,
    #[serde(default)]
    pub custom_css: Option<Option<String>>,
    #[serde(default)]
    pub min_amount: Option<Option<f64>>,
    pub tts_enabled: Option<bool>,
    #[serde(default)]
    pub tts_voice: Option<Option<String>>,
    pub tts_rate: Option<f32>,
    pub tts_pitch: Option<f32>,
    pub tts_volume: Option<f32>,
}

impl AlertPatch {
    /// Applies every provided field onto `alert` in place. Always bumps
    /// `updated_at`, even when every field is `None` (spec.md §4.2).
    pub fn apply(self, alert: &mut Alert, now: DateTime<Utc>) {
        if let Some(v) = self.name {
            alert.name = v;
        }
        if let Some(v) = self.enabled {
            alert.enabled = v;
        }
        if let Some(v) = self.message_template {
            alert.message_template = v;
        }
        if let Some(v) = self.duration_ms {
            alert.duration_ms = defaults::clamp_duration_ms(v);
        }
        if let Some(v) = self.animation_in {
            alert.animation_in = v;
        }
        if let Some(v) = self.animation_out {
            alert.animation_out = v;
        }
        if let Some(v) = self.sound_path {
            alert.sound_path = v;
        }
        if let Some(v) = self.sound_volume {
            alert.sound_volume = defaults::clamp_unit_interval(v);
        }
        if let Some(v) = self.image_path {
            alert.image_path = v;
        }
        if let Some(v) = self.font_family {
            alert.font_family = v;
        }
        if let Some(v) = self.font_size {
            alert.font_size = defaults::clamp_font_size(v);
        }
        if let Some(v) = self.text_color {
            alert.text_color = v;
        }
        if let Some(v) = self.background_color {
            alert.background_color = v;
        }
        if let Some(v) = self.custom_css {
            alert.custom_css = v;
        }
        if let Some(v) = self.min_amount {
            alert.min_amount = v;
        }
        if let Some(v) = self.tts_enabled {
            alert.tts_enabled = v;
        }
        if let Some(v) = self.tts_voice {
            alert.tts_voice = v;
        }
        if let Some(v) = self.tts_rate {
            alert.tts_rate = Some(v);
        }
        if let Some(v) = self.tts_pitch {
            alert.tts_pitch = Some(v);
        }
        if let Some(v) = self.tts_volume {
            alert.tts_volume = Some(v);
        }
        alert.updated_at = now;
    }
}
