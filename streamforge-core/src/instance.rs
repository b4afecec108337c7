use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::alert::Alert;
use crate::event_type::EventType;
use crate::variation::Variation;

/// The merged `{parent ⊕ variation}` record handed to overlays as `config`
/// (spec.md GLOSSARY "AlertSpec").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertSpec {
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
    pub background_color: Option<String>,
    pub custom_css: Option<String>,
    pub tts_enabled: bool,
    pub tts_voice: Option<String>,
    pub tts_rate: Option<f32>,
    pub tts_pitch: Option<f32>,
    pub tts_volume: Option<f32>,
    /// Diagnostic field: the variation that produced this spec, if any.
    #[serde(rename = "_variation_id", skip_serializing_if = "Option::is_none")]
    pub variation_id: Option<Uuid>,
    /// Diagnostic field: the matched variation's name, if any.
    #[serde(rename = "_variation_name", skip_serializing_if = "Option::is_none")]
    pub variation_name: Option<String>,
}

impl AlertSpec {
    /// A spec copied from the parent Alert's own fields, with no variation
    /// applied. Used both as the resolver's base and as the "no variation
    /// matched" result (spec.md §4.3 step 2d).
    pub fn from_alert(alert: &Alert) -> Self {
        Self {
            message_template: alert.message_template.clone(),
            duration_ms: alert.duration_ms,
            animation_in: alert.animation_in.clone(),
            animation_out: alert.animation_out.clone(),
            sound_path: alert.sound_path.clone(),
            sound_volume: alert.sound_volume,
            image_path: alert.image_path.clone(),
            font_family: alert.font_family.clone(),
            font_size: alert.font_size,
            text_color: alert.text_color.clone(),
            background_color: alert.background_color.clone(),
            custom_css: alert.custom_css.clone(),
            tts_enabled: alert.tts_enabled,
            tts_voice: alert.tts_voice.clone(),
            tts_rate: alert.tts_rate,
            tts_pitch: alert.tts_pitch,
            tts_volume: alert.tts_volume,
            variation_id: None,
            variation_name: None,
        }
    }
}

/// An Alert paired with the Variations eligible to override it. The
/// resolver treats this as read-only input and never mutates either side.
#[derive(Debug, Clone)]
pub struct AlertWithVariations {
    pub alert: Alert,
    pub variations: Vec<Variation>,
}

/// The facts describing an incoming viewer event, as submitted to the
/// resolver and the alert queue (spec.md §4.3, §4.4).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TriggerFacts {
    pub event_type: Option<EventType>,
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub amount: Option<f64>,
    pub tier: Option<String>,
    pub custom_value: Option<String>,
    pub message: Option<String>,
    /// Explicit overrides accepted by the `/api/test-alert` boundary
    /// (spec.md §6); applied on top of the resolved config, not considered
    /// by the resolver itself.
    pub animation_in: Option<String>,
    pub animation_out: Option<String>,
    pub duration_ms: Option<u32>,
    /// Caller-assigned instance id, if pre-generated by the submitter.
    pub instance_id: Option<Uuid>,
}

/// A resolved, in-flight alert enqueued for playback (spec.md GLOSSARY
/// "AlertInstance"). Transient — never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertInstance {
    pub id: Uuid,
    #[serde(rename = "alertConfigId")]
    pub alert_config_id: Option<Uuid>,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub username: String,
    #[serde(rename = "displayName")]
    pub display_name: Option<String>,
    pub amount: Option<f64>,
    pub message: String,
    pub config: AlertSpec,
    pub timestamp: DateTime<Utc>,
}
