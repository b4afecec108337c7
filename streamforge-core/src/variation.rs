use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// The kind of condition a Variation is matched against (spec.md §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionType {
    Tier,
    Amount,
    Custom,
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConditionType::Tier => "tier",
            ConditionType::Amount => "amount",
            ConditionType::Custom => "custom",
        };
        f.write_str(s)
    }
}

/// A conditional override attached to a parent Alert (spec.md §3
/// "Variation"). Non-null override fields replace the parent's
/// corresponding field at resolution time; null fields inherit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variation {
    pub id: Uuid,
    pub parent_alert_id: Uuid,
    pub name: String,
    pub condition_type: ConditionType,
    pub condition_value: String,
    pub priority: i32,
    pub enabled: bool,
    pub message_template: Option<String>,
    pub sound_path: Option<String>,
    pub sound_volume: Option<f32>,
    pub image_path: Option<String>,
    pub animation_in: Option<String>,
    pub animation_out: Option<String>,
    pub custom_css: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Caller-supplied fields for creating a Variation. `parent_alert_id`,
/// `name`, `condition_type`, and `condition_value` are required — the
/// repository returns `NotFound` if the parent does not exist.
#[derive(Debug, Clone, Deserialize)]
pub struct NewVariation {
    pub parent_alert_id: Uuid,
    pub name: String,
    pub condition_type: ConditionType,
    pub condition_value: String,
    pub priority: Option<i32>,
    pub enabled: Option<bool>,
    pub message_template: Option<String>,
    pub sound_path: Option<String>,
    pub sound_volume: Option<f32>,
    pub image_path: Option<String>,
    pub animation_in: Option<String>,
    pub animation_out: Option<String>,
    pub custom_css: Option<String>,
}

impl NewVariation {
    pub fn into_variation(self, id: Uuid, now: DateTime<Utc>) -> Variation {
        Variation {
            id,
            parent_alert_id: self.parent_alert_id,
            name: self.name,
            condition_type: self.condition_type,
            condition_value: self.condition_value,
            priority: self.priority.unwrap_or(0),
            enabled: self.enabled.unwrap_or(true),
            message_template: self.message_template,
            sound_path: self.sound_path,
            sound_volume: self.sound_volume,
            image_path: self.image_path,
            animation_in: self.animation_in,
            animation_out: self.animation_out,
            custom_css: self.custom_css,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update over a Variation. Same double-`Option` nullable
/// convention as [`crate::alert::AlertPatch`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VariationPatch {
    pub name: Option<String>,
    pub condition_type: Option<ConditionType>,
    pub condition_value: Option<String>,
    pub priority: Option<i32>,
    pub enabled: Option<bool>,
    #[serde(default)]
    pub message_template: Option<Option<String>>,
    #[serde(default)]
    pub sound_path: Option<Option<String>>,
    pub sound_volume: Option<Option<f32>>,
    #[serde(default)]
    pub image_path: Option<Option<String>>,
    #[serde(default)]
    pub animation_in: Option<Option<String>>,
    #[serde(default)]
    pub animation_out: Option<Option<String>>,
    #[serde(default)]
    pub custom_css: Option<Option<String>>,
}

impl VariationPatch {
    pub fn apply(self, variation: &mut Variation, now: DateTime<Utc>) {
        if let Some(v) = self.name {
            variation.name = v;
        }
        if let Some(v) = self.condition_type {
            variation.condition_type = v;
        }
        if let Some(v) = self.condition_value {
            variation.condition_value = v;
        }
        if let Some(v) = self.priority {
            variation.priority = v;
        }
        if let Some(v) = self.enabled {
            variation.enabled = v;
        }
        if let Some(v) = self.message_template {
            variation.message_template = v;
        }
        if let Some(v) = self.sound_path {
            variation.sound_path = v;
        }
        if let Some(v) = self.sound_volume {
            variation.sound_volume = v;
        }
        if let Some(v) = self.image_path {
            variation.image_path = v;
        }
        if let Some(v) = self.animation_in {
            variation.animation_in = v;
        }
        if let Some(v) = self.animation_out {
            variation.animation_out = v;
        }
        if let Some(v) = self.custom_css {
            variation.custom_css = v;
        }
        variation.updated_at = now;
    }
}
