use sqlx::Row;
use uuid::Uuid;

use streamforge_core::{
    Alert, AlertPatch, AlertWithVariations, EventType, NewAlert, Result, StreamForgeError,
};

use super::{parse_event_type, parse_timestamp, parse_uuid, ConfigRepository};

impl ConfigRepository {
    pub async fn create_alert(&self, new_alert: NewAlert) -> Result<Alert> {
        let alert = new_alert.into_alert(Uuid::new_v4(), streamforge_core::time::now());
        self.insert_alert(&alert).await?;
        Ok(alert)
    }

    async fn insert_alert(&self, alert: &Alert) -> Result<()> {
        sqlx::query(
            "INSERT INTO alerts (
                id, event_type, name, enabled, message_template, duration_ms,
                animation_in, animation_out, sound_path, sound_volume, image_path,
                font_family, font_size, text_color, background_color, custom_css,
                min_amount, tts_enabled, tts_voice, tts_rate, tts_pitch, tts_volume,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(alert.id.to_string())
        .bind(alert.event_type.as_str())
        .bind(&alert.name)
        .bind(alert.enabled)
        .bind(&alert.message_template)
        .bind(alert.duration_ms)
        .bind(&alert.animation_in)
        .bind(&alert.animation_out)
        .bind(&alert.sound_path)
        .bind(alert.sound_volume)
        .bind(&alert.image_path)
        .bind(&alert.font_family)
        .bind(alert.font_size)
        .bind(&alert.text_color)
        .bind(&alert.background_color)
        .bind(&alert.custom_css)
        .bind(alert.min_amount)
        .bind(alert.tts_enabled)
        .bind(&alert.tts_voice)
        .bind(alert.tts_rate)
        .bind(alert.tts_pitch)
        .bind(alert.tts_volume)
        .bind(streamforge_core::time::to_canonical(alert.created_at))
        .bind(streamforge_core::time::to_canonical(alert.updated_at))
        .execute(self.store().pool())
        .await
        .map_err(|e| StreamForgeError::internal(format!("failed to insert alert: {e}")))?;
        Ok(())
    }

    pub async fn get_alert(&self, id: Uuid) -> Result<Alert> {
        let row = sqlx::query("SELECT * FROM alerts WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(self.store().pool())
            .await
            .map_err(|e| StreamForgeError::internal(format!("failed to fetch alert: {e}")))?
            .ok_or_else(|| StreamForgeError::not_found("alert", id))?;
        let mut alert = row_to_alert(&row)?;
        alert.variations = self.list_variations_by_parent(id).await?;
        Ok(alert)
    }

    /// Every Alert with its Variations, ordered by `created_at` ascending.
    pub async fn list_alerts(&self) -> Result<Vec<Alert>> {
        let rows = sqlx::query("SELECT * FROM alerts ORDER BY created_at ASC")
            .fetch_all(self.store().pool())
            .await
            .map_err(|e| StreamForgeError::internal(format!("failed to list alerts: {e}")))?;

        let mut alerts = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut alert = row_to_alert(row)?;
            alert.variations = self.list_variations_by_parent(alert.id).await?;
            alerts.push(alert);
        }
        Ok(alerts)
    }

    pub async fn list_alerts_by_type(&self, event_type: EventType) -> Result<Vec<Alert>> {
        let rows = sqlx::query("SELECT * FROM alerts WHERE event_type = ? ORDER BY created_at ASC")
            .bind(event_type.as_str())
            .fetch_all(self.store().pool())
            .await
            .map_err(|e| StreamForgeError::internal(format!("failed to list alerts: {e}")))?;

        let mut alerts = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut alert = row_to_alert(row)?;
            alert.variations = self.list_variations_by_parent(alert.id).await?;
            alerts.push(alert);
        }
        Ok(alerts)
    }

    /// Every enabled Alert, with Variations attached, ordered by
    /// `created_at` ascending (spec.md §4.2 "list-enabled").
    pub async fn list_enabled_alerts(&self) -> Result<Vec<Alert>> {
        let rows = sqlx::query("SELECT * FROM alerts WHERE enabled = 1 ORDER BY created_at ASC")
            .fetch_all(self.store().pool())
            .await
            .map_err(|e| StreamForgeError::internal(format!("failed to list alerts: {e}")))?;

        let mut alerts = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut alert = row_to_alert(row)?;
            alert.variations = self.list_variations_by_parent(alert.id).await?;
            alerts.push(alert);
        }
        Ok(alerts)
    }

    /// Enabled Alerts of `event_type` with their enabled-or-not Variations
    /// attached, ordered by `created_at` ascending — the candidate set the
    /// resolver expects (spec.md §4.3 step 1).
    pub async fn list_resolver_candidates(
        &self,
        event_type: EventType,
    ) -> Result<Vec<AlertWithVariations>> {
        let rows = sqlx::query(
            "SELECT * FROM alerts WHERE event_type = ? AND enabled = 1 ORDER BY created_at ASC",
        )
        .bind(event_type.as_str())
        .fetch_all(self.store().pool())
        .await
        .map_err(|e| StreamForgeError::internal(format!("failed to list alerts: {e}")))?;

        let mut candidates = Vec::with_capacity(rows.len());
        for row in &rows {
            let alert = row_to_alert(row)?;
            let variations = self.list_variations_by_parent(alert.id).await?;
            candidates.push(AlertWithVariations { alert, variations });
        }
        Ok(candidates)
    }

    /// Partial update; always bumps `updated_at` even when `patch` is
    /// entirely `None` fields (spec.md §4.2).
    pub async fn update_alert(&self, id: Uuid, patch: AlertPatch) -> Result<Alert> {
        let mut alert = self.get_alert(id).await?;
        patch.apply(&mut alert, streamforge_core::time::now());

        sqlx::query(
            "UPDATE alerts SET
                name = ?, enabled = ?, message_template = ?, duration_ms = ?,
                animation_in = ?, animation_out = ?, sound_path = ?, sound_volume = ?,
                image_path = ?, font_family = ?, font_size = ?, text_color = ?,
                background_color = ?, custom_css = ?, min_amount = ?, tts_enabled = ?,
                tts_voice = ?, tts_rate = ?, tts_pitch = ?, tts_volume = ?, updated_at = ?
            WHERE id = ?",
        )
        .bind(&alert.name)
        .bind(alert.enabled)
        .bind(&alert.message_template)
        .bind(alert.duration_ms)
        .bind(&alert.animation_in)
        .bind(&alert.animation_out)
        .bind(&alert.sound_path)
        .bind(alert.sound_volume)
        .bind(&alert.image_path)
        .bind(&alert.font_family)
        .bind(alert.font_size)
        .bind(&alert.text_color)
        .bind(&alert.background_color)
        .bind(&alert.custom_css)
        .bind(alert.min_amount)
        .bind(alert.tts_enabled)
        .bind(&alert.tts_voice)
        .bind(alert.tts_rate)
        .bind(alert.tts_pitch)
        .bind(alert.tts_volume)
        .bind(streamforge_core::time::to_canonical(alert.updated_at))
        .bind(id.to_string())
        .execute(self.store().pool())
        .await
        .map_err(|e| StreamForgeError::internal(format!("failed to update alert: {e}")))?;

        Ok(alert)
    }

    /// Deletes the Alert; its Variations cascade via the foreign key
    /// (spec.md §4.2, verified by invariant 11).
    pub async fn delete_alert(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM alerts WHERE id = ?")
            .bind(id.to_string())
            .execute(self.store().pool())
            .await
            .map_err(|e| StreamForgeError::internal(format!("failed to delete alert: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(StreamForgeError::not_found("alert", id));
        }
        Ok(())
    }
}

fn row_to_alert(row: &sqlx::sqlite::SqliteRow) -> Result<Alert> {
    Ok(Alert {
        id: parse_uuid("alerts.id", row.get::<String, _>("id").as_str())?,
        event_type: parse_event_type(row.get::<String, _>("event_type").as_str())?,
        name: row.get("name"),
        enabled: row.get("enabled"),
        message_template: row.get("message_template"),
        duration_ms: row.get::<i64, _>("duration_ms") as u32,
        animation_in: row.get("animation_in"),
        animation_out: row.get("animation_out"),
        sound_path: row.get("sound_path"),
        sound_volume: row.get("sound_volume"),
        image_path: row.get("image_path"),
        font_family: row.get("font_family"),
        font_size: row.get::<i64, _>("font_size") as u32,
        text_color: row.get("text_color"),
        background_color: row.get("background_color"),
        custom_css: row.get("custom_css"),
        min_amount: row.get("min_amount"),
        tts_enabled: row.get("tts_enabled"),
        tts_voice: row.get("tts_voice"),
        tts_rate: row.get("tts_rate"),
        tts_pitch: row.get("tts_pitch"),
        tts_volume: row.get("tts_volume"),
        created_at: parse_timestamp("alerts.created_at", row.get::<String, _>("created_at").as_str())?,
        updated_at: parse_timestamp("alerts.updated_at", row.get::<String, _>("updated_at").as_str())?,
        variations: Vec::new(),
    })
}
