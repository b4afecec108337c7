use sqlx::Row;
use uuid::Uuid;

use streamforge_core::{ConditionType, NewVariation, Result, StreamForgeError, Variation, VariationPatch};

use super::{parse_timestamp, parse_uuid, ConfigRepository};

impl ConfigRepository {
    pub async fn create_variation(&self, new_variation: NewVariation) -> Result<Variation> {
        // Verify the parent exists first — the table's ON DELETE CASCADE FK
        // would reject an orphan insert anyway, but this gives a typed
        // NotFound instead of a raw driver error (spec.md §4.2).
        self.get_alert(new_variation.parent_alert_id).await?;

        let variation = new_variation.into_variation(Uuid::new_v4(), streamforge_core::time::now());
        self.insert_variation(&variation).await?;
        Ok(variation)
    }

    async fn insert_variation(&self, variation: &Variation) -> Result<()> {
        sqlx::query(
            "INSERT INTO variations (
                id, parent_alert_id, name, condition_type, condition_value, priority,
                enabled, message_template, sound_path, sound_volume, image_path,
                animation_in, animation_out, custom_css, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(variation.id.to_string())
        .bind(variation.parent_alert_id.to_string())
        .bind(&variation.name)
        .bind(variation.condition_type.to_string())
        .bind(&variation.condition_value)
        .bind(variation.priority)
        .bind(variation.enabled)
        .bind(&variation.message_template)
        .bind(&variation.sound_path)
        .bind(variation.sound_volume)
        .bind(&variation.image_path)
        .bind(&variation.animation_in)
        .bind(&variation.animation_out)
        .bind(&variation.custom_css)
        .bind(streamforge_core::time::to_canonical(variation.created_at))
        .bind(streamforge_core::time::to_canonical(variation.updated_at))
        .execute(self.store().pool())
        .await
        .map_err(|e| StreamForgeError::internal(format!("failed to insert variation: {e}")))?;
        Ok(())
    }

    pub async fn get_variation(&self, id: Uuid) -> Result<Variation> {
        let row = sqlx::query("SELECT * FROM variations WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(self.store().pool())
            .await
            .map_err(|e| StreamForgeError::internal(format!("failed to fetch variation: {e}")))?
            .ok_or_else(|| StreamForgeError::not_found("variation", id))?;
        row_to_variation(&row)
    }

    /// Ordered priority descending, `created_at` ascending tie-break
    /// (spec.md §4.2).
    pub async fn list_variations_by_parent(&self, parent_alert_id: Uuid) -> Result<Vec<Variation>> {
        let rows = sqlx::query(
            "SELECT * FROM variations WHERE parent_alert_id = ?
             ORDER BY priority DESC, created_at ASC",
        )
        .bind(parent_alert_id.to_string())
        .fetch_all(self.store().pool())
        .await
        .map_err(|e| StreamForgeError::internal(format!("failed to list variations: {e}")))?;

        rows.iter().map(row_to_variation).collect()
    }

    pub async fn update_variation(&self, id: Uuid, patch: VariationPatch) -> Result<Variation> {
        let mut variation = self.get_variation(id).await?;
        patch.apply(&mut variation, streamforge_core::time::now());

        sqlx::query(
            "UPDATE variations SET
                name = ?, condition_type = ?, condition_value = ?, priority = ?,
                enabled = ?, message_template = ?, sound_path = ?, sound_volume = ?,
                image_path = ?, animation_in = ?, animation_out = ?, custom_css = ?,
                updated_at = ?
            WHERE id = ?",
        )
        .bind(&variation.name)
        .bind(variation.condition_type.to_string())
        .bind(&variation.condition_value)
        .bind(variation.priority)
        .bind(variation.enabled)
        .bind(&variation.message_template)
        .bind(&variation.sound_path)
        .bind(variation.sound_volume)
        .bind(&variation.image_path)
        .bind(&variation.animation_in)
        .bind(&variation.animation_out)
        .bind(&variation.custom_css)
        .bind(streamforge_core::time::to_canonical(variation.updated_at))
        .bind(id.to_string())
        .execute(self.store().pool())
        .await
        .map_err(|e| StreamForgeError::internal(format!("failed to update variation: {e}")))?;

        Ok(variation)
    }

    pub async fn delete_variation(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM variations WHERE id = ?")
            .bind(id.to_string())
            .execute(self.store().pool())
            .await
            .map_err(|e| StreamForgeError::internal(format!("failed to delete variation: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(StreamForgeError::not_found("variation", id));
        }
        Ok(())
    }
}

fn row_to_variation(row: &sqlx::sqlite::SqliteRow) -> Result<Variation> {
    Ok(Variation {
        id: parse_uuid("variations.id", row.get::<String, _>("id").as_str())?,
        parent_alert_id: parse_uuid(
            "variations.parent_alert_id",
            row.get::<String, _>("parent_alert_id").as_str(),
        )?,
        name: row.get("name"),
        condition_type: parse_condition_type(row.get::<String, _>("condition_type").as_str())?,
        condition_value: row.get("condition_value"),
        priority: row.get("priority"),
        enabled: row.get("enabled"),
        message_template: row.get("message_template"),
        sound_path: row.get("sound_path"),
        sound_volume: row.get("sound_volume"),
        image_path: row.get("image_path"),
        animation_in: row.get("animation_in"),
        animation_out: row.get("animation_out"),
        custom_css: row.get("custom_css"),
        created_at: parse_timestamp(
            "variations.created_at",
            row.get::<String, _>("created_at").as_str(),
        )?,
        updated_at: parse_timestamp(
            "variations.updated_at",
            row.get::<String, _>("updated_at").as_str(),
        )?,
    })
}

fn parse_condition_type(raw: &str) -> Result<ConditionType> {
    match raw {
        "tier" => Ok(ConditionType::Tier),
        "amount" => Ok(ConditionType::Amount),
        "custom" => Ok(ConditionType::Custom),
        other => Err(StreamForgeError::internal(format!(
            "corrupt condition_type: {other}"
        ))),
    }
}
