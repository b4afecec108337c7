use sqlx::Row;

use streamforge_core::{Result, Setting, StreamForgeError};

use super::{parse_timestamp, ConfigRepository};

impl ConfigRepository {
    /// Returns `None` if the key is absent (spec.md §4.2: "get... returns
    /// null if absent").
    pub async fn get_setting(&self, key: &str) -> Result<Option<Setting>> {
        let row = sqlx::query("SELECT * FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(self.store().pool())
            .await
            .map_err(|e| StreamForgeError::internal(format!("failed to fetch setting: {e}")))?;

        row.as_ref().map(row_to_setting).transpose()
    }

    pub async fn list_settings(&self) -> Result<Vec<Setting>> {
        let rows = sqlx::query("SELECT * FROM settings ORDER BY key ASC")
            .fetch_all(self.store().pool())
            .await
            .map_err(|e| StreamForgeError::internal(format!("failed to list settings: {e}")))?;
        rows.iter().map(row_to_setting).collect()
    }

    /// Upsert, stamping `updated_at` (spec.md §4.2).
    pub async fn set_setting(&self, key: &str, value: &str) -> Result<Setting> {
        let now = streamforge_core::time::now();
        sqlx::query(
            "INSERT INTO settings (key, value, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(streamforge_core::time::to_canonical(now))
        .execute(self.store().pool())
        .await
        .map_err(|e| StreamForgeError::internal(format!("failed to upsert setting: {e}")))?;

        Ok(Setting {
            key: key.to_string(),
            value: value.to_string(),
            updated_at: now,
        })
    }
}

fn row_to_setting(row: &sqlx::sqlite::SqliteRow) -> Result<Setting> {
    Ok(Setting {
        key: row.get("key"),
        value: row.get("value"),
        updated_at: parse_timestamp("settings.updated_at", row.get::<String, _>("updated_at").as_str())?,
    })
}
