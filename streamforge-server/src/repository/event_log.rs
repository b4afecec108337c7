use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Row, Sqlite};
use uuid::Uuid;

use streamforge_core::{EventLog, EventLogFilter, NewEventLog, Result, StreamForgeError};

use super::{parse_event_type, parse_timestamp, parse_uuid, ConfigRepository};

impl ConfigRepository {
    pub async fn create_event_log(&self, new_event: NewEventLog) -> Result<EventLog> {
        let event = new_event.into_event_log(Uuid::new_v4(), streamforge_core::time::now());

        sqlx::query(
            "INSERT INTO event_log (
                id, platform, event_type, username, display_name, amount, message,
                metadata, alert_fired, timestamp
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(event.id.to_string())
        .bind(&event.platform)
        .bind(event.event_type.as_str())
        .bind(&event.username)
        .bind(&event.display_name)
        .bind(event.amount)
        .bind(&event.message)
        .bind(event.metadata.to_string())
        .bind(event.alert_fired)
        .bind(streamforge_core::time::to_canonical(event.timestamp))
        .execute(self.store().pool())
        .await
        .map_err(|e| StreamForgeError::internal(format!("failed to insert event log row: {e}")))?;

        Ok(event)
    }

    /// Filters compose with AND semantics; descending timestamp ordering;
    /// limit clamped by `filter.effective_limit()` (spec.md §4.6).
    pub async fn list_event_log(&self, filter: &EventLogFilter) -> Result<Vec<EventLog>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM event_log WHERE 1=1");

        if let Some(event_type) = filter.event_type {
            builder.push(" AND event_type = ").push_bind(event_type.as_str());
        }
        if let Some(platform) = &filter.platform {
            builder.push(" AND platform = ").push_bind(platform.clone());
        }
        if filter.alert_fired_only {
            builder.push(" AND alert_fired = 1");
        }
        if let Some(search) = &filter.search {
            // SQLite's LIKE is case-insensitive for ASCII by default;
            // spec.md §4.6 requires case-sensitive substring matching, so
            // this uses `instr` (a plain byte-for-byte substring check)
            // rather than LIKE.
            builder
                .push(" AND (instr(username, ")
                .push_bind(search.clone())
                .push(") > 0 OR instr(display_name, ")
                .push_bind(search.clone())
                .push(") > 0 OR instr(message, ")
                .push_bind(search.clone())
                .push(") > 0)");
        }

        builder.push(" ORDER BY timestamp DESC LIMIT ");
        builder.push_bind(filter.effective_limit() as i64);

        let rows = builder
            .build()
            .fetch_all(self.store().pool())
            .await
            .map_err(|e| StreamForgeError::internal(format!("failed to list event log: {e}")))?;

        rows.iter().map(row_to_event_log).collect()
    }

    /// Inclusive range, descending order (spec.md §4.2).
    pub async fn list_event_log_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<EventLog>> {
        let rows = sqlx::query(
            "SELECT * FROM event_log WHERE timestamp >= ? AND timestamp <= ? ORDER BY timestamp DESC",
        )
        .bind(streamforge_core::time::to_canonical(from))
        .bind(streamforge_core::time::to_canonical(to))
        .fetch_all(self.store().pool())
        .await
        .map_err(|e| StreamForgeError::internal(format!("failed to list event log range: {e}")))?;

        rows.iter().map(row_to_event_log).collect()
    }

    /// Deletes rows strictly older than `cutoff`, returning the affected
    /// count (spec.md §4.2, invariant 16).
    pub async fn delete_event_log_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM event_log WHERE timestamp < ?")
            .bind(streamforge_core::time::to_canonical(cutoff))
            .execute(self.store().pool())
            .await
            .map_err(|e| StreamForgeError::internal(format!("failed to prune event log: {e}")))?;

        Ok(result.rows_affected())
    }
}

fn row_to_event_log(row: &sqlx::sqlite::SqliteRow) -> Result<EventLog> {
    let metadata_raw: String = row.get("metadata");
    let metadata = serde_json::from_str(&metadata_raw)
        .map_err(|e| StreamForgeError::internal(format!("corrupt event_log.metadata: {e}")))?;

    Ok(EventLog {
        id: parse_uuid("event_log.id", row.get::<String, _>("id").as_str())?,
        platform: row.get("platform"),
        event_type: parse_event_type(row.get::<String, _>("event_type").as_str())?,
        username: row.get("username"),
        display_name: row.get("display_name"),
        amount: row.get("amount"),
        message: row.get("message"),
        metadata,
        alert_fired: row.get("alert_fired"),
        timestamp: parse_timestamp("event_log.timestamp", row.get::<String, _>("timestamp").as_str())?,
    })
}
