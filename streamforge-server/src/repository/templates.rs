use sqlx::Row;
use uuid::Uuid;

use streamforge_core::{NewTemplate, Result, StreamForgeError, Template, TemplatePatch};

use super::{parse_timestamp, parse_uuid, ConfigRepository};

impl ConfigRepository {
    pub async fn create_template(&self, new_template: NewTemplate) -> Result<Template> {
        let template = new_template.into_template(Uuid::new_v4(), streamforge_core::time::now());

        sqlx::query(
            "INSERT INTO templates (id, name, description, author, spec_blob, is_builtin, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, 0, ?, ?)",
        )
        .bind(template.id.to_string())
        .bind(&template.name)
        .bind(&template.description)
        .bind(&template.author)
        .bind(&template.spec_blob)
        .bind(streamforge_core::time::to_canonical(template.created_at))
        .bind(streamforge_core::time::to_canonical(template.updated_at))
        .execute(self.store().pool())
        .await
        .map_err(|e| StreamForgeError::internal(format!("failed to insert template: {e}")))?;

        Ok(template)
    }

    pub async fn get_template(&self, id: Uuid) -> Result<Template> {
        let row = sqlx::query("SELECT * FROM templates WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(self.store().pool())
            .await
            .map_err(|e| StreamForgeError::internal(format!("failed to fetch template: {e}")))?
            .ok_or_else(|| StreamForgeError::not_found("template", id))?;
        row_to_template(&row)
    }

    pub async fn list_templates(&self) -> Result<Vec<Template>> {
        let rows = sqlx::query("SELECT * FROM templates ORDER BY created_at ASC")
            .fetch_all(self.store().pool())
            .await
            .map_err(|e| StreamForgeError::internal(format!("failed to list templates: {e}")))?;
        rows.iter().map(row_to_template).collect()
    }

    /// Built-in templates (`is_builtin = 1`) reject update and delete with
    /// `Forbidden`, leaving the row untouched (spec.md §4.2).
    pub async fn update_template(&self, id: Uuid, patch: TemplatePatch) -> Result<Template> {
        let mut template = self.get_template(id).await?;
        if template.is_builtin {
            return Err(StreamForgeError::forbidden(
                "built-in templates cannot be modified",
            ));
        }
        patch.apply(&mut template, streamforge_core::time::now());

        sqlx::query(
            "UPDATE templates SET name = ?, description = ?, author = ?, spec_blob = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&template.name)
        .bind(&template.description)
        .bind(&template.author)
        .bind(&template.spec_blob)
        .bind(streamforge_core::time::to_canonical(template.updated_at))
        .bind(id.to_string())
        .execute(self.store().pool())
        .await
        .map_err(|e| StreamForgeError::internal(format!("failed to update template: {e}")))?;

        Ok(template)
    }

    pub async fn delete_template(&self, id: Uuid) -> Result<()> {
        let template = self.get_template(id).await?;
        if template.is_builtin {
            return Err(StreamForgeError::forbidden(
                "built-in templates cannot be deleted",
            ));
        }

        sqlx::query("DELETE FROM templates WHERE id = ?")
            .bind(id.to_string())
            .execute(self.store().pool())
            .await
            .map_err(|e| StreamForgeError::internal(format!("failed to delete template: {e}")))?;

        Ok(())
    }
}

fn row_to_template(row: &sqlx::sqlite::SqliteRow) -> Result<Template> {
    Ok(Template {
        id: parse_uuid("templates.id", row.get::<String, _>("id").as_str())?,
        name: row.get("name"),
        description: row.get("description"),
        author: row.get("author"),
        spec_blob: row.get("spec_blob"),
        is_builtin: row.get("is_builtin"),
        created_at: parse_timestamp(
            "templates.created_at",
            row.get::<String, _>("created_at").as_str(),
        )?,
        updated_at: parse_timestamp(
            "templates.updated_at",
            row.get::<String, _>("updated_at").as_str(),
        )?,
    })
}
