use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A saved AlertSpec snapshot (spec.md §3 "Template"). Built-in templates
/// are inserted by the store's migrations and can never be updated or
/// deleted through the Config Repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub author: Option<String>,
    /// Serialized `AlertSpec` (or caller-defined) blob, opaque to the store.
    pub spec_blob: String,
    pub is_builtin: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTemplate {
    pub name: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub spec_blob: String,
}

impl NewTemplate {
    pub fn into_template(self, id: Uuid, now: DateTime<Utc>) -> Template {
        Template {
            id,
            name: self.name,
            description: self.description,
            author: self.author,
            spec_blob: self.spec_blob,
            is_builtin: false,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplatePatch {
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub author: Option<Option<String>>,
    pub spec_blob: Option<String>,
}

impl TemplatePatch {
    pub fn apply(self, template: &mut Template, now: DateTime<Utc>) {
        if let Some(v) = self.name {
            template.name = v;
        }
        if let Some(v) = self.description {
            template.description = v;
        }
        if let Some(v) = self.author {
            template.author = v;
        }
        if let Some(v) = self.spec_blob {
            template.spec_blob = v;
        }
        template.updated_at = now;
    }
}
