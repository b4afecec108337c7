use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An opaque key/value row (spec.md §3 "Setting"). The caller is
/// responsible for serializing non-string data into `value`; there is no
/// delete operation on the core surface, only upsert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}
