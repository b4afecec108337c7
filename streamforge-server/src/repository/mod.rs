//! Thin typed layer over the [`crate::store::Store`] (spec.md §4.2).
//!
//! Each submodule owns one table. Row decoding is hand-written rather than
//! via `sqlx::query_as!` so the crate never needs a live database at build
//! time — every domain type round-trips through plain `TEXT`/`INTEGER`
//! columns and is parsed back in Rust.

mod alerts;
mod event_log;
mod settings;
mod templates;
mod variations;

use streamforge_core::Result;

use crate::store::Store;

/// Entry point used by the HTTP and queue layers. Cloning is cheap — it
/// only clones the underlying `Store` (itself a pool handle).
#[derive(Clone)]
pub struct ConfigRepository {
    store: Store,
}

impl ConfigRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }
}

pub use alerts::*;
pub use event_log::*;
pub use settings::*;
pub use templates::*;
pub use variations::*;

/// Parses a canonical timestamp column, mapping failure to `Internal` —
/// a row written by this crate should always be parseable.
fn parse_timestamp(column: &str, raw: &str) -> Result<chrono::DateTime<chrono::Utc>> {
    streamforge_core::time::parse_canonical(raw).ok_or_else(|| {
        streamforge_core::StreamForgeError::internal(format!(
            "corrupt {column} timestamp: {raw}"
        ))
    })
}

fn parse_uuid(column: &str, raw: &str) -> Result<uuid::Uuid> {
    uuid::Uuid::parse_str(raw)
        .map_err(|e| streamforge_core::StreamForgeError::internal(format!("corrupt {column}: {e}")))
}

fn parse_event_type(raw: &str) -> Result<streamforge_core::EventType> {
    raw.parse()
        .map_err(|e| streamforge_core::StreamForgeError::internal(format!("corrupt event_type: {e}")))
}
