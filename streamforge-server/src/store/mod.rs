//! Embedded SQLite store: location discovery, pragmas, and the
//! forward-only migration runner (spec.md §4.1).

mod migrations;

use std::path::{Path, PathBuf};

use sqlx::pool::PoolConnection;
use sqlx::sqlite::{Sqlite, SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Connection, SqlitePool};
use tracing::info;

use streamforge_core::{Result, StreamForgeError};

pub use migrations::MIGRATIONS;

/// Product-named subdirectory created under the OS-appropriate per-user
/// application-data directory (spec.md §4.1 "Location discovery").
const PRODUCT_DIR: &str = "StreamForge";
const DATABASE_FILE: &str = "streamforge.db";

/// Handle to the embedded store. Cheap to clone — wraps a connection pool.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Opens (creating if absent) the database at the OS-appropriate data
    /// directory, applies pragmas, and runs any unapplied migrations.
    /// Migration failure is fatal to server startup (spec.md §4.1).
    pub async fn open_default() -> Result<Self> {
        let path = default_database_path()?;
        Self::open_at(&path).await
    }

    /// Opens a store at an explicit path — used by tests to get an
    /// isolated database per test run.
    pub async fn open_at(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StreamForgeError::internal(format!(
                    "failed to create data directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await
            .map_err(|e| StreamForgeError::internal(format!("failed to open database: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// Opens an in-memory database for tests. Each call gets its own,
    /// isolated database (no shared-cache URI), which is why the pool is
    /// pinned to a single connection — SQLite's `:memory:` database is
    /// per-connection.
    pub async fn open_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(":memory:")
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| StreamForgeError::internal(format!("failed to open database: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Re-runs the migration routine against an already-migrated database.
    /// Exposed for the migration-idempotence test (spec.md §8 property 12);
    /// `open_at`/`open_in_memory` already call this once during startup.
    pub async fn run_migrations_for_test(&self) -> Result<()> {
        self.run_migrations().await
    }

    /// Closes the pool, allowing in-flight transactions to finish
    /// (spec.md §4.7 graceful shutdown step "close the Store").
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn run_migrations(&self) -> Result<()> {
        let mut conn = self.pool.acquire().await.map_err(|e| {
            StreamForgeError::internal(format!("failed to acquire connection: {e}"))
        })?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS _migrations (
                filename TEXT UNIQUE NOT NULL,
                applied_at TEXT NOT NULL
            )",
        )
        .execute(&mut *conn)
        .await
        .map_err(|e| StreamForgeError::internal(format!("failed to create _migrations: {e}")))?;

        let applied: Vec<String> = sqlx::query_scalar("SELECT filename FROM _migrations")
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| StreamForgeError::internal(format!("failed to read _migrations: {e}")))?;

        for migration in MIGRATIONS {
            if applied.iter().any(|a| a == migration.filename) {
                continue;
            }

            info!(filename = migration.filename, "applying migration");

            // Foreign-key enforcement must be off to alter schema inside a
            // transaction (SQLite forbids toggling it mid-transaction), and
            // it must not leak into the normal-operation pragma set if the
            // script fails. Pinned to one connection so the toggle and the
            // transaction it guards can't land on different pooled
            // connections.
            sqlx::query("PRAGMA foreign_keys = OFF")
                .execute(&mut *conn)
                .await
                .map_err(|e| StreamForgeError::internal(format!("failed to disable FKs: {e}")))?;

            let result = self.apply_migration(&mut conn, migration).await;

            sqlx::query("PRAGMA foreign_keys = ON")
                .execute(&mut *conn)
                .await
                .map_err(|e| StreamForgeError::internal(format!("failed to restore FKs: {e}")))?;

            result?;
        }

        Ok(())
    }

    async fn apply_migration(
        &self,
        conn: &mut PoolConnection<Sqlite>,
        migration: &migrations::Migration,
    ) -> Result<()> {
        let mut tx = conn.begin().await.map_err(|e| {
            StreamForgeError::internal(format!("failed to start migration transaction: {e}"))
        })?;

        for statement in split_statements(migration.sql) {
            sqlx::query(statement).execute(&mut *tx).await.map_err(|e| {
                StreamForgeError::internal(format!(
                    "migration {} failed: {e}",
                    migration.filename
                ))
            })?;
        }

        sqlx::query("INSERT INTO _migrations (filename, applied_at) VALUES (?, ?)")
            .bind(migration.filename)
            .bind(streamforge_core::time::to_canonical(streamforge_core::time::now()))
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                StreamForgeError::internal(format!("failed to record migration: {e}"))
            })?;

        tx.commit().await.map_err(|e| {
            StreamForgeError::internal(format!(
                "failed to commit migration {}: {e}",
                migration.filename
            ))
        })?;

        Ok(())
    }
}

/// Splits a migration script into individual statements on `;` terminators.
/// The bundled migrations never embed a semicolon inside a string literal,
/// so this simple split is sufficient and keeps the runner dependency-free.
fn split_statements(sql: &str) -> impl Iterator<Item = &str> {
    sql.split(';').map(str::trim).filter(|s| !s.is_empty())
}

/// The OS-appropriate per-user application-data directory, product-named,
/// created recursively if missing (spec.md §4.1).
pub fn default_database_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", PRODUCT_DIR).ok_or_else(|| {
        StreamForgeError::internal("could not determine application data directory")
    })?;
    Ok(dirs.data_dir().join(DATABASE_FILE))
}
