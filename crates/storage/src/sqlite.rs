//! SQLite-backed snapshot slot.

use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use tokio::runtime::Runtime;

use splitledger_ledger::SnapshotSlot;

use crate::config::StorageConfig;

/// One row of the `snapshots` table, addressed by `key`.
///
/// The ledger API is synchronous, so the slot owns a current-thread runtime
/// and blocks on it for every query. It must not be used from inside another
/// tokio runtime; dropping it there is fine.
#[derive(Debug)]
pub struct SqliteSlot {
    key: String,
    path: PathBuf,
    pool: SqlitePool,
    /// `None` only while dropping.
    runtime: Option<Runtime>,
}

impl SqliteSlot {
    /// Open (creating if needed) the database at `path` and its table.
    pub fn open(path: impl Into<PathBuf>, key: impl Into<String>) -> anyhow::Result<Self> {
        let path = path.into();
        let key = key.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create snapshot directory at {parent:?}"))?;
        }

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .context("failed to create runtime for SqliteSlot")?;

        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);

        let pool = runtime
            .block_on(
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .connect_with(options),
            )
            .with_context(|| format!("failed to open SQLite snapshot store at {path:?}"))?;

        runtime
            .block_on(
                sqlx::query(
                    r#"
                    CREATE TABLE IF NOT EXISTS snapshots (
                        key       TEXT PRIMARY KEY,
                        data      TEXT NOT NULL,
                        saved_at  TEXT NOT NULL
                    )
                    "#,
                )
                .execute(&pool),
            )
            .context("failed to create snapshots table")?;

        tracing::debug!(path = ?path, key = %key, "sqlite snapshot slot opened");

        Ok(Self {
            key,
            path,
            pool,
            runtime: Some(runtime),
        })
    }

    pub fn from_config(config: &StorageConfig) -> anyhow::Result<Self> {
        Self::open(&config.db_path, &config.slot_key)
    }

    fn block_on<F: Future>(&self, future: F) -> anyhow::Result<F::Output> {
        let runtime = self
            .runtime
            .as_ref()
            .context("SqliteSlot runtime already shut down")?;
        Ok(runtime.block_on(future))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// When the slot was last written (RFC 3339), if ever.
    pub fn saved_at(&self) -> anyhow::Result<Option<String>> {
        let row = self
            .block_on(
                sqlx::query(
                    r#"
                    SELECT saved_at
                    FROM snapshots
                    WHERE key = ?1
                    "#,
                )
                .bind(&self.key)
                .fetch_optional(&self.pool),
            )?
            .context("failed to fetch snapshot timestamp")?;

        row.map(|row| row.try_get::<String, _>("saved_at"))
            .transpose()
            .context("invalid saved_at column")
    }

    /// Delete the stored snapshot.
    pub fn clear(&self) -> anyhow::Result<()> {
        self.block_on(
            sqlx::query(
                r#"
                DELETE FROM snapshots
                WHERE key = ?1
                "#,
            )
            .bind(&self.key)
            .execute(&self.pool),
        )?
        .context("failed to clear snapshot")?;
        Ok(())
    }
}

impl SnapshotSlot for SqliteSlot {
    fn key(&self) -> &str {
        &self.key
    }

    fn read(&self) -> anyhow::Result<Option<String>> {
        let row = self
            .block_on(
                sqlx::query(
                    r#"
                    SELECT data
                    FROM snapshots
                    WHERE key = ?1
                    "#,
                )
                .bind(&self.key)
                .fetch_optional(&self.pool),
            )?
            .context("failed to fetch snapshot")?;

        let Some(row) = row else {
            return Ok(None);
        };

        let data: String = row.try_get("data").context("invalid data column")?;
        Ok(Some(data))
    }

    fn write(&self, data: &str) -> anyhow::Result<()> {
        let now = Utc::now().to_rfc3339();

        self.block_on(
            sqlx::query(
                r#"
                INSERT INTO snapshots (key, data, saved_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(key)
                DO UPDATE SET
                    data = excluded.data,
                    saved_at = excluded.saved_at
                "#,
            )
            .bind(&self.key)
            .bind(data)
            .bind(&now)
            .execute(&self.pool),
        )?
        .context("failed to upsert snapshot")?;

        Ok(())
    }
}

impl Drop for SqliteSlot {
    fn drop(&mut self) {
        let Some(runtime) = self.runtime.take() else {
            return;
        };

        // Blocking (or dropping a runtime) inside another runtime panics.
        if tokio::runtime::Handle::try_current().is_ok() {
            tracing::debug!(path = ?self.path, "dropped inside a runtime; skipping pool close");
            runtime.shutdown_background();
            return;
        }

        runtime.block_on(self.pool.close());
    }
}
