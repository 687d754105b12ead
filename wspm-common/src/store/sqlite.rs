//! SQLite-backed key-value store
//!
//! One table, `plan_storage`, keyed by the storage key. The database file
//! lives under the local root folder and is never shared between machines.

use async_trait::async_trait;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

use super::KeyValueStore;
use crate::{time, Error, Result};

/// Key-value store persisted to a local SQLite database
#[derive(Debug, Clone)]
pub struct SqliteKeyValueStore {
    pool: SqlitePool,
    max_value_bytes: Option<usize>,
}

impl SqliteKeyValueStore {
    /// Open (creating if needed) the database at `db_path`
    pub async fn open(db_path: &Path) -> Result<Self> {
        let newly_created = !db_path.exists();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await?;

        if newly_created {
            info!("Initialized new plan database: {}", db_path.display());
        } else {
            info!("Opened existing plan database: {}", db_path.display());
        }

        sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
        sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, creating the storage table if it is missing
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        create_plan_storage_table(&pool).await?;
        Ok(Self {
            pool,
            max_value_bytes: None,
        })
    }

    /// Refuse values larger than `max_value_bytes`
    pub fn with_max_value_bytes(mut self, max_value_bytes: usize) -> Self {
        self.max_value_bytes = Some(max_value_bytes);
        self
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

async fn create_plan_storage_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS plan_storage (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

#[async_trait]
impl KeyValueStore for SqliteKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM plan_storage WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        if let Some(max) = self.max_value_bytes {
            if value.len() > max {
                return Err(Error::PersistenceWrite(format!(
                    "value for {} is {} bytes (limit {})",
                    key,
                    value.len(),
                    max
                )));
            }
        }

        sqlx::query(
            r#"
            INSERT INTO plan_storage (key, value, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(time::now_millis())
        .execute(&self.pool)
        .await
        .map_err(|e| Error::PersistenceWrite(e.to_string()))?;
        Ok(())
    }
}
