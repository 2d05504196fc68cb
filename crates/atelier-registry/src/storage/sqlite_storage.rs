//! SQLite connection pool and schema bootstrap

use crate::error::{RegistryError, Result};
use sqlx::{Sqlite, SqlitePool, Transaction, sqlite::SqliteConnectOptions};
use std::str::FromStr;
use tracing::info;

/// SQLite-backed store for identities, revisions, text and media rows
#[derive(Clone)]
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    /// Create a new SQLite storage instance with the given database path
    pub async fn new(database_path: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_path)
            .map_err(|e| RegistryError::storage("Invalid database path", e))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePool::connect_with(options)
            .await
            .map_err(|e| RegistryError::storage("Failed to connect to SQLite", e))?;

        let storage = Self { pool };
        storage.init_schema().await?;
        info!(database = database_path, "SQLite storage ready");
        Ok(storage)
    }

    /// Create SQLite storage from environment variable
    ///
    /// Expects DATABASE_URL environment variable with SQLite connection string
    /// Example: sqlite:./data/atelier.db
    pub async fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:./data/atelier.db".to_string());

        Self::new(&database_url).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub(crate) async fn begin(&self) -> Result<Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .map_err(|e| RegistryError::storage("Failed to begin transaction", e))
    }

    /// Initialize database schema
    async fn init_schema(&self) -> Result<()> {
        let statements: [(&str, &str); 12] = [
            (
                "image table",
                r#"
                CREATE TABLE IF NOT EXISTS image (
                    id TEXT PRIMARY KEY,
                    original_path TEXT NOT NULL,
                    webp_path TEXT,
                    avif_path TEXT
                )
                "#,
            ),
            (
                "series table",
                r#"
                CREATE TABLE IF NOT EXISTS series (
                    id TEXT PRIMARY KEY,
                    owner_kind TEXT NOT NULL CHECK (owner_kind IN ('user', 'system')),
                    user_id INTEGER,                      -- NULL for system templates
                    id_locked INTEGER NOT NULL DEFAULT 0,
                    draft_revision_id TEXT,
                    published_revision_id TEXT,
                    copied_from TEXT,                     -- template series id
                    version INTEGER NOT NULL DEFAULT 0,   -- compare-and-swap counter
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    CHECK ((owner_kind = 'user') = (user_id IS NOT NULL))
                )
                "#,
            ),
            (
                "series_revision table",
                r#"
                CREATE TABLE IF NOT EXISTS series_revision (
                    id TEXT PRIMARY KEY,
                    series_id TEXT NOT NULL REFERENCES series(id) ON DELETE CASCADE,
                    image_id TEXT REFERENCES image(id),
                    created_at TEXT NOT NULL
                )
                "#,
            ),
            (
                "series_i18n_revision table",
                r#"
                CREATE TABLE IF NOT EXISTS series_i18n_revision (
                    revision_id TEXT NOT NULL REFERENCES series_revision(id) ON DELETE CASCADE,
                    lang TEXT NOT NULL,
                    title TEXT NOT NULL,
                    description_serie TEXT NOT NULL DEFAULT '',
                    year TEXT NOT NULL DEFAULT '',
                    PRIMARY KEY (revision_id, lang)
                )
                "#,
            ),
            (
                "artwork table",
                r#"
                CREATE TABLE IF NOT EXISTS artwork (
                    id TEXT PRIMARY KEY,
                    series_id TEXT NOT NULL REFERENCES series(id) ON DELETE CASCADE,
                    owner_kind TEXT NOT NULL CHECK (owner_kind IN ('user', 'system')),
                    user_id INTEGER,
                    sort_index INTEGER NOT NULL DEFAULT 0,
                    id_locked INTEGER NOT NULL DEFAULT 0,
                    sold INTEGER NOT NULL DEFAULT 0,
                    draft_revision_id TEXT,
                    published_revision_id TEXT,
                    version INTEGER NOT NULL DEFAULT 0,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    CHECK ((owner_kind = 'user') = (user_id IS NOT NULL))
                )
                "#,
            ),
            (
                "artwork_revision table",
                r#"
                CREATE TABLE IF NOT EXISTS artwork_revision (
                    id TEXT PRIMARY KEY,
                    artwork_id TEXT NOT NULL REFERENCES artwork(id) ON DELETE CASCADE,
                    year TEXT NOT NULL DEFAULT '',
                    medium TEXT NOT NULL DEFAULT '',
                    size_cm TEXT NOT NULL DEFAULT '',
                    price TEXT NOT NULL DEFAULT '',
                    image_id TEXT REFERENCES image(id),
                    created_at TEXT NOT NULL
                )
                "#,
            ),
            (
                "artwork_i18n_revision table",
                r#"
                CREATE TABLE IF NOT EXISTS artwork_i18n_revision (
                    revision_id TEXT NOT NULL REFERENCES artwork_revision(id) ON DELETE CASCADE,
                    lang TEXT NOT NULL,
                    title TEXT NOT NULL,
                    description TEXT NOT NULL DEFAULT '',
                    notes TEXT NOT NULL DEFAULT '',
                    PRIMARY KEY (revision_id, lang)
                )
                "#,
            ),
            (
                "series owner index",
                "CREATE INDEX IF NOT EXISTS idx_series_owner ON series(owner_kind, user_id)",
            ),
            (
                "series provenance index",
                "CREATE INDEX IF NOT EXISTS idx_series_copied_from ON series(copied_from)",
            ),
            (
                "artwork series index",
                "CREATE INDEX IF NOT EXISTS idx_artwork_series ON artwork(series_id, sort_index)",
            ),
            (
                "series revision owner index",
                "CREATE INDEX IF NOT EXISTS idx_series_revision_series ON series_revision(series_id)",
            ),
            (
                "artwork revision owner index",
                "CREATE INDEX IF NOT EXISTS idx_artwork_revision_artwork ON artwork_revision(artwork_id)",
            ),
        ];

        for (name, sql) in statements {
            sqlx::query(sql)
                .execute(&self.pool)
                .await
                .map_err(|e| RegistryError::storage(&format!("Failed to create {}", name), e))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn schema_bootstrap_is_idempotent() {
        let temp_dir = tempdir().unwrap();
        let db_path = format!("sqlite:{}/schema.db", temp_dir.path().display());

        let first = SqliteStorage::new(&db_path).await.unwrap();
        first.init_schema().await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(first.pool())
        .await
        .unwrap();
        let names: Vec<String> = tables.into_iter().map(|(n,)| n).collect();
        for expected in [
            "artwork",
            "artwork_i18n_revision",
            "artwork_revision",
            "image",
            "series",
            "series_i18n_revision",
            "series_revision",
        ] {
            assert!(names.iter().any(|n| n == expected), "missing {}", expected);
        }
    }

    #[tokio::test]
    async fn owner_columns_must_agree() {
        let temp_dir = tempdir().unwrap();
        let db_path = format!("sqlite:{}/owner.db", temp_dir.path().display());
        let storage = SqliteStorage::new(&db_path).await.unwrap();

        let result = sqlx::query(
            "INSERT INTO series (id, owner_kind, user_id, created_at, updated_at) VALUES ('s', 'system', 7, 'x', 'x')",
        )
        .execute(storage.pool())
        .await;
        assert!(result.is_err());
    }
}
