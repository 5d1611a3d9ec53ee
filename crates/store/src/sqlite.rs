//! SQLite backend — relational storage behind the same append-only contract.
//!
//! A single `knowledge_entries` table with an autoincrement sequence column
//! so that `all()` can return entries in exact insertion order regardless of
//! clock skew between writers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

use vademecum_core::error::StorageError;
use vademecum_core::knowledge::{EntryId, KnowledgeEntry, KnowledgeStore};

/// A SQLite-backed knowledge store.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) a SQLite database at the given path or URL.
    ///
    /// Pass `"sqlite::memory:"` for an in-process ephemeral database
    /// (useful for tests).
    pub async fn new(path: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| StorageError::Database(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Database(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite knowledge store initialized at {path}");
        Ok(store)
    }

    /// Create from an existing pool (useful for testing).
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StorageError> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StorageError> {
        // seq preserves insertion order; id stays opaque to callers
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS knowledge_entries (
                seq        INTEGER PRIMARY KEY AUTOINCREMENT,
                id         TEXT UNIQUE NOT NULL,
                content    TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::MigrationFailed(format!("knowledge_entries table: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> Result<KnowledgeEntry, StorageError> {
        let created_at: String = row
            .try_get("created_at")
            .map_err(|e| StorageError::Malformed(format!("created_at column: {e}")))?;
        let created_at = DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| StorageError::Malformed(format!("created_at timestamp: {e}")))?
            .with_timezone(&Utc);

        Ok(KnowledgeEntry {
            id: row
                .try_get("id")
                .map_err(|e| StorageError::Malformed(format!("id column: {e}")))?,
            content: row
                .try_get("content")
                .map_err(|e| StorageError::Malformed(format!("content column: {e}")))?,
            created_at,
        })
    }
}

#[async_trait]
impl KnowledgeStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn append(&self, content: &str) -> Result<EntryId, StorageError> {
        let entry = KnowledgeEntry::new(content);

        sqlx::query("INSERT INTO knowledge_entries (id, content, created_at) VALUES (?, ?, ?)")
            .bind(&entry.id)
            .bind(&entry.content)
            .bind(entry.created_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Database(format!("Failed to insert entry: {e}")))?;

        Ok(entry.id)
    }

    async fn all(&self) -> Result<Vec<KnowledgeEntry>, StorageError> {
        let rows =
            sqlx::query("SELECT id, content, created_at FROM knowledge_entries ORDER BY seq ASC")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| StorageError::Database(format!("Failed to read entries: {e}")))?;

        rows.iter().map(Self::row_to_entry).collect()
    }

    async fn count(&self) -> Result<usize, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM knowledge_entries")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::Database(format!("Failed to count entries: {e}")))?;

        let n: i64 = row
            .try_get("n")
            .map_err(|e| StorageError::Malformed(format!("count column: {e}")))?;
        Ok(n as usize)
    }
}
