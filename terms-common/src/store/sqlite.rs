//! SQLite-backed document store
//!
//! Each document is one row of the `documents` table; `items` holds the
//! JSON-encoded record array. Create-only seeding relies on
//! `INSERT ... ON CONFLICT DO NOTHING`, and union appends run their
//! read-modify-write inside a single transaction.

use super::{array_union, DocumentStore};
use crate::model::{TermRecord, TermsDocument};
use crate::{Error, Result};
use async_trait::async_trait;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::{debug, info};

/// Busy timeout applied to every connection, in milliseconds
const BUSY_TIMEOUT_MS: u32 = 5000;

/// Document store persisted in a SQLite database file
#[derive(Debug, Clone)]
pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    /// Open (creating if needed) the database at `db_path`
    pub async fn open(db_path: &Path) -> Result<Self> {
        let newly_created = !db_path.exists();

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
        debug!("Connecting to database: {}", db_url);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&db_url)
            .await?;

        if newly_created {
            info!("Initialized new terms database: {}", db_path.display());
        } else {
            info!("Opened existing terms database: {}", db_path.display());
        }

        sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
        sqlx::query(&format!("PRAGMA busy_timeout = {}", BUSY_TIMEOUT_MS))
            .execute(&pool)
            .await?;

        Self::from_pool(pool).await
    }

    /// Private in-memory database (single connection so every query sees it)
    pub async fn open_in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool, creating the `documents` table if missing
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        create_documents_table(&pool).await?;
        Ok(Self { pool })
    }

}

/// Create the documents table (idempotent)
pub async fn create_documents_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            collection TEXT NOT NULL,
            doc_key TEXT NOT NULL,
            items TEXT NOT NULL DEFAULT '[]',
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            PRIMARY KEY (collection, doc_key)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

fn decode_items(json: &str) -> Result<Vec<TermRecord>> {
    Ok(serde_json::from_str(json)?)
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    async fn get_document(&self, collection: &str, key: &str) -> Result<Option<TermsDocument>> {
        let row: Option<(String,)> = sqlx::query_as(
            "SELECT items FROM documents WHERE collection = ? AND doc_key = ?",
        )
        .bind(collection)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some((items,)) => Ok(Some(TermsDocument::new(decode_items(&items)?))),
            None => Ok(None),
        }
    }

    async fn create_document(
        &self,
        collection: &str,
        key: &str,
        document: &TermsDocument,
    ) -> Result<bool> {
        let items = serde_json::to_string(&document.items)?;
        let result = sqlx::query(
            r#"
            INSERT INTO documents (collection, doc_key, items, created_at, updated_at)
            VALUES (?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
            ON CONFLICT(collection, doc_key) DO NOTHING
            "#,
        )
        .bind(collection)
        .bind(key)
        .bind(items)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn set_document(&self, collection: &str, key: &str, document: &TermsDocument) -> Result<()> {
        let items = serde_json::to_string(&document.items)?;
        sqlx::query(
            r#"
            INSERT INTO documents (collection, doc_key, items, created_at, updated_at)
            VALUES (?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
            ON CONFLICT(collection, doc_key) DO UPDATE SET
                items = excluded.items,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(collection)
        .bind(key)
        .bind(items)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn union_append(&self, collection: &str, key: &str, items: &[TermRecord]) -> Result<usize> {
        let mut tx = self.pool.begin().await?;

        let row: Option<(String,)> = sqlx::query_as(
            "SELECT items FROM documents WHERE collection = ? AND doc_key = ?",
        )
        .bind(collection)
        .bind(key)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((stored,)) = row else {
            return Err(Error::NotFound(format!(
                "No document to update: {}/{}",
                collection, key
            )));
        };

        let mut existing = decode_items(&stored)?;
        let added = array_union(&mut existing, items);

        if added > 0 {
            sqlx::query(
                "UPDATE documents SET items = ?, updated_at = CURRENT_TIMESTAMP WHERE collection = ? AND doc_key = ?",
            )
            .bind(serde_json::to_string(&existing)?)
            .bind(collection)
            .bind(key)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(added)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, term: &str) -> TermRecord {
        TermRecord::new(id, "front end", term, format!("{} title", term))
    }

    #[tokio::test]
    async fn test_roundtrip_document() {
        let store = SqliteDocumentStore::open_in_memory().await.unwrap();
        assert!(store.get_document("terms", "front_end").await.unwrap().is_none());

        let doc = TermsDocument::new(vec![record("a", "grid"), record("b", "flex")]);
        store.set_document("terms", "front_end", &doc).await.unwrap();

        let loaded = store.get_document("terms", "front_end").await.unwrap().unwrap();
        assert_eq!(loaded, doc);
    }

    #[tokio::test]
    async fn test_create_document_is_conditional() {
        let store = SqliteDocumentStore::open_in_memory().await.unwrap();
        let first = TermsDocument::new(vec![record("a", "grid")]);
        let second = TermsDocument::new(vec![record("b", "flex")]);

        assert!(store.create_document("terms", "front_end", &first).await.unwrap());
        assert!(!store.create_document("terms", "front_end", &second).await.unwrap());

        let loaded = store.get_document("terms", "front_end").await.unwrap().unwrap();
        assert_eq!(loaded, first);
    }

    #[tokio::test]
    async fn test_union_append_in_transaction() {
        let store = SqliteDocumentStore::open_in_memory().await.unwrap();
        let doc = TermsDocument::new(vec![record("a", "grid")]);
        store.set_document("terms", "front_end", &doc).await.unwrap();

        let added = store
            .union_append("terms", "front_end", &[record("a", "grid"), record("b", "flex")])
            .await
            .unwrap();
        assert_eq!(added, 1);

        let loaded = store.get_document("terms", "front_end").await.unwrap().unwrap();
        assert_eq!(loaded.items.len(), 2);
    }

    #[tokio::test]
    async fn test_union_append_missing_document() {
        let store = SqliteDocumentStore::open_in_memory().await.unwrap();
        let result = store.union_append("terms", "nope", &[record("a", "grid")]).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }
}
