//! SQLite-backed document store.
//!
//! Metadata lives in SQLite; embeddings are stored as little-endian f32
//! BLOBs alongside each row.

use std::path::PathBuf;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use super::{DocumentStore, EmbeddingVector, StoredDocument};
use crate::config::AppPaths;
use crate::core::errors::ApiError;

pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    pub async fn new(paths: &AppPaths) -> Result<Self, ApiError> {
        Self::with_path(paths.db_path.clone()).await
    }

    pub async fn with_path(db_path: PathBuf) -> Result<Self, ApiError> {
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(ApiError::internal)?;

        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<(), ApiError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                source TEXT NOT NULL DEFAULT '',
                content TEXT NOT NULL,
                tags TEXT NOT NULL DEFAULT '[]',
                embedding BLOB NOT NULL,
                created_at TEXT NOT NULL DEFAULT (STRFTIME('%Y-%m-%dT%H:%M:%fZ', 'now'))
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        Ok(())
    }

    fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn deserialize_embedding(bytes: &[u8]) -> EmbeddingVector {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    fn row_to_entry(row: &sqlx::sqlite::SqliteRow) -> (StoredDocument, EmbeddingVector) {
        let tags_str: String = row.get("tags");
        let tags = serde_json::from_str::<Vec<String>>(&tags_str).unwrap_or_default();
        let embedding_bytes: Vec<u8> = row.get("embedding");

        (
            StoredDocument {
                id: row.get("id"),
                name: row.get("name"),
                source: row.get("source"),
                content: row.get("content"),
                tags,
                created_at: row.get("created_at"),
            },
            Self::deserialize_embedding(&embedding_bytes),
        )
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn insert(
        &self,
        document: StoredDocument,
        embedding: EmbeddingVector,
    ) -> Result<String, ApiError> {
        let blob = Self::serialize_embedding(&embedding);
        let tags_str =
            serde_json::to_string(&document.tags).unwrap_or_else(|_| "[]".to_string());

        sqlx::query(
            "INSERT INTO documents (id, name, source, content, tags, embedding, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&document.id)
        .bind(&document.name)
        .bind(&document.source)
        .bind(&document.content)
        .bind(&tags_str)
        .bind(&blob)
        .bind(&document.created_at)
        .execute(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        Ok(document.id)
    }

    async fn get(
        &self,
        id: &str,
    ) -> Result<Option<(StoredDocument, EmbeddingVector)>, ApiError> {
        let row = sqlx::query(
            "SELECT id, name, source, content, tags, embedding, created_at
             FROM documents
             WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        Ok(row.as_ref().map(Self::row_to_entry))
    }

    async fn list_all(&self) -> Result<Vec<(StoredDocument, EmbeddingVector)>, ApiError> {
        let rows = sqlx::query(
            "SELECT id, name, source, content, tags, embedding, created_at
             FROM documents
             ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(ApiError::internal)?;

        Ok(rows.iter().map(Self::row_to_entry).collect())
    }

    async fn delete(&self, id: &str) -> Result<bool, ApiError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(ApiError::internal)?;

        Ok(result.rows_affected() > 0)
    }

    async fn clear(&self) -> Result<usize, ApiError> {
        let result = sqlx::query("DELETE FROM documents")
            .execute(&self.pool)
            .await
            .map_err(ApiError::internal)?;

        Ok(result.rows_affected() as usize)
    }

    async fn count(&self) -> Result<usize, ApiError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool)
            .await
            .map_err(ApiError::internal)?;

        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> SqliteDocumentStore {
        let tmp = std::env::temp_dir().join(format!("askdoc-test-{}.db", uuid::Uuid::new_v4()));
        SqliteDocumentStore::with_path(tmp).await.unwrap()
    }

    fn make_document(id: &str, name: &str, content: &str, tags: &[&str]) -> StoredDocument {
        StoredDocument {
            id: id.to_string(),
            name: name.to_string(),
            source: name.to_string(),
            content: content.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    #[tokio::test]
    async fn insert_get_and_roundtrip_embedding() {
        let store = test_store().await;

        let doc = make_document("d1", "report.txt", "Revenue: 100", &["financial"]);
        let id = store.insert(doc, vec![0.25, -1.5, 3.0]).await.unwrap();
        assert_eq!(id, "d1");

        let (fetched, embedding) = store.get("d1").await.unwrap().unwrap();
        assert_eq!(fetched.name, "report.txt");
        assert_eq!(fetched.tags, vec!["financial"]);
        assert_eq!(embedding, vec![0.25, -1.5, 3.0]);
    }

    #[tokio::test]
    async fn delete_and_count() {
        let store = test_store().await;

        store
            .insert(make_document("d1", "a", "x", &[]), vec![1.0])
            .await
            .unwrap();
        store
            .insert(make_document("d2", "b", "y", &[]), vec![1.0])
            .await
            .unwrap();
        assert_eq!(store.count().await.unwrap(), 2);

        assert!(store.delete("d1").await.unwrap());
        assert!(!store.delete("d1").await.unwrap());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let store = test_store().await;

        store
            .insert(make_document("d1", "a", "x", &[]), vec![1.0])
            .await
            .unwrap();
        store
            .insert(make_document("d2", "b", "y", &[]), vec![1.0])
            .await
            .unwrap();

        assert_eq!(store.clear().await.unwrap(), 2);
        assert_eq!(store.count().await.unwrap(), 0);
        assert!(store.list_all().await.unwrap().is_empty());
    }
}
