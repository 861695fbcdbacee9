//! DocumentStore trait — abstract interface for document persistence.
//!
//! The store is the source of truth; the query path reads from the
//! `DocumentCache` snapshot, which is rebuilt from the store after every
//! administrative mutation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::errors::ApiError;

mod cache;
mod sqlite;

pub use cache::DocumentCache;
pub use sqlite::SqliteDocumentStore;

/// Fixed-length numeric representation of a document's content.
pub type EmbeddingVector = Vec<f32>;

/// An immutable-once-stored text document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    /// Unique, system-generated identifier.
    pub id: String,
    /// Human label.
    pub name: String,
    /// Origin label (filename, URL, …); may overlap with `name`.
    pub source: String,
    /// Full text body.
    pub content: String,
    pub tags: Vec<String>,
    /// RFC3339 storage timestamp.
    pub created_at: String,
}

/// Abstract trait for document storage backends.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a document with its embedding vector; returns the stored id.
    async fn insert(
        &self,
        document: StoredDocument,
        embedding: EmbeddingVector,
    ) -> Result<String, ApiError>;

    /// Fetch a single document with its embedding.
    async fn get(&self, id: &str)
        -> Result<Option<(StoredDocument, EmbeddingVector)>, ApiError>;

    /// All stored documents with their embeddings, oldest first.
    async fn list_all(&self) -> Result<Vec<(StoredDocument, EmbeddingVector)>, ApiError>;

    /// Delete by id; false when the id was absent.
    async fn delete(&self, id: &str) -> Result<bool, ApiError>;

    /// Remove everything; returns the number of removed documents.
    async fn clear(&self) -> Result<usize, ApiError>;

    async fn count(&self) -> Result<usize, ApiError>;
}
