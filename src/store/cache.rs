//! In-process read replica of the document store.
//!
//! The query path ranks and selects against an immutable snapshot; every
//! administrative mutation (upload, delete, clear) writes through to the
//! store and then rebuilds the snapshot. Readers clone the `Arc`, writers
//! swap it atomically, so a refresh never tears a concurrent read.

use std::sync::Arc;

use tokio::sync::RwLock;

use super::{DocumentStore, EmbeddingVector, StoredDocument};
use crate::core::errors::ApiError;

pub struct DocumentCache {
    store: Arc<dyn DocumentStore>,
    snapshot: RwLock<Arc<Vec<(StoredDocument, EmbeddingVector)>>>,
}

impl DocumentCache {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            snapshot: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Rebuild the snapshot from the store.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        let documents = self.store.list_all().await?;
        *self.snapshot.write().await = Arc::new(documents);
        Ok(())
    }

    /// Current snapshot; cheap to clone, stable for the caller's lifetime.
    pub async fn snapshot(&self) -> Arc<Vec<(StoredDocument, EmbeddingVector)>> {
        self.snapshot.read().await.clone()
    }
}
