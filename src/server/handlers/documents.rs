//! Administrative document operations.
//!
//! These are the write path: they mutate the store and then rebuild the
//! cache snapshot the query path reads. Failures here propagate as explicit
//! error responses, unlike the query path's degraded mode.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::core::errors::ApiError;
use crate::state::AppState;
use crate::store::StoredDocument;

#[derive(Debug, Deserialize)]
pub struct UploadDocumentRequest {
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub source: Option<String>,
}

pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UploadDocumentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name must not be empty".to_string()));
    }
    if payload.content.trim().is_empty() {
        return Err(ApiError::BadRequest("content must not be empty".to_string()));
    }

    state.throttler.acquire().await;
    let mut vectors = state.provider.embed(&[payload.content.clone()]).await?;
    if vectors.is_empty() {
        return Err(ApiError::Internal(
            "embedding service returned no vectors".to_string(),
        ));
    }
    let embedding = vectors.remove(0);

    let document = StoredDocument {
        id: Uuid::new_v4().to_string(),
        name: payload.name.trim().to_string(),
        source: payload
            .source
            .unwrap_or_else(|| payload.name.trim().to_string()),
        content: payload.content,
        tags: payload.tags,
        created_at: Utc::now().to_rfc3339(),
    };

    let id = state.store.insert(document, embedding).await?;
    state.cache.refresh().await?;

    tracing::info!("stored document {}", id);
    Ok(Json(json!({ "id": id })))
}

pub async fn list_documents(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let documents = state.store.list_all().await?;

    let result: Vec<Value> = documents
        .into_iter()
        .map(|(doc, _)| {
            json!({
                "id": doc.id,
                "name": doc.name,
                "source": doc.source,
                "tags": doc.tags,
                "content_length": doc.content.chars().count(),
                "created_at": doc.created_at,
            })
        })
        .collect();

    Ok(Json(json!({ "documents": result })))
}

pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path(document_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = state.store.delete(&document_id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Document not found".to_string()));
    }
    state.cache.refresh().await?;

    Ok(Json(json!({ "deleted": true })))
}

pub async fn clear_documents(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let removed = state.store.clear().await?;
    state.cache.refresh().await?;

    Ok(Json(json!({ "removed": removed })))
}
