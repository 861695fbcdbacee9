//! Per-request query sequence.
//!
//! Select (or rank) a working subset, assemble a bounded context, invoke
//! the throttled generation call and package the response. Upstream AI
//! failures never surface as request failures on this path; they become an
//! explicit degraded outcome with an apology and zero confidence.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::selector::SelectionCriteria;
use super::{context, ranker, selector};
use crate::ai::{AiProvider, SamplingParams};
use crate::core::errors::ApiError;
use crate::store::{DocumentCache, StoredDocument};
use crate::throttle::RequestThrottler;

pub const NO_RELEVANT_INFORMATION: &str =
    "No relevant information was found in the stored documents for this question.";

const APOLOGY: &str =
    "I'm sorry, I couldn't generate an answer right now. Please try again in a moment.";

/// Confidence reported when context came from direct selection and no
/// similarity scores exist.
const DIRECT_SELECTION_CONFIDENCE: f32 = 0.5;

#[derive(Debug, Default, Deserialize)]
pub struct QueryRequest {
    pub prompt: String,
    #[serde(default)]
    pub document_ids: Vec<String>,
    #[serde(default)]
    pub document_names: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub use_all_documents: bool,
    #[serde(default)]
    pub output_format: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DocumentPreview {
    pub id: String,
    pub name: String,
    pub content_length: usize,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub response_text: String,
    pub selection_descriptions: Vec<String>,
    pub selected_count: usize,
    pub selected_preview: Vec<DocumentPreview>,
    pub confidence: f32,
    pub processing_time_ms: u64,
}

/// Outcome of the generation step, kept as an explicit variant so the
/// degraded path is assertable rather than a swallowed error.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Success(String),
    Degraded(String),
}

pub struct QueryOrchestrator {
    cache: Arc<DocumentCache>,
    provider: Arc<dyn AiProvider>,
    throttler: Arc<RequestThrottler>,
    similarity_threshold: f32,
    max_ranked_results: usize,
}

impl QueryOrchestrator {
    pub fn new(
        cache: Arc<DocumentCache>,
        provider: Arc<dyn AiProvider>,
        throttler: Arc<RequestThrottler>,
        similarity_threshold: f32,
        max_ranked_results: usize,
    ) -> Self {
        Self {
            cache,
            provider,
            throttler,
            similarity_threshold,
            max_ranked_results,
        }
    }

    /// Run one query end to end.
    ///
    /// Explicit criteria (ids, names, tags, use_all) mean direct selection;
    /// a bare prompt means semantic ranking over the full corpus. The only
    /// error this returns is prompt validation; everything past that point
    /// resolves to a successful response.
    pub async fn handle(&self, request: QueryRequest) -> Result<QueryResponse, ApiError> {
        let started = Instant::now();

        let prompt = request.prompt.trim().to_string();
        if prompt.is_empty() {
            return Err(ApiError::BadRequest("prompt must not be empty".to_string()));
        }

        let criteria = SelectionCriteria {
            ids: request.document_ids,
            name_substrings: request.document_names,
            tags: request.tags,
            use_all: request.use_all_documents,
        };
        let direct_selection = !criteria.is_empty();

        let corpus = self.cache.snapshot().await;
        let (subset, descriptions) = selector::select(&criteria, &corpus);

        if subset.is_empty() {
            return Ok(package(
                NO_RELEVANT_INFORMATION.to_string(),
                descriptions,
                &[],
                0.0,
                started,
            ));
        }

        let (working, confidence) = if direct_selection {
            let documents: Vec<StoredDocument> =
                subset.into_iter().map(|(doc, _)| doc).collect();
            (documents, DIRECT_SELECTION_CONFIDENCE)
        } else {
            self.throttler.acquire().await;
            let query_vector = match self.provider.embed(&[prompt.clone()]).await {
                Ok(mut vectors) if !vectors.is_empty() => vectors.remove(0),
                Ok(_) | Err(_) => {
                    tracing::warn!("query embedding failed; returning degraded response");
                    return Ok(package(
                        APOLOGY.to_string(),
                        descriptions,
                        &[],
                        0.0,
                        started,
                    ));
                }
            };

            let matches = ranker::rank(
                &query_vector,
                &subset,
                self.similarity_threshold,
                self.max_ranked_results,
            );
            if matches.is_empty() {
                return Ok(package(
                    NO_RELEVANT_INFORMATION.to_string(),
                    descriptions,
                    &[],
                    0.0,
                    started,
                ));
            }

            let mean = matches.iter().map(|m| m.similarity).sum::<f32>() / matches.len() as f32;
            let documents: Vec<StoredDocument> =
                matches.into_iter().map(|m| m.document).collect();
            (documents, mean.clamp(0.0, 1.0))
        };

        let assembled =
            context::assemble(&working, &prompt, request.output_format.as_deref());

        let (response_text, confidence) = match self.generate(&assembled).await {
            GenerationOutcome::Success(text) => (text, confidence),
            GenerationOutcome::Degraded(text) => (text, 0.0),
        };

        Ok(package(
            response_text,
            descriptions,
            &working,
            confidence,
            started,
        ))
    }

    async fn generate(&self, prompt: &str) -> GenerationOutcome {
        self.throttler.acquire().await;
        match self
            .provider
            .generate(prompt, &SamplingParams::default())
            .await
        {
            Ok(text) => GenerationOutcome::Success(text),
            Err(err) => {
                tracing::warn!("generation failed: {}", err);
                GenerationOutcome::Degraded(APOLOGY.to_string())
            }
        }
    }
}

fn package(
    response_text: String,
    selection_descriptions: Vec<String>,
    documents: &[StoredDocument],
    confidence: f32,
    started: Instant,
) -> QueryResponse {
    QueryResponse {
        response_text,
        selection_descriptions,
        selected_count: documents.len(),
        selected_preview: documents
            .iter()
            .map(|doc| DocumentPreview {
                id: doc.id.clone(),
                name: doc.name.clone(),
                content_length: doc.content.chars().count(),
            })
            .collect(),
        confidence,
        processing_time_ms: started.elapsed().as_millis() as u64,
    }
}
