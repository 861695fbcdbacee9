use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::ai::{AiProvider, OpenAiProvider};
use crate::config::{AppPaths, Settings};
use crate::rag::orchestrator::QueryOrchestrator;
use crate::store::{DocumentCache, DocumentStore, SqliteDocumentStore};
use crate::throttle::RequestThrottler;

pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub settings: Settings,
    pub store: Arc<dyn DocumentStore>,
    pub cache: Arc<DocumentCache>,
    pub provider: Arc<dyn AiProvider>,
    pub throttler: Arc<RequestThrottler>,
    pub orchestrator: QueryOrchestrator,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub async fn initialize(settings: Settings) -> anyhow::Result<Arc<Self>> {
        let paths = Arc::new(AppPaths::new());

        let store: Arc<dyn DocumentStore> =
            Arc::new(SqliteDocumentStore::new(&paths).await?);
        let cache = Arc::new(DocumentCache::new(store.clone()));
        cache.refresh().await?;

        let provider: Arc<dyn AiProvider> = Arc::new(OpenAiProvider::new(&settings));
        let throttler = Arc::new(RequestThrottler::new(
            settings.min_request_delay_ms,
            settings.max_requests_per_minute,
        ));

        let orchestrator = QueryOrchestrator::new(
            cache.clone(),
            provider.clone(),
            throttler.clone(),
            settings.similarity_threshold,
            settings.max_ranked_results,
        );

        tracing::info!("initialized with provider '{}'", provider.name());

        Ok(Arc::new(AppState {
            paths,
            settings,
            store,
            cache,
            provider,
            throttler,
            orchestrator,
            started_at: Utc::now(),
        }))
    }
}
