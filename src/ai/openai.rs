use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::provider::AiProvider;
use super::types::SamplingParams;
use crate::config::Settings;
use crate::core::errors::ApiError;

#[derive(Clone)]
pub struct OpenAiProvider {
    base_url: String,
    api_key: String,
    embedding_model: String,
    generation_model: String,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(settings: &Settings) -> Self {
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.clone(),
            embedding_model: settings.embedding_model.clone(),
            generation_model: settings.generation_model.clone(),
            client: Client::new(),
        }
    }
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingEntry>,
}

#[derive(Deserialize)]
struct EmbeddingEntry {
    embedding: Vec<f32>,
}

#[async_trait]
impl AiProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        let url = format!("{}/v1/embeddings", self.base_url);

        let body = json!({
            "model": self.embedding_model,
            "input": inputs,
        });

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| transport_error("embeddings", err))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Internal(format!(
                "embeddings request failed ({}): {}",
                status, text
            )));
        }

        let payload: EmbeddingsResponse = res.json().await.map_err(ApiError::internal)?;
        Ok(payload.data.into_iter().map(|e| e.embedding).collect())
    }

    async fn generate(&self, prompt: &str, params: &SamplingParams) -> Result<String, ApiError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let mut body = json!({
            "model": self.generation_model,
            "messages": [{ "role": "user", "content": prompt }],
            "stream": false,
        });

        if let Some(obj) = body.as_object_mut() {
            if let Some(t) = params.temperature {
                obj.insert("temperature".to_string(), json!(t));
            }
            if let Some(t) = params.top_p {
                obj.insert("top_p".to_string(), json!(t));
            }
            if let Some(t) = params.max_tokens {
                obj.insert("max_tokens".to_string(), json!(t));
            }
        }

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| transport_error("generation", err))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Internal(format!(
                "generation request failed ({}): {}",
                status, text
            )));
        }

        let payload: Value = res.json().await.map_err(ApiError::internal)?;
        let content = payload["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string();

        Ok(content)
    }
}

/// The endpoint could not be reached at all (refused, DNS, timeout); the
/// service is unavailable rather than broken.
fn transport_error(operation: &str, err: reqwest::Error) -> ApiError {
    tracing::warn!("{} request could not reach the AI endpoint: {}", operation, err);
    ApiError::ServiceUnavailable
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_settings() -> Settings {
        Settings {
            api_key: "test-key".to_string(),
            // Nothing listens on the discard port; connection is refused.
            base_url: "http://127.0.0.1:9".to_string(),
            embedding_model: "embed".to_string(),
            generation_model: "generate".to_string(),
            min_request_delay_ms: 0,
            max_requests_per_minute: 60,
            similarity_threshold: 0.3,
            max_ranked_results: 5,
        }
    }

    #[tokio::test]
    async fn unreachable_endpoint_maps_to_service_unavailable() {
        let provider = OpenAiProvider::new(&unreachable_settings());

        let embed_err = provider.embed(&["text".to_string()]).await.unwrap_err();
        assert!(matches!(embed_err, ApiError::ServiceUnavailable));

        let generate_err = provider
            .generate("prompt", &SamplingParams::default())
            .await
            .unwrap_err();
        assert!(matches!(generate_err, ApiError::ServiceUnavailable));
    }
}

